use std::path::PathBuf;

use thiserror::Error;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("NOTELOOM_JWT_SECRET is unset or still a placeholder")]
    InsecureSecret,

    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub notes_per_page: u32,
    pub token_ttl_hours: i64,
    /// Requests per user per minute on authenticated routes; 0 disables.
    pub rate_limit_per_minute: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("NOTELOOM_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::InsecureSecret);
        }

        let notes_per_page: u32 = parse_or(&lookup, "NOTELOOM_NOTES_PER_PAGE", 6)?;
        if notes_per_page == 0 {
            return Err(ConfigError::Invalid {
                var: "NOTELOOM_NOTES_PER_PAGE",
                value: "0".into(),
            });
        }

        Ok(Self {
            jwt_secret,
            db_path: lookup("NOTELOOM_DB_PATH")
                .unwrap_or_else(|| "noteloom.db".into())
                .into(),
            host: lookup("NOTELOOM_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "NOTELOOM_PORT", 3000)?,
            notes_per_page,
            token_ttl_hours: parse_or(&lookup, "NOTELOOM_TOKEN_TTL_HOURS", 720)?, // 30 days
            rate_limit_per_minute: parse_or(&lookup, "NOTELOOM_RATE_LIMIT_PER_MINUTE", 60)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
