use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand_core::OsRng;
use tracing::{error, info};
use uuid::Uuid;

use noteloom_db::Database;
use noteloom_db::models::format_timestamp;
use noteloom_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::ApiError;
use crate::throttle::RateLimiter;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub notes_per_page: u32,
    pub rate_limiter: RateLimiter,
}

/// Run blocking work (SQLite, password hashing) off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
        })?
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let name = req.name.trim().to_string();
    let email = normalize_email(&req.email);
    let user_id = Uuid::new_v4();

    let uid = user_id.to_string();
    let user_email = email.clone();
    let user_name = name.clone();
    blocking(&state, move |s| {
        if s.db.get_user_by_email(&user_email)?.is_some() {
            return Err(email_taken());
        }

        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
            .to_string();

        // a concurrent registration may have taken the email since the check
        let now = format_timestamp(chrono::Utc::now());
        if !s.db.create_user(&uid, &user_name, &user_email, &password_hash, &now)? {
            return Err(email_taken());
        }
        Ok(())
    })
    .await?;

    info!("Registered user {} ({})", user_id, email);

    let token = create_token(&state.jwt_secret, user_id, &name, state.token_ttl)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            name,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let email = normalize_email(&req.email);
    let user = blocking(&state, move |s| {
        let user = s
            .db
            .get_user_by_email(&email)?
            .ok_or(ApiError::InvalidCredentials)?;

        // Verify password
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|e| anyhow::anyhow!("stored password hash is unreadable: {}", e))?;

        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| ApiError::InvalidCredentials)?;

        Ok(user.into_user())
    })
    .await?;

    let token = create_token(&state.jwt_secret, user.id, &user.name, state.token_ttl)?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        name: user.name,
        token,
    }))
}

fn email_taken() -> ApiError {
    ApiError::Conflict("The email has already been taken.".into())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn create_token(
    secret: &str,
    user_id: Uuid,
    name: &str,
    ttl: chrono::Duration,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        name: name.to_string(),
        exp: (chrono::Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
