use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort option '{0}', expected one of: importance, newest, oldest")]
pub struct InvalidSortOption(pub String);

/// The three total orderings a user can apply to their notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    /// Important notes first, then most recently updated.
    #[default]
    Importance,
    /// Most recently created first.
    Newest,
    /// Oldest created first.
    Oldest,
}

impl SortOption {
    pub const ALL: [SortOption; 3] = [SortOption::Importance, SortOption::Newest, SortOption::Oldest];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::Importance => "importance",
            SortOption::Newest => "newest",
            SortOption::Oldest => "oldest",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOption::Importance => "Most Important",
            SortOption::Newest => "Newest First",
            SortOption::Oldest => "Oldest First",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SortOption::Importance => "Shows important notes first, then sorted by recently updated",
            SortOption::Newest => "Shows most recently created notes first",
            SortOption::Oldest => "Shows oldest notes first",
        }
    }

    /// Strict parse. Tokens are matched exactly; anything else is an error.
    pub fn parse(value: &str) -> Result<Self, InvalidSortOption> {
        SortOption::ALL
            .into_iter()
            .find(|option| option.as_str() == value)
            .ok_or_else(|| InvalidSortOption(value.to_string()))
    }

    /// Lenient parse: unknown tokens yield `default`.
    pub fn parse_or(value: &str, default: SortOption) -> Self {
        SortOption::parse(value).unwrap_or(default)
    }

    pub fn values() -> Vec<&'static str> {
        SortOption::ALL.iter().map(|option| option.as_str()).collect()
    }

    /// `(value, label)` pairs in display order.
    pub fn options() -> Vec<(&'static str, &'static str)> {
        SortOption::ALL
            .iter()
            .map(|option| (option.as_str(), option.label()))
            .collect()
    }
}

impl FromStr for SortOption {
    type Err = InvalidSortOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOption::parse(s)
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
