//! Database row types. These map directly to SQLite rows and are kept apart
//! from the noteloom-types models so the DB layer stays independent.

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use noteloom_types::{Note, User};
use tracing::warn;
use uuid::Uuid;

/// Fixed-width UTC format: lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let parsed = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))?;
    Ok(parsed.and_utc())
}

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            id: parse_id(&self.id, "user id", &self.id),
            created_at: parse_time(&self.created_at, "created_at", &self.id),
            name: self.name,
            email: self.email,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoteRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub is_important: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl NoteRow {
    pub fn into_note(self) -> Note {
        Note {
            id: parse_id(&self.id, "note id", &self.id),
            user_id: parse_id(&self.user_id, "user_id", &self.id),
            created_at: parse_time(&self.created_at, "created_at", &self.id),
            updated_at: parse_time(&self.updated_at, "updated_at", &self.id),
            title: self.title,
            content: self.content,
            is_important: self.is_important,
        }
    }
}

fn parse_id(value: &str, what: &str, row_id: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on row '{}': {}", what, value, row_id, e);
        Uuid::default()
    })
}

fn parse_time(value: &str, what: &str, row_id: &str) -> DateTime<Utc> {
    parse_timestamp(value).unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on row '{}': {}", what, value, row_id, e);
        DateTime::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_roundtrip_and_sort_lexicographically() {
        let early = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let late = early + chrono::Duration::microseconds(1);

        let a = format_timestamp(early);
        let b = format_timestamp(late);
        assert_eq!(a, "2025-01-02T03:04:05.000000Z");
        assert!(a < b);
        assert_eq!(parse_timestamp(&b).unwrap(), late);
    }

    #[test]
    fn accepts_sqlite_datetime_format() {
        let parsed = parse_timestamp("2025-11-01 22:57:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 11, 1, 22, 57, 30).unwrap());
    }
}
