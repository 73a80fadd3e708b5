use crate::models::{NoteRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, Row};

/// Column list matching `map_note_row`. A NULL importance flag reads as false.
pub(crate) const NOTE_COLUMNS: &str =
    "id, user_id, title, content, COALESCE(is_important, 0), created_at, updated_at";

/// Per-user note totals used by the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummaryRow {
    pub total: u64,
    pub important: u64,
    pub last_updated: Option<String>,
}

impl Database {
    // -- Users --

    /// Insert a user. Returns false when the email is already registered.
    pub fn create_user(&self, id: &str, name: &str, email: &str, password_hash: &str, created_at: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, name, email, password, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, name, email, password_hash, created_at),
            );
            match inserted {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Notes --

    pub fn insert_note(&self, note: &NoteRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notes (id, user_id, title, content, is_important, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    note.id,
                    note.user_id,
                    note.title,
                    note.content,
                    note.is_important,
                    note.created_at,
                    note.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Fetch a note by id regardless of owner. Callers check ownership.
    pub fn get_note(&self, id: &str) -> Result<Option<NoteRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS);
            let row = conn.query_row(&sql, [id], map_note_row).optional()?;
            Ok(row)
        })
    }

    /// Update title, content and flag of a note owned by `user_id`.
    /// Returns false when no such note exists for that owner.
    pub fn update_note(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        content: &str,
        is_important: bool,
        updated_at: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notes SET title = ?3, content = ?4, is_important = ?5, updated_at = ?6
                 WHERE id = ?1 AND user_id = ?2",
                rusqlite::params![id, user_id, title, content, is_important, updated_at],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete a note owned by `user_id`. Returns false when nothing matched.
    pub fn delete_note(&self, id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
                (id, user_id),
            )?;
            Ok(changed > 0)
        })
    }

    pub fn note_summary(&self, user_id: &str) -> Result<NoteSummaryRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(COALESCE(is_important, 0)), 0), MAX(updated_at)
                 FROM notes WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok(NoteSummaryRow {
                        total: row.get::<_, i64>(0)? as u64,
                        important: row.get::<_, i64>(1)? as u64,
                        last_updated: row.get(2)?,
                    })
                },
            )?;
            Ok(row)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, name, email, password, created_at FROM users WHERE {} = ?1",
        column
    );
    let row = conn
        .query_row(&sql, [value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

pub(crate) fn map_note_row(row: &Row<'_>) -> rusqlite::Result<NoteRow> {
    Ok(NoteRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        is_important: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
