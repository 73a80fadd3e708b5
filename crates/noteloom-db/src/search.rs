//! Composable, owner-scoped note queries.
//!
//! ```ignore
//! let page = NoteSearch::new(&db)
//!     .for_user(user_id)
//!     .search("meeting")
//!     .sort(SortOption::Importance)
//!     .paginate(6, 1)?;
//! ```
//!
//! Every statement this builder runs carries `user_id = ?1` as its first
//! condition. A builder without an owner runs nothing and reports empty
//! results.

use anyhow::Result;
use noteloom_types::{InvalidSortOption, Note, NoteStatistics, Page, SortOption};
use rusqlite::types::Value;
use tracing::warn;
use uuid::Uuid;

use crate::Database;
use crate::queries::{NOTE_COLUMNS, map_note_row};

pub struct NoteSearch<'a> {
    db: &'a Database,
    user_id: Option<String>,
    search_text: String,
    sort: SortOption,
    only_important: bool,
}

/// Which of the builder's filters a statement should carry.
#[derive(Clone, Copy)]
struct Filters {
    search: bool,
    important: bool,
}

impl<'a> NoteSearch<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            user_id: None,
            search_text: String::new(),
            sort: SortOption::default(),
            only_important: false,
        }
    }

    /// Restrict everything that follows to notes owned by `user_id`.
    pub fn for_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Case-insensitive substring match on title or content. Input is
    /// trimmed; blank text clears the filter.
    pub fn search(mut self, text: &str) -> Self {
        self.search_text = text.trim().to_string();
        self
    }

    pub fn sort(mut self, option: SortOption) -> Self {
        self.sort = option;
        self
    }

    /// Sort by a URL token such as `"newest"`.
    pub fn sort_by(self, token: &str) -> Result<Self, InvalidSortOption> {
        let option = SortOption::parse(token)?;
        Ok(self.sort(option))
    }

    pub fn only_important(mut self) -> Self {
        self.only_important = true;
        self
    }

    pub fn has_search_filter(&self) -> bool {
        !self.search_text.is_empty()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn sort_option(&self) -> SortOption {
        self.sort
    }

    // -- Execution --

    /// Run the query and return page `page` (1-based) of `per_page` notes.
    pub fn paginate(&self, per_page: u32, page: u32) -> Result<Page<Note>> {
        let per_page = per_page.max(1);
        let current_page = page.max(1);

        let Some(owner) = self.owner("paginate") else {
            return Ok(Page {
                items: vec![],
                total: 0,
                per_page,
                current_page,
            });
        };

        let total = self.count_matching(owner, self.filters())?;
        let offset = i64::from(current_page - 1) * i64::from(per_page);
        let items = self.select(owner, Some((i64::from(per_page), offset)))?;

        Ok(Page {
            items,
            total,
            per_page,
            current_page,
        })
    }

    /// All matching notes in sort order.
    pub fn get(&self) -> Result<Vec<Note>> {
        match self.owner("get") {
            Some(owner) => self.select(owner, None),
            None => Ok(vec![]),
        }
    }

    pub fn first(&self) -> Result<Option<Note>> {
        match self.owner("first") {
            Some(owner) => Ok(self.select(owner, Some((1, 0)))?.into_iter().next()),
            None => Ok(None),
        }
    }

    /// Notes matching the current filters.
    pub fn count(&self) -> Result<u64> {
        match self.owner("count") {
            Some(owner) => self.count_matching(owner, self.filters()),
            None => Ok(0),
        }
    }

    /// Important notes matching the current filters.
    pub fn count_important(&self) -> Result<u64> {
        let Some(owner) = self.owner("count_important") else {
            return Ok(0);
        };
        let filters = Filters {
            search: true,
            important: true,
        };
        self.count_matching(owner, filters)
    }

    /// All of the user's notes, ignoring search and importance filters.
    pub fn count_without_search(&self) -> Result<u64> {
        let Some(owner) = self.owner("count_without_search") else {
            return Ok(0);
        };
        let filters = Filters {
            search: false,
            important: false,
        };
        self.count_matching(owner, filters)
    }

    pub fn statistics(&self) -> Result<NoteStatistics> {
        Ok(NoteStatistics {
            total: self.count_without_search()?,
            filtered: self.count()?,
            important: self.count_important()?,
            has_search: self.has_search_filter(),
            search_text: self.search_text.clone(),
            sort_by: self.sort,
        })
    }

    // -- SQL assembly --

    fn owner(&self, operation: &str) -> Option<&str> {
        if self.user_id.is_none() {
            warn!("NoteSearch::{} called without for_user; returning no notes", operation);
        }
        self.user_id.as_deref()
    }

    fn filters(&self) -> Filters {
        Filters {
            search: true,
            important: self.only_important,
        }
    }

    /// WHERE clause (owner first) and its positional parameters.
    fn where_clause(&self, owner: &str, filters: Filters) -> (String, Vec<Value>) {
        let mut conditions = vec!["user_id = ?1".to_string()];
        let mut params = vec![Value::Text(owner.to_string())];

        if filters.search && self.has_search_filter() {
            params.push(Value::Text(self.search_text.to_lowercase()));
            let n = params.len();
            conditions.push(format!(
                "(contains_ci(title, ?{n}) OR contains_ci(content, ?{n}))"
            ));
        }
        if filters.important {
            conditions.push("COALESCE(is_important, 0) = 1".to_string());
        }

        (conditions.join(" AND "), params)
    }

    fn order_clause(&self) -> &'static str {
        match self.sort {
            SortOption::Importance => "COALESCE(is_important, 0) DESC, updated_at DESC, rowid DESC",
            SortOption::Newest => "created_at DESC, rowid DESC",
            SortOption::Oldest => "created_at ASC, rowid ASC",
        }
    }

    fn count_matching(&self, owner: &str, filters: Filters) -> Result<u64> {
        let (clause, params) = self.where_clause(owner, filters);
        let sql = format!("SELECT COUNT(*) FROM notes WHERE {}", clause);

        self.db.with_conn(|conn| {
            let count: i64 =
                conn.query_row(&sql, rusqlite::params_from_iter(params.iter()), |r| r.get(0))?;
            Ok(count as u64)
        })
    }

    fn select(&self, owner: &str, limit: Option<(i64, i64)>) -> Result<Vec<Note>> {
        let (clause, mut params) = self.where_clause(owner, self.filters());
        let mut sql = format!(
            "SELECT {} FROM notes WHERE {} ORDER BY {}",
            NOTE_COLUMNS,
            clause,
            self.order_clause()
        );
        if let Some((limit, offset)) = limit {
            params.push(Value::Integer(limit));
            params.push(Value::Integer(offset));
            sql.push_str(&format!(" LIMIT ?{} OFFSET ?{}", params.len() - 1, params.len()));
        }

        let rows = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params.iter()), map_note_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        Ok(rows.into_iter().map(|row| row.into_note()).collect())
    }
}
