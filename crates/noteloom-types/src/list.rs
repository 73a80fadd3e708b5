use serde::{Deserialize, Serialize};

use crate::sort::{InvalidSortOption, SortOption};

/// Raw list parameters as they arrive in a URL query string.
///
/// `page` stays text so a hand-edited link (`page=`, `page=abc`) still
/// reaches `ListState::from_query`, which falls back to page 1.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

/// Page-level state of the notes list: search text, sort choice and page.
///
/// Every mutation is followed by a re-render from this state. Changing the
/// search text or the sort resets the page to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    search: String,
    sort: SortOption,
    page: u32,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortOption::default(),
            page: 1,
        }
    }
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build state from URL parameters. An unknown `sort` token is an error.
    pub fn from_query(query: &ListQuery) -> Result<Self, InvalidSortOption> {
        let sort = match query.sort.as_deref() {
            Some(token) => SortOption::parse(token)?,
            None => SortOption::default(),
        };

        Ok(Self {
            search: query.search.clone().unwrap_or_default(),
            sort,
            page: query.page.as_deref().map_or(1, parse_page),
        })
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> SortOption {
        self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortOption) {
        self.sort = sort;
        self.page = 1;
    }

    pub fn go_to_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Copy of this state pointing at another page.
    pub fn with_page(&self, page: u32) -> Self {
        let mut next = self.clone();
        next.go_to_page(page);
        next
    }

    /// Shareable query string for this state. Default values are omitted, so
    /// the initial state renders as an empty string.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());

        let search = self.search.trim();
        if !search.is_empty() {
            serializer.append_pair("search", search);
        }
        if self.sort != SortOption::default() {
            serializer.append_pair("sort", self.sort.as_str());
        }
        if self.page > 1 {
            serializer.append_pair("page", &self.page.to_string());
        }

        serializer.finish()
    }
}

/// Lenient page number: anything that is not a positive integer is page 1.
fn parse_page(raw: &str) -> u32 {
    raw.trim().parse::<u32>().map_or(1, |page| page.max(1))
}

/// Counts describing a filtered note listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteStatistics {
    /// All notes of the user, search ignored.
    pub total: u64,
    /// Notes matching the current filters.
    pub filtered: u64,
    /// Important notes matching the current filters.
    pub important: u64,
    pub has_search: bool,
    pub search_text: String,
    pub sort_by: SortOption,
}
