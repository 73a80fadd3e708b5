use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::list::NoteStatistics;
use crate::models::Note;
use crate::sort::SortOption;
use crate::validation::{CONTENT_MIN_CHARS, TITLE_MAX_CHARS, TITLE_MIN_CHARS, ValidationErrors};

// -- JWT Claims --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if errors.require("name", &self.name) {
            errors.max_chars("name", &self.name, 255);
        }
        if errors.require("email", &self.email) {
            errors.email("email", self.email.trim());
        }
        if errors.require("password", &self.password) {
            errors.min_chars("password", &self.password, 8);
        }
        errors.into_result()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub name: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if errors.require("email", &self.email) {
            errors.email("email", self.email.trim());
        }
        if errors.require("password", &self.password) {
            errors.min_chars("password", &self.password, 6);
        }
        errors.into_result()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub name: String,
    pub token: String,
}

// -- Note forms --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormLimits {
    pub title_min: usize,
    pub title_max: usize,
    pub content_min: usize,
}

impl Default for FormLimits {
    fn default() -> Self {
        Self {
            title_min: TITLE_MIN_CHARS,
            title_max: TITLE_MAX_CHARS,
            content_min: CONTENT_MIN_CHARS,
        }
    }
}

/// Data backing the create and edit forms. `id` is absent for a new note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteForm {
    pub id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub is_important: bool,
    pub limits: FormLimits,
}

impl NoteForm {
    pub fn blank() -> Self {
        Self {
            id: None,
            title: String::new(),
            content: String::new(),
            is_important: false,
            limits: FormLimits::default(),
        }
    }

    pub fn for_note(note: &Note) -> Self {
        Self {
            id: Some(note.id),
            title: note.title.clone(),
            content: note.content.clone(),
            is_important: note.is_important,
            limits: FormLimits::default(),
        }
    }
}

// -- Listing --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortOptionInfo {
    pub value: SortOption,
    pub label: String,
    pub description: String,
}

impl From<SortOption> for SortOptionInfo {
    fn from(option: SortOption) -> Self {
        Self {
            value: option,
            label: option.label().to_string(),
            description: option.description().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub from: Option<u64>,
    pub to: Option<u64>,
    /// False when everything fits on one page and no links are needed.
    pub has_pages: bool,
    /// Page numbers to offer as direct links.
    pub pages: Vec<u32>,
}

/// Query strings reflecting the list state, for shareable URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListLinks {
    #[serde(rename = "self")]
    pub current: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteListResponse {
    pub notes: Vec<Note>,
    pub pagination: Pagination,
    pub statistics: NoteStatistics,
    pub sort_options: Vec<SortOptionInfo>,
    pub links: ListLinks,
}

// -- Dashboard --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_notes: u64,
    pub important_notes: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub summary: DashboardSummary,
    pub list: NoteListResponse,
}
