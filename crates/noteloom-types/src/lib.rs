pub mod api;
pub mod list;
pub mod models;
pub mod page;
pub mod sort;
pub mod validation;

pub use list::{ListState, NoteStatistics};
pub use models::{Note, User};
pub use page::Page;
pub use sort::{InvalidSortOption, SortOption};
pub use validation::{NoteInput, ValidationErrors};
