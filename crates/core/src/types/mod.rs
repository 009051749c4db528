//! Domain types for libris
//!
//! This module contains the domain models organized by responsibility:
//! - `book`: Book entity, drafts and result pages
//! - `category`: Opaque category values and the "All" filter sentinel
//! - `query`: The query model (term, category, sort, page)
//! - `common`: Shared validation trait

mod book;
mod category;
mod common;
mod query;

// Re-export all public types
pub use book::{current_year, Book, BookDraft, BookId, BookPage, MIN_PUBLISHED_YEAR};
pub use category::{Category, ALL_CATEGORIES};
pub use common::{FieldError, Validator};
pub use query::{BookQuery, SortField, SortSpec, UnknownSortField, DEFAULT_PAGE_SIZE};
