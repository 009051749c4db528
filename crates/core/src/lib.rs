//! Core domain types for the libris book catalog client
//!
//! - `types`: books, categories and the query model driving the collection view
//! - `pagination`: page-number list shown under the collection
//! - `error`: the error taxonomy shared by the gateway and the controller

pub mod error;
pub mod pagination;
pub mod types;

// Re-export commonly used types
pub use error::{CatalogError, CatalogResult, ErrorSeverity};
pub use pagination::{page_list, ELLIPSIS};
pub use types::{
    current_year, Book, BookDraft, BookId, BookPage, BookQuery, Category, FieldError, SortField, SortSpec,
    UnknownSortField, Validator, ALL_CATEGORIES, DEFAULT_PAGE_SIZE, MIN_PUBLISHED_YEAR,
};
