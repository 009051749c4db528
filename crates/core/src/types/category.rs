//! Book categories
//!
//! Categories are opaque strings defined by the remote catalog. The list shipped
//! here is only the default offered in pickers; configuration may extend it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter sentinel meaning "no category filter"
pub const ALL_CATEGORIES: &str = "All";

const DEFAULT_CATEGORIES: [&str; 15] = [
    "Fiction",
    "Non-Fiction",
    "Science Fiction",
    "Fantasy",
    "Biography",
    "History",
    "Self-Help",
    "Adventure",
    "Mystery",
    "Romance",
    "Thriller",
    "Horror",
    "Business",
    "Technology",
    "Other",
];

/// A book category
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Creates a category from its display name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the category name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the built-in category list
    pub fn defaults() -> Vec<Category> {
        DEFAULT_CATEGORIES.iter().map(|name| Category::new(*name)).collect()
    }

    /// Parses a filter value coming from the UI.
    ///
    /// `"All"` (any case) and blank input mean "no filter" and yield `None`.
    pub fn parse_filter(raw: &str) -> Option<Category> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_CATEGORIES) {
            None
        } else {
            Some(Category::new(trimmed))
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Self(name)
    }
}
