//! Query model: which subset of the catalog is on screen
//!
//! A `BookQuery` is an immutable value. Every builder returns a new query, and
//! changing the term, category or sort always resets the page to 1.

use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default number of books per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Field the collection is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Title,
    Author,
    Year,
}

impl SortField {
    /// All sortable fields, in display order
    pub const ALL: [SortField; 3] = [SortField::Title, SortField::Author, SortField::Year];

    /// Wire name used in the `sort_by` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Author => "author",
            SortField::Year => "year",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a sort field name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown sort field '{0}' (expected title, author or year)")]
pub struct UnknownSortField(pub String);

impl FromStr for SortField {
    type Err = UnknownSortField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "author" => Ok(SortField::Author),
            "year" | "published_year" => Ok(SortField::Year),
            other => Err(UnknownSortField(other.to_string())),
        }
    }
}

/// Sort field plus direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub field: SortField,
    pub descending: bool,
}

impl SortSpec {
    /// Ascending order on `field`
    pub fn ascending(field: SortField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    /// Descending order on `field`
    pub fn descending(field: SortField) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// Same field, opposite direction
    pub fn toggled(self) -> Self {
        Self {
            field: self.field,
            descending: !self.descending,
        }
    }
}

/// Search term, category filter, sort and page of the collection view
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookQuery {
    term: Option<String>,
    category: Option<Category>,
    sort: SortSpec,
    page: u32,
    page_size: u32,
}

impl BookQuery {
    /// Creates the default query (no term, all categories, title ascending, page 1)
    pub fn new(page_size: u32) -> Self {
        Self {
            term: None,
            category: None,
            sort: SortSpec::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Normalises raw search input: trimmed, and blank means no term
    pub fn normalize_term(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// Category filter; `None` means all categories
    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    /// 1-based page number
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns a query with a new search term and page 1
    pub fn with_term(&self, raw: &str) -> Self {
        Self {
            term: Self::normalize_term(raw),
            page: 1,
            ..self.clone()
        }
    }

    /// Returns a query with a new category filter and page 1
    pub fn with_category(&self, category: Option<Category>) -> Self {
        Self {
            category,
            page: 1,
            ..self.clone()
        }
    }

    /// Returns a query with a new sort and page 1
    pub fn with_sort(&self, sort: SortSpec) -> Self {
        Self {
            sort,
            page: 1,
            ..self.clone()
        }
    }

    /// Returns a query for another page; page 0 becomes 1
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Number of pages needed for `total` matches
    pub fn total_pages(&self, total: u64) -> u32 {
        let size = u64::from(self.page_size);
        let pages = total.div_ceil(size);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Last navigable page; an empty collection still has page 1
    pub fn last_page(&self, total: u64) -> u32 {
        self.total_pages(total).max(1)
    }

    /// Clamps a requested page into `[1, last_page(total)]`
    pub fn clamp_page(&self, requested: u32, total: u64) -> u32 {
        requested.clamp(1, self.last_page(total))
    }
}

impl Default for BookQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
