//! Book domain model

use crate::types::{Category, FieldError, Validator};
use chrono::Datelike;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Earliest publication year accepted for a book
pub const MIN_PUBLISHED_YEAR: i32 = 1000;

/// Returns the current calendar year (UTC)
pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Identifier assigned by the remote catalog. Never generated locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    /// Wraps a server-assigned identifier
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BookId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl FromStr for BookId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A book without an identifier: the payload of create and update requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub published_year: i32,
    pub category: Category,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cover_image: String,
}

impl BookDraft {
    /// Creates a draft with the required fields
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        published_year: i32,
        category: Category,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            published_year,
            category,
            description: String::new(),
            cover_image: String::new(),
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the cover image URL
    pub fn with_cover_image(mut self, url: impl Into<String>) -> Self {
        self.cover_image = url.into();
        self
    }

    /// Returns the cover image URL, if one is set
    pub fn cover_image_url(&self) -> Option<&str> {
        Some(self.cover_image.trim()).filter(|url| !url.is_empty())
    }
}

impl Validator for BookDraft {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }

        if self.author.trim().is_empty() {
            errors.push(FieldError::new("author", "Author is required"));
        }

        if self.published_year < MIN_PUBLISHED_YEAR {
            errors.push(FieldError::new(
                "published_year",
                format!("Year must be {} or later", MIN_PUBLISHED_YEAR),
            ));
        } else if self.published_year > current_year() {
            errors.push(FieldError::new(
                "published_year",
                "Year cannot be in the future",
            ));
        }

        if self.category.as_str().trim().is_empty() {
            errors.push(FieldError::new("category", "Category is required"));
        }

        if let Some(url) = self.cover_image_url() {
            if url::Url::parse(url).is_err() {
                errors.push(FieldError::new("cover_image", "Must be a valid URL"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A catalog entry as stored by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub published_year: i32,
    pub category: Category,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cover_image: String,
}

impl Book {
    /// Combines a server-assigned id with a draft
    pub fn from_draft(id: BookId, draft: BookDraft) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            published_year: draft.published_year,
            category: draft.category,
            description: draft.description,
            cover_image: draft.cover_image,
        }
    }

    /// Returns the mutable part of this book
    pub fn draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            published_year: self.published_year,
            category: self.category.clone(),
            description: self.description.clone(),
            cover_image: self.cover_image.clone(),
        }
    }

    /// Returns the cover image URL, if one is set
    pub fn cover_image_url(&self) -> Option<&str> {
        Some(self.cover_image.trim()).filter(|url| !url.is_empty())
    }
}

/// One page of the remote collection plus the count of all matches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub total: u64,
}
