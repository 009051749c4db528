//! Catalog view configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use libris_core::{Category, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Paging, search and category settings for the collection view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Books per page
    pub page_size: u32,

    /// Quiet window before a typed search term is sent, in milliseconds
    pub search_debounce_ms: u64,

    /// Categories offered when adding or editing a book
    pub categories: Vec<String>,
}

impl CatalogConfig {
    /// Debounce window as a `Duration`
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Configured categories as typed values
    pub fn category_list(&self) -> Vec<Category> {
        self.categories.iter().map(Category::new).collect()
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: 300,
            categories: Category::defaults()
                .into_iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        }
    }
}

impl ConfigSection for CatalogConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![
            Validator::in_range(self.page_size, 1, 100, "catalog.page_size"),
            Validator::in_range(self.search_debounce_ms, 0, 5000, "catalog.search_debounce_ms"),
        ];

        if self.categories.is_empty() {
            results.push(Err(ValidationError::new(
                "catalog.categories",
                "must list at least one category",
            )));
        }
        for (index, name) in self.categories.iter().enumerate() {
            results.push(Validator::not_empty(
                name,
                &format!("catalog.categories[{}]", index),
            ));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.page_size = other.page_size;
        self.search_debounce_ms = other.search_debounce_ms;
        self.categories = other.categories;
    }

    fn section_name(&self) -> &'static str {
        "catalog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CatalogConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 10);
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.categories.len(), 15);
    }

    #[test]
    fn test_page_size_range() {
        let mut config = CatalogConfig::default();
        config.page_size = 0;
        assert!(config.validate().is_err());

        config.page_size = 101;
        assert!(config.validate().is_err());

        config.page_size = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debounce_range() {
        let mut config = CatalogConfig::default();
        config.search_debounce_ms = 0;
        assert!(config.validate().is_ok());

        config.search_debounce_ms = 5001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_categories() {
        let mut config = CatalogConfig::default();
        config.categories.clear();
        assert!(config.validate().is_err());

        config.categories = vec!["Poetry".to_string(), " ".to_string()];
        let errors = config.validate().unwrap_err();
        assert_eq!(errors[0].field, "catalog.categories[1]");

        config.categories.pop();
        assert_eq!(config.category_list(), vec![Category::new("Poetry")]);
    }
}
