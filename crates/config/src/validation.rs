//! Validation helpers for configuration values
//!
//! Each config section implements [`ConfigSection`], which includes
//! validation, so new sections plug in without touching the loader.

pub use crate::error::ValidationError;
use url::Url;

/// Trait for configuration sections that can validate themselves
pub trait ConfigSection: Default {
    /// Validates the configuration section
    ///
    /// Returns every problem found, not just the first.
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Merges another config section into this one
    ///
    /// Values from `other` take precedence. This is used for override chains.
    fn merge(&mut self, other: Self);

    /// Returns the section name for error reporting
    fn section_name(&self) -> &'static str;
}

/// Common validators for config values
pub struct Validator;

impl Validator {
    /// Validates that a numeric value is within a range
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(ValidationError::with_value(
                field,
                format!("must be between {} and {}", min, max),
                value,
            ))
        } else {
            Ok(())
        }
    }

    /// Validates that a string is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, "must not be empty"))
        } else {
            Ok(())
        }
    }

    /// Validates that a string is an absolute http or https URL
    pub fn http_url(value: &str, field: &str) -> Result<(), ValidationError> {
        match Url::parse(value.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
            Ok(_) => Err(ValidationError::with_value(
                field,
                "must be an http or https URL",
                value,
            )),
            Err(e) => Err(ValidationError::with_value(
                field,
                format!("is not a valid URL ({})", e),
                value,
            )),
        }
    }

    /// Validates that a value is one of the allowed options
    pub fn one_of<T>(value: &T, allowed: &[T], field: &str) -> Result<(), ValidationError>
    where
        T: PartialEq + std::fmt::Display,
    {
        if !allowed.contains(value) {
            let allowed_str = allowed
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(ValidationError::with_value(
                field,
                format!("must be one of: {}", allowed_str),
                value,
            ))
        } else {
            Ok(())
        }
    }

    /// Collects multiple validation results into a single result
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_valid() {
        assert!(Validator::in_range(50, 0, 100, "test").is_ok());
        assert!(Validator::in_range(0, 0, 100, "test").is_ok());
        assert!(Validator::in_range(100, 0, 100, "test").is_ok());
    }

    #[test]
    fn test_in_range_invalid() {
        assert!(Validator::in_range(-1, 0, 100, "test").is_err());
        assert!(Validator::in_range(101, 0, 100, "test").is_err());
    }

    #[test]
    fn test_not_empty() {
        assert!(Validator::not_empty("  hello  ", "test").is_ok());
        assert!(Validator::not_empty("", "test").is_err());
        assert!(Validator::not_empty("   ", "test").is_err());
    }

    #[test]
    fn test_http_url() {
        assert!(Validator::http_url("http://localhost:8000", "api.base_url").is_ok());
        assert!(Validator::http_url("https://books.example.com/api/", "api.base_url").is_ok());

        let err = Validator::http_url("ftp://books.example.com", "api.base_url").unwrap_err();
        assert_eq!(err.field, "api.base_url");
        assert!(err.message.contains("http or https"));

        assert!(Validator::http_url("localhost:8000", "api.base_url").is_err());
        assert!(Validator::http_url("", "api.base_url").is_err());
    }

    #[test]
    fn test_one_of() {
        assert!(Validator::one_of(&"red", &["red", "green", "blue"], "test").is_ok());
        assert!(Validator::one_of(&"yellow", &["red", "green", "blue"], "test").is_err());
    }

    #[test]
    fn test_collect_errors() {
        assert!(Validator::collect_errors(vec![Ok(()), Ok(())]).is_ok());

        let result = Validator::collect_errors(vec![
            Ok(()),
            Err(ValidationError::new("field1", "error1")),
            Err(ValidationError::new("field2", "error2")),
        ]);
        assert_eq!(result.unwrap_err().len(), 2);
    }
}
