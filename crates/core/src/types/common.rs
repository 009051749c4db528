//! Common types and utilities shared across domain models

use std::fmt;

/// A validation failure attached to a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as it appears on the wire (e.g. "published_year")
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl FieldError {
    /// Creates a new field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Trait for types that can validate themselves
pub trait Validator {
    /// Validates the instance and returns every failing field
    fn validate(&self) -> Result<(), Vec<FieldError>>;

    /// Returns true if the instance is valid
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::new("title", "Title is required");
        assert_eq!(err.to_string(), "title: Title is required");
    }

    #[test]
    fn test_validator_trait() {
        struct Shelf {
            capacity: i32,
        }

        impl Validator for Shelf {
            fn validate(&self) -> Result<(), Vec<FieldError>> {
                if self.capacity < 0 {
                    Err(vec![FieldError::new("capacity", "must be positive")])
                } else {
                    Ok(())
                }
            }
        }

        assert!(Shelf { capacity: 10 }.is_valid());
        assert!(!Shelf { capacity: -5 }.is_valid());
    }
}
