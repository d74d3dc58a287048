//! Payload validation for create/update schemas.
//!
//! Serde already rejects missing required fields and wrong types. Schemas that
//! need more (ranges, lengths) implement [`Validatable`]; the generated `POST`
//! and `PUT` handlers call it before anything reaches the service, so a failing
//! payload never causes a write.
//!
//! ```rust,ignore
//! use crudrouter::validation::{Validatable, ValidationErrors, validators};
//!
//! impl Validatable for UserCreate {
//!     fn validate(&self) -> Result<(), ValidationErrors> {
//!         let mut errors = ValidationErrors::new();
//!         if let Err(e) = validators::validate_range("age", self.age, Some(0), Some(150)) {
//!             errors.add(e);
//!         }
//!         errors.result()
//!     }
//! }
//! ```

use serde::Serialize;
use std::fmt;

/// A single failed field
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// All failures collected for one payload
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// `Ok(())` when nothing was collected.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was added.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by create/update schemas. The default accepts everything.
pub trait Validatable {
    /// # Errors
    ///
    /// Returns the collected field errors when the payload is invalid.
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Helpers for common field checks
pub mod validators {
    use super::ValidationError;
    use std::fmt;

    /// String length (in bytes) within `[min, max]`
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming `field` when out of bounds.
    pub fn validate_length(
        field: &str,
        value: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<(), ValidationError> {
        let len = value.len();
        if let Some(min_len) = min
            && len < min_len
        {
            return Err(ValidationError::new(
                field,
                format!("Must be at least {min_len} characters"),
            ));
        }
        if let Some(max_len) = max
            && len > max_len
        {
            return Err(ValidationError::new(
                field,
                format!("Must be at most {max_len} characters"),
            ));
        }
        Ok(())
    }

    /// Value within `[min, max]`
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming `field` when out of bounds.
    pub fn validate_range<T: PartialOrd + fmt::Display>(
        field: &str,
        value: T,
        min: Option<T>,
        max: Option<T>,
    ) -> Result<(), ValidationError> {
        if let Some(min_val) = min
            && value < min_val
        {
            return Err(ValidationError::new(field, format!("Must be at least {min_val}")));
        }
        if let Some(max_val) = max
            && value > max_val
        {
            return Err(ValidationError::new(field, format!("Must be at most {max_val}")));
        }
        Ok(())
    }

    /// Non-blank string
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming `field` when blank.
    pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new(field, "This field is required"));
        }
        Ok(())
    }
}
