use std::fmt;

use thiserror::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the offending field, e.g. `lease.monthlyRent`.
    pub field: &'static str,
    pub message: String,
}

/// Every violation found by one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }

    pub(crate) fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join(", "))
    }
}

/// Outcome of a failed generation call. No bytes are produced in either case.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Données invalides: {0}")]
    Validation(ValidationErrors),

    #[error("PDF generation failed: {0}")]
    Generation(String),
}

impl From<anyhow::Error> for GenerationError {
    fn from(err: anyhow::Error) -> Self {
        GenerationError::Generation(format!("{err:#}"))
    }
}

/// Reasons an image is left out of the document. Logged, never returned.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to fetch {reference}: {reason}")]
    Fetch { reference: String, reason: String },

    #[error("unsupported image format for {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode {reference}: {reason}")]
    Decode { reference: String, reason: String },
}
