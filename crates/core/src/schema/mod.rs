//! Declarative request schemas and the validator that checks payloads
//! against them.
//!
//! A [`RequestSchema`] describes the expected shape of a request's body, path
//! params and query string. [`validate`] is a pure function: it either
//! returns the normalized data or every field-level violation it found.

use serde::Serialize;
use thiserror::Error;

pub mod catalog;
pub mod object;
pub mod request;
pub mod rule;

pub use catalog::SchemaCatalog;
pub use object::ObjectSchema;
pub use request::{RequestData, RequestSchema, ValidatedRequest, validate};
pub use rule::FieldRule;

/// Which part of the request a field lives in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Body,
    Params,
    Query,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Body => "body",
            Location::Params => "params",
            Location::Query => "query",
        }
    }
}

impl core::fmt::Display for Location {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub location: Location,
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(location: Location, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every violation found while validating one request (never empty).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(transparent)]
#[error("{} invalid field(s): {}", .0.len(), summary(.0))]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }

    /// Convenience for a failure that is not tied to a declared field.
    pub fn single(location: Location, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(location, field, message)])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}.{}: {}", e.location, e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Schema construction failure (a programming error, surfaced at startup).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("field '{0}' is not declared by the base schema")]
    UnknownField(String),

    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),
}
