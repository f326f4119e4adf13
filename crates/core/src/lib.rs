//! `jobboard-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, and the declarative request schemas
//! used to validate inbound payloads.

pub mod error;
pub mod id;
pub mod schema;

pub use error::{DomainError, DomainResult};
pub use id::{ApplicationId, JobId, UserId};
pub use schema::{
    FieldError, Location, ObjectSchema, RequestData, RequestSchema, SchemaCatalog, SchemaError,
    ValidatedRequest, ValidationErrors, validate,
};
