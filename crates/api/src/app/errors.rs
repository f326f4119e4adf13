use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use jobboard_core::{DomainError, ValidatedRequest};

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound(resource) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{resource} not found"))
        }
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthorized", msg),
        DomainError::Internal(msg) => {
            tracing::error!(error = %msg, "internal error while handling request");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path identifier, turning a malformed value into a 400 response.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(domain_error_to_response)
}

/// Parse a path parameter that a validate gate has already checked.
pub fn parse_param<T>(validated: &ValidatedRequest, name: &str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr<Err = DomainError>,
{
    let raw = validated.param(name).ok_or_else(|| {
        domain_error_to_response(DomainError::internal(format!(
            "path parameter '{name}' was not validated"
        )))
    })?;
    parse_id(raw)
}
