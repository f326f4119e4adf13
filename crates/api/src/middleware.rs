//! Gate implementations: each takes the request and either hands it back
//! (possibly with something attached) or rejects it.

use std::collections::HashMap;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart, Query, Request},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
};
use chrono::Utc;
use serde_json::{Map, Value};

use jobboard_auth::{JwtValidator, Role, authorize_role};
use jobboard_core::{Location, RequestData, RequestSchema, ValidationErrors, validate};

use crate::context::{IdentityContext, PathParams, UploadedFile};
use crate::pipeline::GateError;

/// Verify the bearer token and attach the caller's identity.
pub fn authenticate(jwt: &dyn JwtValidator, mut req: Request) -> Result<Request, GateError> {
    let token = extract_bearer(req.headers())?;

    let claims = jwt
        .validate(token, Utc::now())
        .map_err(|e| GateError::Unauthenticated(e.to_string()))?;

    req.extensions_mut()
        .insert(IdentityContext::new(claims.sub, claims.role));

    Ok(req)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, GateError> {
    let unauthenticated = |msg: &str| GateError::Unauthenticated(msg.to_string());

    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| unauthenticated("missing bearer token"))?;

    let header = header
        .to_str()
        .map_err(|_| unauthenticated("authorization header is not valid text"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthenticated("expected 'Authorization: Bearer <token>'"))?
        .trim();

    if token.is_empty() {
        return Err(unauthenticated("missing bearer token"));
    }

    Ok(token)
}

/// Require the identity attached by an earlier authenticate gate to hold `required`.
pub fn authorize(required: Role, req: Request) -> Result<Request, GateError> {
    let identity = req
        .extensions()
        .get::<IdentityContext>()
        .ok_or_else(|| GateError::Unauthenticated("no authenticated identity".to_string()))?;

    authorize_role(identity.role(), required)?;
    Ok(req)
}

/// Check the request against `schema`.
///
/// On success the normalized [`jobboard_core::ValidatedRequest`] is attached,
/// and when the schema declares a body the request body is replaced by the
/// normalized JSON (undeclared keys removed).
pub async fn validate_request(schema: &RequestSchema, req: Request) -> Result<Request, GateError> {
    let (mut parts, body) = req.into_parts();

    let mut data = RequestData {
        body: None,
        params: path_params(&parts),
        query: query_params(&parts)?,
    };

    let passthrough = if schema.body.is_some() {
        let bytes = buffer_body(&parts, body).await?;
        data.body = parse_json_body(&bytes)?;
        None
    } else {
        Some(body)
    };

    let validated = validate(schema, &data)?;

    let body = match (passthrough, &validated.body) {
        (Some(body), _) => body,
        (None, Some(json)) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            parts
                .headers
                .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Body::from(json.to_string())
        }
        (None, None) => Body::empty(),
    };

    parts.extensions.insert(validated);
    Ok(Request::from_parts(parts, body))
}

/// Read the whole body under the route's `DefaultBodyLimit`.
async fn buffer_body(parts: &Parts, body: Body) -> Result<Bytes, GateError> {
    let mut buffered = Request::new(body);
    *buffered.headers_mut() = parts.headers.clone();
    *buffered.extensions_mut() = parts.extensions.clone();

    Bytes::from_request(buffered, &()).await.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GateError::PayloadTooLarge
        } else {
            GateError::Body(rejection.body_text())
        }
    })
}

fn path_params(parts: &Parts) -> Map<String, Value> {
    // Routes without captures have no params to extract.
    parts
        .extensions
        .get::<PathParams>()
        .map(|PathParams(captures)| {
            captures
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect()
        })
        .unwrap_or_default()
}

fn query_params(parts: &Parts) -> Result<Map<String, Value>, GateError> {
    let Query(query) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map_err(|_| ValidationErrors::single(Location::Query, "query", "Malformed query string"))?;

    Ok(query
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect())
}

fn parse_json_body(bytes: &[u8]) -> Result<Option<Value>, GateError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|_| ValidationErrors::single(Location::Body, "body", "Malformed JSON body").into())
}

/// Parse a multipart body that may carry at most one file, in `field`.
///
/// Text parts are ignored. The accepted file (if any) is attached as an
/// [`UploadedFile`]; the handler decides whether a missing file is an error.
pub async fn single_file(field: &'static str, req: Request) -> Result<Request, GateError> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));
    if !is_multipart {
        return Err(GateError::Upload("expected a multipart/form-data body".to_string()));
    }

    let (mut parts, body) = req.into_parts();

    // Multipart consumes a whole request; lend it the headers and extensions
    // (the body limit lives there) and keep `parts` for the handler.
    let mut upload = Request::new(body);
    *upload.headers_mut() = parts.headers.clone();
    *upload.extensions_mut() = parts.extensions.clone();

    let mut multipart = Multipart::from_request(upload, &())
        .await
        .map_err(|rejection| GateError::Upload(rejection.body_text()))?;

    let mut accepted: Option<UploadedFile> = None;
    while let Some(part) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(file_name) = part.file_name().map(str::to_string) else {
            continue;
        };
        let name = part.name().unwrap_or_default().to_string();

        if name != field {
            return Err(GateError::Upload(format!("Unexpected field '{name}'")));
        }
        if accepted.is_some() {
            return Err(GateError::Upload(format!(
                "Only one file is allowed in field '{field}'"
            )));
        }

        let content_type = part.content_type().map(str::to_string);
        let bytes = part.bytes().await.map_err(multipart_error)?;
        accepted = Some(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }

    if let Some(file) = accepted {
        parts.extensions.insert(file);
    }
    parts.headers.remove(header::CONTENT_LENGTH);

    Ok(Request::from_parts(parts, Body::empty()))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> GateError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GateError::PayloadTooLarge
    } else {
        GateError::Upload(e.body_text())
    }
}
