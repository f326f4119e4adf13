//! Route table and per-route request pipelines.
//!
//! Every route declares its own ordered list of gates. Nothing is inherited
//! from routes declared earlier: the access policy of an endpoint is exactly
//! what its entry lists. When a gate rejects, later gates and the handler are
//! never run.
//!
//! Declaration order decides between a parameterized path and a static path
//! it also matches: the static path still serves the methods it declares, and
//! any other method falls through to the earlier parameterized entry.

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRequestParts, RawPathParams, Request, State},
    handler::Handler,
    http::{Method, StatusCode},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{self, MethodRouter},
};
use serde_json::json;
use thiserror::Error;

use jobboard_auth::{AuthzError, JwtValidator, Role};
use jobboard_core::{RequestSchema, ValidationErrors};

use crate::app::errors::json_error;
use crate::context::PathParams;
use crate::middleware;

// -------------------------
// Gates
// -------------------------

/// A pipeline step that may terminate the request.
#[derive(Debug, Clone)]
pub enum Gate {
    /// Require a valid bearer token; attaches the caller's identity.
    Authenticate,
    /// Require the authenticated caller to hold this role.
    Authorize(Role),
    /// Require the request to match a payload schema.
    Validate(Arc<RequestSchema>),
    /// Accept a multipart body with at most one file, in the named field.
    SingleFile(&'static str),
}

impl core::fmt::Display for Gate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Gate::Authenticate => f.write_str("authenticate"),
            Gate::Authorize(role) => write!(f, "authorize({role})"),
            Gate::Validate(_) => f.write_str("validate"),
            Gate::SingleFile(field) => write!(f, "single-file({field})"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("invalid upload: {0}")]
    Upload(String),

    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,

    #[error("request body could not be read: {0}")]
    Body(String),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match self {
            GateError::Unauthenticated(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthenticated", msg),
            GateError::Forbidden(e) => json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()),
            GateError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "error": "validation_error",
                    "message": "request validation failed",
                    "errors": errors,
                })),
            )
                .into_response(),
            GateError::Upload(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_upload", msg),
            GateError::PayloadTooLarge => json_error(
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "request body exceeds the configured limit",
            ),
            GateError::Body(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_body", msg),
        }
    }
}

/// Shared collaborators the gates need.
#[derive(Clone)]
pub struct GateContext {
    pub jwt: Arc<dyn JwtValidator>,
    pub max_json_bytes: usize,
    pub max_upload_bytes: usize,
}

impl Gate {
    async fn apply(&self, ctx: &GateContext, req: Request) -> Result<Request, GateError> {
        match self {
            Gate::Authenticate => middleware::authenticate(ctx.jwt.as_ref(), req),
            Gate::Authorize(role) => middleware::authorize(*role, req),
            Gate::Validate(schema) => middleware::validate_request(schema, req).await,
            Gate::SingleFile(field) => middleware::single_file(field, req).await,
        }
    }
}

// -------------------------
// Route entries
// -------------------------

/// One endpoint: method, path pattern, ordered gates, handler.
pub struct RouteEntry {
    method: Method,
    path: &'static str,
    gates: Vec<Gate>,
    endpoint: MethodRouter,
}

impl RouteEntry {
    fn with(method: Method, path: &'static str, endpoint: MethodRouter) -> Self {
        Self {
            method,
            path,
            gates: Vec::new(),
            endpoint,
        }
    }

    pub fn get<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self::with(Method::GET, path, routing::get(handler))
    }

    pub fn post<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self::with(Method::POST, path, routing::post(handler))
    }

    pub fn patch<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self::with(Method::PATCH, path, routing::patch(handler))
    }

    pub fn delete<H, T>(path: &'static str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self::with(Method::DELETE, path, routing::delete(handler))
    }

    /// Append a gate; gates run in the order they are added.
    pub fn gate(mut self, gate: Gate) -> Self {
        self.gates.push(gate);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    fn is_upload(&self) -> bool {
        self.gates.iter().any(|g| matches!(g, Gate::SingleFile(_)))
    }
}

impl core::fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let gates = self.gates.iter().map(Gate::to_string).collect::<Vec<_>>();
        write!(f, "{} {} [{}]", self.method, self.path, gates.join(", "))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("route {method} {path} is declared more than once")]
    Duplicate { method: Method, path: &'static str },

    #[error("route {method} {path} authorizes before authenticating")]
    AuthorizeWithoutAuthenticate { method: Method, path: &'static str },

    #[error("route {method} {path} is unreachable behind {method} {by}")]
    Shadowed {
        method: Method,
        path: &'static str,
        by: &'static str,
    },
}

// -------------------------
// Route table
// -------------------------

/// Ordered list of route entries for one router.
#[derive(Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, entry: RouteEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Reject tables with duplicate (method, path) pairs, with a static path
    /// that an earlier parameterized entry of the same method already claims,
    /// or with a role check that no earlier gate of the same entry
    /// authenticates for.
    pub fn check(&self) -> Result<(), RouteTableError> {
        for (i, entry) in self.entries.iter().enumerate() {
            let earlier = self.entries[..i].iter().filter(|e| e.method == entry.method);

            for e in earlier {
                if e.path == entry.path {
                    return Err(RouteTableError::Duplicate {
                        method: entry.method.clone(),
                        path: entry.path,
                    });
                }
                if is_static(entry.path) && !is_static(e.path) && captures_for(e.path, entry.path).is_some() {
                    return Err(RouteTableError::Shadowed {
                        method: entry.method.clone(),
                        path: entry.path,
                        by: e.path,
                    });
                }
            }

            let mut authenticated = false;
            for gate in &entry.gates {
                match gate {
                    Gate::Authenticate => authenticated = true,
                    Gate::Authorize(_) if !authenticated => {
                        return Err(RouteTableError::AuthorizeWithoutAuthenticate {
                            method: entry.method.clone(),
                            path: entry.path,
                        });
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Static paths that a parameterized entry also matches, for methods the
    /// static path does not declare itself. The first matching entry per
    /// method wins.
    fn fallthroughs(&self) -> Vec<Fallthrough> {
        let mut out: Vec<Fallthrough> = Vec::new();
        for target in self.entries.iter().filter(|e| is_static(e.path)) {
            for (index, entry) in self.entries.iter().enumerate() {
                if is_static(entry.path)
                    || self.declares(&entry.method, target.path)
                    || out.iter().any(|f| f.path == target.path && self.entries[f.entry].method == entry.method)
                {
                    continue;
                }
                if let Some(captures) = captures_for(entry.path, target.path) {
                    out.push(Fallthrough {
                        entry: index,
                        path: target.path,
                        captures,
                    });
                }
            }
        }
        out
    }

    fn declares(&self, method: &Method, path: &str) -> bool {
        self.entries.iter().any(|e| &e.method == method && e.path == path)
    }

    /// Build an axum router where each endpoint runs its own gate pipeline.
    ///
    /// Gates only run for requests whose method matched; anything else gets
    /// axum's 405 untouched.
    pub fn into_router(self, ctx: &GateContext) -> Result<Router, RouteTableError> {
        self.check()?;
        let fallthroughs = self.fallthroughs();

        let mut router = Router::new();
        for (index, entry) in self.entries.into_iter().enumerate() {
            let body_limit = if entry.is_upload() {
                ctx.max_upload_bytes
            } else {
                ctx.max_json_bytes
            };
            let route = entry.to_string();
            let layered = |captures: Option<Vec<(String, String)>>| {
                let pipeline = Arc::new(Pipeline {
                    route: route.clone(),
                    gates: entry.gates.clone(),
                    captures,
                    ctx: ctx.clone(),
                });
                entry
                    .endpoint
                    .clone()
                    .route_layer(from_fn_with_state(pipeline, run_pipeline))
                    .route_layer(DefaultBodyLimit::max(body_limit))
            };

            for f in fallthroughs.iter().filter(|f| f.entry == index) {
                tracing::debug!(route = %route, path = f.path, "route also serves static path");
                router = router.route(f.path, layered(Some(f.captures.clone())));
            }
            router = router.route(entry.path, layered(None));
        }
        Ok(router)
    }
}

struct Fallthrough {
    entry: usize,
    path: &'static str,
    captures: Vec<(String, String)>,
}

fn is_static(path: &str) -> bool {
    !path.contains([':', '*'])
}

/// Bind the `:name` segments of `pattern` against a literal path.
fn captures_for(pattern: &str, path: &str) -> Option<Vec<(String, String)>> {
    let segments = pattern.split('/').zip(path.split('/'));
    if pattern.split('/').count() != path.split('/').count() {
        return None;
    }

    let mut captures = Vec::new();
    for (expected, literal) in segments {
        match expected.strip_prefix(':') {
            Some(name) if !literal.is_empty() => captures.push((name.to_string(), literal.to_string())),
            None if expected == literal => {}
            _ => return None,
        }
    }
    Some(captures)
}

struct Pipeline {
    route: String,
    gates: Vec<Gate>,
    /// Fixed captures when serving a static path on behalf of a pattern.
    captures: Option<Vec<(String, String)>>,
    ctx: GateContext,
}

async fn run_pipeline(State(pipeline): State<Arc<Pipeline>>, req: Request, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();
    let params = match &pipeline.captures {
        Some(fixed) => PathParams(fixed.clone()),
        None => RawPathParams::from_request_parts(&mut parts, &())
            .await
            .map(|raw| PathParams(raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()))
            .unwrap_or_default(),
    };
    parts.extensions.insert(params);

    let mut req = Request::from_parts(parts, body);
    for gate in &pipeline.gates {
        req = match gate.apply(&pipeline.ctx, req).await {
            Ok(passed) => passed,
            Err(err) => {
                tracing::debug!(route = %pipeline.route, %gate, error = %err, "request rejected");
                return err.into_response();
            }
        };
    }
    next.run(req).await
}
