//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `services.rs`: shared collaborators (user directory, token issuing, avatar storage)
//! - `routes/`: route tables + handlers (one file per router)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Extension, Router};
use tower_http::trace::TraceLayer;

use jobboard_auth::Hs256JwtValidator;
use jobboard_core::SchemaCatalog;

use crate::config::ApiConfig;
use crate::pipeline::{GateContext, RouteTable};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: ApiConfig) -> anyhow::Result<Router> {
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating upload directory {}", config.upload_dir.display()))?;

    let schemas = SchemaCatalog::build().context("building request schemas")?;

    let jwt = Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    let gates = GateContext {
        jwt: jwt.clone(),
        max_json_bytes: config.max_json_bytes,
        max_upload_bytes: config.max_upload_bytes,
    };

    let services = Arc::new(services::AppServices::new(
        jwt,
        config.token_ttl,
        config.upload_dir.clone(),
    ));

    let users = mount(routes::USERS_MOUNT, routes::users::table(&schemas), &gates)?;
    let auth = mount(routes::AUTH_MOUNT, routes::auth::table(&schemas), &gates)?;

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .nest(routes::USERS_MOUNT, users)
        .nest(routes::AUTH_MOUNT, auth)
        .layer(Extension(services))
        .layer(TraceLayer::new_for_http()))
}

fn mount(prefix: &str, table: RouteTable, gates: &GateContext) -> anyhow::Result<Router> {
    for entry in table.entries() {
        tracing::info!(route = %entry, mount = prefix, "route registered");
    }
    table
        .into_router(gates)
        .with_context(|| format!("building routes under {prefix}"))
}
