use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use jobboard_core::SchemaCatalog;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::pipeline::{Gate, RouteEntry, RouteTable};

pub fn table(schemas: &SchemaCatalog) -> RouteTable {
    RouteTable::new()
        .route(RouteEntry::post("/register", register).gate(Gate::Validate(schemas.register.clone())))
        .route(RouteEntry::post("/login", login).gate(Gate::Validate(schemas.login.clone())))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    match services.users.register(body.into()).await {
        Ok(user) => (StatusCode::CREATED, Json(user.profile())).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let user = match services.users.authenticate(&body.email, &body.password).await {
        Ok(user) => user,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.issue_token(&user) {
        Ok(token) => (
            StatusCode::OK,
            Json(dto::LoginResponse {
                token,
                user: user.profile(),
            }),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
