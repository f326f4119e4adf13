use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use jobboard_auth::Role;
use jobboard_core::{ApplicationId, JobId, RequestSchema, SchemaCatalog, UserId, ValidatedRequest};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::{IdentityContext, UploadedFile};
use crate::pipeline::{Gate, RouteEntry, RouteTable};

pub const AVATAR_FIELD: &str = "avatar";

/// User-management endpoints. Each entry lists exactly the gates it runs.
pub fn table(schemas: &SchemaCatalog) -> RouteTable {
    let validate = |schema: &Arc<RequestSchema>| Gate::Validate(schema.clone());

    RouteTable::new()
        .route(RouteEntry::get("/profile/:userId", get_user_details).gate(validate(&schemas.user_details)))
        .route(RouteEntry::get("/profile", get_profile).gate(Gate::Authenticate))
        .route(
            RouteEntry::patch("/profile", update_profile)
                .gate(Gate::Authenticate)
                .gate(validate(&schemas.update_user)),
        )
        .route(
            RouteEntry::delete("/profile", delete_profile)
                .gate(Gate::Authenticate)
                .gate(validate(&schemas.delete_user)),
        )
        .route(
            RouteEntry::post("/profile/upload", upload_avatar)
                .gate(Gate::Authenticate)
                .gate(Gate::SingleFile(AVATAR_FIELD)),
        )
        .route(
            RouteEntry::patch("/update-password", update_password)
                .gate(Gate::Authenticate)
                .gate(validate(&schemas.update_password)),
        )
        .route(
            RouteEntry::post("/jobs/:jobId/apply", apply_to_job)
                .gate(Gate::Authenticate)
                .gate(Gate::Authorize(Role::User))
                .gate(validate(&schemas.apply_job)),
        )
        .route(
            RouteEntry::get("/applications", list_applications)
                .gate(Gate::Authenticate)
                .gate(Gate::Authorize(Role::User)),
        )
        .route(
            RouteEntry::delete("/applications/:applicationId", delete_application)
                .gate(Gate::Authenticate)
                .gate(Gate::Authorize(Role::User))
                .gate(validate(&schemas.delete_application)),
        )
        .route(
            RouteEntry::post("/jobs/:jobId/bookmark", bookmark_job)
                .gate(Gate::Authenticate)
                .gate(Gate::Authorize(Role::User))
                .gate(validate(&schemas.bookmark_job)),
        )
        .route(
            RouteEntry::get("/bookmarked-jobs", list_bookmarks)
                .gate(Gate::Authenticate)
                .gate(Gate::Authorize(Role::User)),
        )
}

pub async fn get_user_details(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(validated): Extension<ValidatedRequest>,
) -> axum::response::Response {
    let id = match errors::parse_param::<UserId>(&validated, "userId") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.users.get(id).await {
        Ok(user) => (StatusCode::OK, Json(user.profile())).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
) -> axum::response::Response {
    match services.users.get(identity.user_id()).await {
        Ok(user) => (StatusCode::OK, Json(user.profile())).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Json(body): Json<dto::UpdateProfileRequest>,
) -> axum::response::Response {
    match services.users.update_profile(identity.user_id(), body.into()).await {
        Ok(user) => (StatusCode::OK, Json(user.profile())).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Json(body): Json<dto::DeleteUserRequest>,
) -> axum::response::Response {
    match services.users.delete(identity.user_id(), &body.password).await {
        Ok(user) => {
            if let Some(avatar) = &user.avatar {
                services.remove_avatar(avatar).await;
            }
            (
                StatusCode::OK,
                Json(dto::MessageResponse {
                    message: "account deleted",
                }),
            )
                .into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn upload_avatar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    file: Option<Extension<UploadedFile>>,
) -> axum::response::Response {
    let Some(Extension(file)) = file else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_upload", "avatar file is required");
    };

    let user = match services.users.get(identity.user_id()).await {
        Ok(user) => user,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let stored = match services.store_avatar(&user, &file).await {
        Ok(name) => name,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.users.set_avatar(user.id, stored.clone()).await {
        Ok((user, previous)) => {
            if let Some(previous) = previous {
                services.remove_avatar(&previous).await;
            }
            (StatusCode::OK, Json(user.profile())).into_response()
        }
        Err(e) => {
            services.remove_avatar(&stored).await;
            errors::domain_error_to_response(e)
        }
    }
}

pub async fn update_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Json(body): Json<dto::UpdatePasswordRequest>,
) -> axum::response::Response {
    match services
        .users
        .change_password(identity.user_id(), &body.password, &body.new_password)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(dto::MessageResponse {
                message: "password updated",
            }),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn apply_to_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Extension(validated): Extension<ValidatedRequest>,
    Json(body): Json<dto::ApplyJobRequest>,
) -> axum::response::Response {
    let job_id = match errors::parse_param::<JobId>(&validated, "jobId") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services
        .users
        .apply(identity.user_id(), job_id, body.cover_letter)
        .await
    {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_applications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
) -> axum::response::Response {
    let items = services.users.applications(identity.user_id()).await;
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn delete_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Extension(validated): Extension<ValidatedRequest>,
) -> axum::response::Response {
    let application_id = match errors::parse_param::<ApplicationId>(&validated, "applicationId") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services
        .users
        .withdraw_application(identity.user_id(), application_id)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(dto::MessageResponse {
                message: "application deleted",
            }),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn bookmark_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Extension(validated): Extension<ValidatedRequest>,
) -> axum::response::Response {
    let job_id = match errors::parse_param::<JobId>(&validated, "jobId") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.users.bookmark(identity.user_id(), job_id).await {
        Ok(bookmark) => (StatusCode::CREATED, Json(bookmark)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_bookmarks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
) -> axum::response::Response {
    let items = services.users.bookmarks(identity.user_id()).await;
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    fn gates_of(table: &RouteTable, method: Method, path: &str) -> Vec<String> {
        table
            .entries()
            .iter()
            .find(|e| e.method() == method && e.path() == path)
            .unwrap_or_else(|| panic!("{method} {path} not declared"))
            .gates()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn table_is_well_formed() {
        let table = table(&SchemaCatalog::build().unwrap());
        assert_eq!(table.entries().len(), 11);
        table.check().unwrap();
    }

    #[test]
    fn each_route_lists_its_own_gates() {
        let table = table(&SchemaCatalog::build().unwrap());

        assert_eq!(gates_of(&table, Method::GET, "/profile/:userId"), ["validate"]);
        assert_eq!(gates_of(&table, Method::GET, "/profile"), ["authenticate"]);
        assert_eq!(
            gates_of(&table, Method::POST, "/profile/upload"),
            ["authenticate", "single-file(avatar)"]
        );
        assert_eq!(
            gates_of(&table, Method::POST, "/jobs/:jobId/bookmark"),
            ["authenticate", "authorize(user)", "validate"]
        );
        assert_eq!(
            gates_of(&table, Method::GET, "/bookmarked-jobs"),
            ["authenticate", "authorize(user)"]
        );
    }
}
