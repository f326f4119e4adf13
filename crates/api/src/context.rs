use axum::body::Bytes;

use jobboard_auth::Role;
use jobboard_core::UserId;

/// Identity of the authenticated caller, attached by the authenticate gate.
///
/// Read-only for later gates and handlers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    user_id: UserId,
    role: Role,
}

impl IdentityContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// The file accepted by a single-file upload gate.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Path captures of the matched route, attached before any gate runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(pub Vec<(String, String)>);
