use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use jobboard_auth::{Hs256JwtValidator, JwtClaims};
use jobboard_core::{DomainError, DomainResult};
use jobboard_users::{User, UserDirectory};

use crate::context::UploadedFile;

const DEFAULT_EXTENSION: &str = "bin";

/// Collaborators shared by every handler.
pub struct AppServices {
    pub users: UserDirectory,
    jwt: Arc<Hs256JwtValidator>,
    token_ttl: Duration,
    upload_dir: PathBuf,
}

impl AppServices {
    pub fn new(jwt: Arc<Hs256JwtValidator>, token_ttl: Duration, upload_dir: PathBuf) -> Self {
        Self {
            users: UserDirectory::new(),
            jwt,
            token_ttl,
            upload_dir,
        }
    }

    /// Mint a bearer token for `user`, valid for the configured TTL.
    pub fn issue_token(&self, user: &User) -> DomainResult<String> {
        let ttl = chrono::Duration::from_std(self.token_ttl)
            .map_err(|e| DomainError::internal(format!("token ttl out of range: {e}")))?;
        let claims = JwtClaims::new(user.id, user.role, Utc::now(), ttl);
        self.jwt
            .issue(&claims)
            .map_err(|e| DomainError::internal(format!("token signing failed: {e}")))
    }

    /// Write an uploaded avatar to the upload directory.
    ///
    /// Returns the stored file name, `<userId>-<uuid>.<ext>`.
    pub async fn store_avatar(&self, user: &User, file: &UploadedFile) -> DomainResult<String> {
        let ext = extension_of(&file.file_name, file.content_type.as_deref());
        let name = format!("{}-{}.{}", user.id, Uuid::now_v7(), ext);
        let path = self.upload_dir.join(&name);

        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| DomainError::internal(format!("writing {}: {e}", path.display())))?;

        tracing::info!(
            user_id = %user.id,
            file = %name,
            content_type = file.content_type.as_deref().unwrap_or("unknown"),
            bytes = file.bytes.len(),
            "avatar stored"
        );
        Ok(name)
    }

    /// Delete a stored avatar. A file that is already gone is not an error;
    /// other failures are logged and otherwise ignored.
    pub async fn remove_avatar(&self, name: &str) {
        let path = self.upload_dir.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::info!(file = %name, "avatar removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove avatar"),
        }
    }
}

/// Lowercased alphanumeric extension for a stored upload: the client's file
/// name first, then the subtype of its declared content type.
fn extension_of(file_name: &str, content_type: Option<&str>) -> String {
    let from_name = Path::new(file_name).extension().and_then(|ext| ext.to_str());
    let from_mime = content_type
        .and_then(|mime| mime.split(';').next())
        .and_then(|mime| mime.trim().split_once('/'))
        .map(|(_, subtype)| subtype);

    from_name
        .filter(|ext| is_safe_extension(ext))
        .or_else(|| from_mime.filter(|ext| is_safe_extension(ext)))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric())
}
