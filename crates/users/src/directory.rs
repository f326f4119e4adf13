use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use jobboard_auth::{PasswordError, hash_password, verify_password};
use jobboard_core::{ApplicationId, DomainError, DomainResult, JobId, UserId};

use crate::application::{ApplicationStatus, Bookmark, JobApplication};
use crate::user::{NewUser, ProfileUpdate, User};

const BAD_CREDENTIALS: &str = "invalid email or password";

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    /// Insertion order is application order.
    applications: Vec<JobApplication>,
    bookmarks: HashMap<UserId, Vec<Bookmark>>,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email_matches(email))
    }

    fn user(&self, id: UserId) -> DomainResult<&User> {
        self.users.get(&id).ok_or(DomainError::not_found("user"))
    }

    fn user_mut(&mut self, id: UserId) -> DomainResult<&mut User> {
        self.users.get_mut(&id).ok_or(DomainError::not_found("user"))
    }
}

/// In-memory store of accounts and their job activity.
///
/// Safe to share across request tasks. Password hashing and verification run
/// on the blocking pool with the lock released.
#[derive(Debug, Default)]
pub struct UserDirectory {
    state: RwLock<State>,
}

fn hashing_failed(e: PasswordError) -> DomainError {
    DomainError::internal(e.to_string())
}

async fn hash(password: &str) -> DomainResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| DomainError::internal(format!("password hashing task failed: {e}")))?
        .map_err(hashing_failed)
}

async fn verify(password: &str, password_hash: String) -> DomainResult<bool> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| DomainError::internal(format!("password check task failed: {e}")))?
        .map_err(hashing_failed)
}

fn password_changed_concurrently() -> DomainError {
    DomainError::conflict("password was changed by another request; retry")
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, new_user: NewUser) -> DomainResult<User> {
        let password_hash = hash(&new_user.password).await?;
        let email = new_user.email.trim().to_string();

        let mut state = self.state.write().await;
        if state.email_taken(&email, None) {
            return Err(DomainError::conflict(format!("email '{email}' is already registered")));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            age: new_user.age,
            email,
            role: new_user.role,
            avatar: None,
            created_at: now,
            updated_at: now,
            password_hash,
        };
        state.users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Look up an account by email and check its password.
    ///
    /// Unknown email and wrong password fail with the same error.
    pub async fn authenticate(&self, email: &str, password: &str) -> DomainResult<User> {
        let user = {
            let state = self.state.read().await;
            state.users.values().find(|u| u.email_matches(email)).cloned()
        };
        let Some(user) = user else {
            return Err(DomainError::unauthorized(BAD_CREDENTIALS));
        };

        if verify(password, user.password_hash.clone()).await? {
            Ok(user)
        } else {
            Err(DomainError::unauthorized(BAD_CREDENTIALS))
        }
    }

    pub async fn get(&self, id: UserId) -> DomainResult<User> {
        self.state.read().await.user(id).cloned()
    }

    pub async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> DomainResult<User> {
        let mut state = self.state.write().await;

        if let Some(email) = &update.email {
            if state.email_taken(email, Some(id)) {
                return Err(DomainError::conflict(format!("email '{}' is already registered", email.trim())));
            }
        }

        let user = state.user_mut(id)?;
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(age) = update.age {
            user.age = age;
        }
        if let Some(email) = update.email {
            user.email = email.trim().to_string();
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn current_hash(&self, id: UserId) -> DomainResult<String> {
        Ok(self.state.read().await.user(id)?.password_hash.clone())
    }

    /// Remove an account after confirming its password, along with the
    /// account's applications and bookmarks. Returns the removed account.
    pub async fn delete(&self, id: UserId, password: &str) -> DomainResult<User> {
        let checked = self.current_hash(id).await?;
        if !verify(password, checked.clone()).await? {
            return Err(DomainError::unauthorized("password is incorrect"));
        }

        let mut state = self.state.write().await;
        if state.user(id)?.password_hash != checked {
            return Err(password_changed_concurrently());
        }

        let user = state.users.remove(&id).ok_or(DomainError::not_found("user"))?;
        state.applications.retain(|a| a.user_id != id);
        state.bookmarks.remove(&id);

        tracing::info!(user_id = %id, "user deleted");
        Ok(user)
    }

    pub async fn change_password(&self, id: UserId, current: &str, new_password: &str) -> DomainResult<()> {
        let checked = self.current_hash(id).await?;
        if !verify(current, checked.clone()).await? {
            return Err(DomainError::unauthorized("password is incorrect"));
        }
        let new_hash = hash(new_password).await?;

        let mut state = self.state.write().await;
        let user = state.user_mut(id)?;
        if user.password_hash != checked {
            return Err(password_changed_concurrently());
        }
        user.password_hash = new_hash;
        user.updated_at = Utc::now();
        Ok(())
    }

    /// Record a new avatar file. Returns the updated user and the file it
    /// replaced, if any.
    pub async fn set_avatar(&self, id: UserId, avatar: String) -> DomainResult<(User, Option<String>)> {
        let mut state = self.state.write().await;
        let user = state.user_mut(id)?;
        let previous = user.avatar.replace(avatar);
        user.updated_at = Utc::now();
        Ok((user.clone(), previous))
    }

    pub async fn apply(
        &self,
        user_id: UserId,
        job_id: JobId,
        cover_letter: Option<String>,
    ) -> DomainResult<JobApplication> {
        let mut state = self.state.write().await;
        state.user(user_id)?;

        if state
            .applications
            .iter()
            .any(|a| a.user_id == user_id && a.job_id == job_id)
        {
            return Err(DomainError::conflict(format!("already applied to job {job_id}")));
        }

        let application = JobApplication {
            id: ApplicationId::new(),
            user_id,
            job_id,
            cover_letter,
            status: ApplicationStatus::Submitted,
            applied_at: Utc::now(),
        };
        state.applications.push(application.clone());

        tracing::info!(%user_id, %job_id, application_id = %application.id, "job application submitted");
        Ok(application)
    }

    pub async fn applications(&self, user_id: UserId) -> Vec<JobApplication> {
        self.state
            .read()
            .await
            .applications
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Withdraw one of the caller's applications. Another user's application
    /// is reported as not found.
    pub async fn withdraw_application(&self, user_id: UserId, application_id: ApplicationId) -> DomainResult<()> {
        let mut state = self.state.write().await;
        let position = state
            .applications
            .iter()
            .position(|a| a.id == application_id && a.user_id == user_id)
            .ok_or(DomainError::not_found("application"))?;
        state.applications.remove(position);
        Ok(())
    }

    pub async fn bookmark(&self, user_id: UserId, job_id: JobId) -> DomainResult<Bookmark> {
        let mut state = self.state.write().await;
        state.user(user_id)?;

        let bookmarks = state.bookmarks.entry(user_id).or_default();
        if bookmarks.iter().any(|b| b.job_id == job_id) {
            return Err(DomainError::conflict(format!("job {job_id} is already bookmarked")));
        }

        let bookmark = Bookmark {
            job_id,
            bookmarked_at: Utc::now(),
        };
        bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    pub async fn bookmarks(&self, user_id: UserId) -> Vec<Bookmark> {
        self.state
            .read()
            .await
            .bookmarks
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }
}
