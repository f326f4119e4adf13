use serde::{Deserialize, Deserializer, Serialize};

use jobboard_auth::Role;
use jobboard_users::{NewUser, ProfileUpdate, UserProfile};

// -------------------------
// Request DTOs
// -------------------------
//
// Bodies reach these types after the validate gate has checked and normalized
// them, so shapes here mirror the schema catalog.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub age: Option<f64>,
    pub email: String,
    pub role: Role,
    pub password: String,
}

impl From<RegisterRequest> for NewUser {
    fn from(req: RegisterRequest) -> Self {
        NewUser {
            first_name: req.first_name,
            last_name: req.last_name,
            age: req.age,
            email: req.email,
            role: req.role,
            password: req.password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    /// Absent leaves the stored age alone; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub age: Option<Option<f64>>,
    pub email: String,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            first_name: Some(req.first_name),
            last_name: Some(req.last_name),
            age: req.age,
            email: Some(req.email),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyJobRequest {
    #[serde(default)]
    pub cover_letter: Option<String>,
}

/// Distinguish a present `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_distinguishes_null_from_absent_age() {
        let base = json!({"firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com"});

        let absent: UpdateProfileRequest = serde_json::from_value(base.clone()).unwrap();
        assert_eq!(absent.age, None);

        let mut with_null = base.clone();
        with_null["age"] = json!(null);
        let cleared: UpdateProfileRequest = serde_json::from_value(with_null).unwrap();
        assert_eq!(cleared.age, Some(None));

        let mut with_age = base;
        with_age["age"] = json!(36);
        let set: UpdateProfileRequest = serde_json::from_value(with_age).unwrap();
        assert_eq!(set.age, Some(Some(36.0)));
    }

    #[test]
    fn apply_body_may_be_empty() {
        let req: ApplyJobRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.cover_letter.is_none());
    }
}
