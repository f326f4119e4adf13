//! Named payload schemas for the user-management endpoints.
//!
//! Built once at startup and shared read-only. Derived schemas reference the
//! fields of their base schema by name instead of redeclaring them.

use std::sync::Arc;

use super::rule::FieldRule;
use super::{ObjectSchema, RequestSchema, SchemaError};

/// Account roles accepted at registration.
pub const ROLE_NAMES: &[&str] = &["user", "employer", "admin"];

pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 50;

const PASSWORD_TOO_SHORT: &str = "Password is too short - minimum of 6 characters";
const PASSWORD_TOO_LONG: &str = "Password too long";

/// Fields of the registration body that a profile update may change.
pub const PROFILE_FIELDS: &[&str] = &["firstName", "lastName", "age", "email"];

#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    pub register: Arc<RequestSchema>,
    pub login: Arc<RequestSchema>,
    pub update_user: Arc<RequestSchema>,
    pub update_password: Arc<RequestSchema>,
    pub delete_user: Arc<RequestSchema>,
    pub user_details: Arc<RequestSchema>,
    pub bookmark_job: Arc<RequestSchema>,
    pub apply_job: Arc<RequestSchema>,
    pub delete_application: Arc<RequestSchema>,
}

impl SchemaCatalog {
    pub fn build() -> Result<Self, SchemaError> {
        let register_body = register_body()?;
        let update_body = register_body.pick(PROFILE_FIELDS)?;

        let login_body = ObjectSchema::new(vec![
            email_field(),
            FieldRule::string("password").required("Password is required"),
        ])?;

        let update_password_body = ObjectSchema::new(vec![
            FieldRule::string("password").required("Password is required"),
            FieldRule::string("newPassword")
                .required("New password is required")
                .min_len(PASSWORD_MIN_LEN, PASSWORD_TOO_SHORT)
                .max_len(PASSWORD_MAX_LEN, PASSWORD_TOO_LONG),
        ])?;

        let delete_body = ObjectSchema::new(vec![
            FieldRule::string("password").required("Password is required"),
        ])?;

        let apply_body = ObjectSchema::new(vec![FieldRule::string("coverLetter").optional()])?;

        Ok(Self {
            register: Arc::new(RequestSchema::new().body(register_body)),
            login: Arc::new(RequestSchema::new().body(login_body)),
            update_user: Arc::new(RequestSchema::new().body(update_body)),
            update_password: Arc::new(RequestSchema::new().body(update_password_body)),
            delete_user: Arc::new(RequestSchema::new().body(delete_body)),
            user_details: Arc::new(RequestSchema::new().params(id_param("userId", "User ID is required")?)),
            bookmark_job: Arc::new(RequestSchema::new().params(id_param("jobId", "Required")?)),
            apply_job: Arc::new(
                RequestSchema::new()
                    .params(id_param("jobId", "Job ID is required")?)
                    .body(apply_body),
            ),
            delete_application: Arc::new(
                RequestSchema::new().params(id_param("applicationId", "Application ID is required")?),
            ),
        })
    }
}

fn email_field() -> FieldRule {
    FieldRule::string("email")
        .required("Email is required")
        .email("Not a valid email")
}

/// Base schema every user-profile schema derives from.
fn register_body() -> Result<ObjectSchema, SchemaError> {
    ObjectSchema::new(vec![
        FieldRule::string("firstName")
            .required("First name is required")
            .non_empty("First name is required"),
        FieldRule::string("lastName")
            .required("Last name is required")
            .non_empty("Last name is required"),
        FieldRule::number("age").nullish(),
        email_field(),
        FieldRule::one_of("role", ROLE_NAMES).required("Role is required"),
        FieldRule::string("password")
            .required("Password is required")
            .min_len(PASSWORD_MIN_LEN, PASSWORD_TOO_SHORT)
            .max_len(PASSWORD_MAX_LEN, PASSWORD_TOO_LONG),
    ])
}

fn id_param(name: &'static str, message: &'static str) -> Result<ObjectSchema, SchemaError> {
    ObjectSchema::new(vec![FieldRule::string(name).required(message).non_empty(message)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Location, RequestData, validate};
    use proptest::prelude::*;
    use serde_json::{Map, Value, json};

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::build().unwrap()
    }

    fn body(value: Value) -> RequestData {
        RequestData {
            body: Some(value),
            ..RequestData::default()
        }
    }

    fn registration(password: &str) -> Value {
        json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "role": "user",
            "password": password,
        })
    }

    #[test]
    fn catalog_builds() {
        let c = catalog();
        assert!(c.register.body.is_some());
        assert!(c.user_details.params.is_some());
        assert!(c.user_details.body.is_none());
    }

    #[test]
    fn update_schema_is_a_subset_of_registration() {
        let c = catalog();
        let update = c.update_user.body.as_ref().unwrap();
        let register = c.register.body.as_ref().unwrap();

        assert_eq!(update.field_names().collect::<Vec<_>>(), PROFILE_FIELDS);
        for field in update.fields() {
            assert_eq!(Some(field), register.field(field.name()));
        }
        assert!(update.field("role").is_none());
        assert!(update.field("password").is_none());
    }

    #[test]
    fn update_strips_role_and_password() {
        let out = validate(
            &catalog().update_user,
            &body(json!({
                "firstName": "Ada",
                "lastName": "Byron",
                "email": "ada@example.com",
                "role": "admin",
                "password": "hunter22",
            })),
        )
        .unwrap();
        assert_eq!(
            out.body.unwrap(),
            json!({"firstName": "Ada", "lastName": "Byron", "email": "ada@example.com"})
        );
    }

    #[test]
    fn registration_reports_every_missing_field() {
        let errors = validate(
            &catalog().register,
            &body(json!({"lastName": "Lovelace", "role": "user", "password": "secret1"})),
        )
        .unwrap_err();
        let got: Vec<_> = errors.iter().map(|e| (e.field.as_str(), e.message.as_str())).collect();
        assert_eq!(
            got,
            vec![("firstName", "First name is required"), ("email", "Email is required")]
        );
    }

    #[test]
    fn registration_rejects_unknown_role() {
        let mut data = registration("secret1");
        data["role"] = json!("superadmin");
        let errors = validate(&catalog().register, &body(data)).unwrap_err();
        assert_eq!(errors.len(), 1);
        let err = errors.iter().next().unwrap();
        assert_eq!(err.field, "role");
        assert!(err.message.starts_with("Invalid enum value"));
    }

    #[test]
    fn password_length_boundaries() {
        let c = catalog();
        for (len, ok) in [(5, false), (6, true), (50, true), (51, false)] {
            let result = validate(&c.register, &body(registration(&"x".repeat(len))));
            assert_eq!(result.is_ok(), ok, "password of length {len}");
        }
    }

    #[test]
    fn new_password_shares_password_bounds() {
        let c = catalog();
        let short = validate(
            &c.update_password,
            &body(json!({"password": "old", "newPassword": "12345"})),
        )
        .unwrap_err();
        let err = short.iter().next().unwrap();
        assert_eq!(err.field, "newPassword");
        assert_eq!(err.message, PASSWORD_TOO_SHORT);

        let long = validate(
            &c.update_password,
            &body(json!({"password": "old", "newPassword": "y".repeat(51)})),
        )
        .unwrap_err();
        assert_eq!(long.iter().next().unwrap().message, PASSWORD_TOO_LONG);
    }

    #[test]
    fn empty_path_id_is_rejected() {
        let mut params = Map::new();
        params.insert("jobId".into(), json!(""));
        let errors = validate(
            &catalog().bookmark_job,
            &RequestData {
                params,
                ..RequestData::default()
            },
        )
        .unwrap_err();
        let err = errors.iter().next().unwrap();
        assert_eq!((err.location, err.field.as_str()), (Location::Params, "jobId"));
    }

    #[test]
    fn missing_path_id_uses_declared_message() {
        let errors = validate(&catalog().user_details, &RequestData::default()).unwrap_err();
        assert_eq!(errors.iter().next().unwrap().message, "User ID is required");
    }

    #[test]
    fn apply_accepts_missing_cover_letter() {
        let mut params = Map::new();
        params.insert("jobId".into(), json!("job-1"));
        let out = validate(
            &catalog().apply_job,
            &RequestData {
                body: None,
                params,
                query: Map::new(),
            },
        )
        .unwrap();
        assert_eq!(out.body, Some(json!({})));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: a registration password is accepted iff its length is in [6, 50].
        #[test]
        fn password_accepted_iff_within_bounds(password in "[a-zA-Z0-9]{0,70}") {
            let result = validate(&catalog().register, &body(registration(&password)));
            let len = password.chars().count();
            prop_assert_eq!(result.is_ok(), (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len));
        }
    }
}
