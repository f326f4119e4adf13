use thiserror::Error;

use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: requires role '{required}', caller has '{actual}'")]
    WrongRole { required: Role, actual: Role },
}

/// Check that the caller holds exactly the required role.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize_role(actual: Role, required: Role) -> Result<(), AuthzError> {
    if actual == required {
        Ok(())
    } else {
        Err(AuthzError::WrongRole { required, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_role_passes() {
        assert_eq!(authorize_role(Role::User, Role::User), Ok(()));
    }

    #[test]
    fn admin_does_not_imply_user() {
        let err = authorize_role(Role::Admin, Role::User).unwrap_err();
        assert_eq!(err.to_string(), "forbidden: requires role 'user', caller has 'admin'");
    }

    #[test]
    fn employer_is_rejected_for_user_routes() {
        assert!(authorize_role(Role::Employer, Role::User).is_err());
    }
}
