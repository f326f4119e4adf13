use serde::{Deserialize, Serialize};

/// Account role.
///
/// The set is closed: registration only accepts these values, and role checks
/// compare for equality (no role implies another).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Employer,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Employer, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_registration_enum() {
        let names: Vec<_> = Role::ALL.iter().map(Role::as_str).collect();
        assert_eq!(names, jobboard_core::schema::catalog::ROLE_NAMES);
    }

    #[test]
    fn display_and_serde_agree() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
            assert_eq!(serde_json::from_str::<Role>(&json).unwrap(), role);
        }
        assert!(serde_json::from_str::<Role>("\"superadmin\"").is_err());
    }
}
