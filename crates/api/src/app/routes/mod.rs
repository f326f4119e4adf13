pub mod auth;
pub mod system;
pub mod users;

/// Mount point of the user-management router.
pub const USERS_MOUNT: &str = "/api/users";

/// Mount point of the registration/login router.
pub const AUTH_MOUNT: &str = "/api/auth";
