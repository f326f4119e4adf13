//! `jobboard-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it issues and
//! verifies bearer tokens, hashes passwords, and answers role checks.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod password;
pub mod roles;

pub use authorize::{AuthzError, authorize_role};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator, TokenError};
pub use password::{PasswordError, hash_password, verify_password};
pub use roles::Role;
