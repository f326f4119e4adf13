//! User accounts, job applications and bookmarks.
//!
//! [`UserDirectory`] is the in-memory collaborator behind the user endpoints.

pub mod application;
pub mod directory;
pub mod user;

pub use application::{ApplicationStatus, Bookmark, JobApplication};
pub use directory::UserDirectory;
pub use user::{NewUser, ProfileUpdate, User, UserProfile};
