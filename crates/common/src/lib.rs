//! Shared domain types for the ServiceHub client SDK.
//!
//! Wire shapes mirror the ServiceHub REST API: camelCase object keys,
//! SCREAMING_SNAKE_CASE enum values.

pub mod role;
pub mod types;
pub mod validate;

pub use role::Role;
pub use types::{
    Category, Comment, CommentDraft, JobRequest, JobRequestDraft, JobStatus, Notification,
    NotificationKind, Portfolio, ProfilePatch, User,
};
pub use validate::{RegisterForm, ValidationError};
