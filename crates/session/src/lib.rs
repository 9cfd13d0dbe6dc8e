//! Session lifecycle for the ServiceHub client SDK.
//!
//! [`SessionStore`] owns the bearer credential and the current profile,
//! persists both across restarts through a [`servicehub_vault::Vault`],
//! and exposes the role-derived authorization flags. The [`claims`]
//! module decodes the credential's self-describing expiry locally —
//! no signature verification, by design.

pub mod claims;
pub mod error;
pub mod store;

pub use error::SessionError;
pub use store::{SessionPhase, SessionStore};
