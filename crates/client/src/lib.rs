//! HTTP client for the ServiceHub REST API.
//!
//! [`ApiClient::send`] is the single dispatch chokepoint: it attaches the
//! bearer token from the shared credential vault, serializes the body, and
//! normalizes every outcome into either a parsed JSON value or an
//! [`ApiError`] carrying `{status, message, data}` (status `0` = transport
//! failure). Endpoint wrappers in [`endpoints`] build on it.

pub mod endpoints;
pub mod error;
pub mod gateway;

pub use endpoints::{AuthResponse, UploadFile};
pub use error::{ApiError, GENERIC_ERROR_MESSAGE, TRANSPORT_MESSAGE};
pub use gateway::{API_URL_ENV, ApiClient, DEFAULT_API_URL, RequestBody, empty_success};
