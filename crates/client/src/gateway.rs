//! The single chokepoint for all HTTP calls: bearer attachment, body
//! serialization, and success/error normalization live here and nowhere
//! else.

use std::sync::Arc;

use {
    reqwest::{Method, StatusCode, multipart::Form},
    serde::de::DeserializeOwned,
    serde_json::Value,
    tracing::{debug, warn},
};

use servicehub_vault::{TOKEN_KEY, Vault};

use crate::error::{ApiError, GENERIC_ERROR_MESSAGE, extract_message};

/// Environment variable selecting the API base URL.
pub const API_URL_ENV: &str = "SERVICEHUB_API_URL";

/// Default base URL: a local backend behind the conventional `/api` prefix.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:4000/api";

/// Canonical result for HTTP 204 responses, which carry no body to parse.
pub fn empty_success() -> Value {
    serde_json::json!({ "success": true })
}

/// Outgoing request payload.
pub enum RequestBody {
    Empty,
    /// Serialized as JSON with an explicit `application/json` content type.
    Json(Value),
    /// Multipart form. No explicit content type is set so the transport
    /// can pick its own boundary.
    Multipart(Form),
}

/// Client for the ServiceHub REST API.
///
/// Holds no session state of its own: the bearer token is read from the
/// shared [`Vault`] at call time, so the client always sees whatever the
/// session store last persisted. It never writes to the vault.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    vault: Arc<dyn Vault>,
}

impl ApiClient {
    /// Build a client against an explicit base URL (no trailing slash
    /// required; one is stripped if present).
    pub fn new(base: impl Into<String>, vault: Arc<dyn Vault>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base,
            vault,
        }
    }

    /// Build a client from `SERVICEHUB_API_URL`, falling back to the
    /// local default.
    pub fn from_env(vault: Arc<dyn Vault>) -> Self {
        let base = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base, vault)
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Dispatch one request. A single one-shot attempt: no retries, no
    /// explicit timeout, no caching.
    ///
    /// - 204 → [`empty_success`], body untouched
    /// - other 2xx → parsed JSON body
    /// - non-2xx → [`ApiError::Rejection`] with the real status and the
    ///   message extracted from the body's `message`/`error` field
    /// - anything that prevents obtaining or parsing a success response →
    ///   [`ApiError::Transport`] (status 0)
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base, path);
        debug!(%method, %url, "dispatching api request");

        let mut request = self.http.request(method.clone(), url.as_str());
        if let Some(token) = self.vault.get(TOKEN_KEY) {
            request = request.bearer_auth(token);
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(%method, %url, error = %e, "transport failure");
                return Err(ApiError::Transport);
            },
        };

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(empty_success());
        }
        if status.is_success() {
            return response.json::<Value>().await.map_err(|e| {
                warn!(%url, error = %e, "unparsable success body");
                ApiError::Transport
            });
        }

        let data = response.json::<Value>().await.ok();
        let message = data
            .as_ref()
            .and_then(extract_message)
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
        warn!(%method, %url, status = status.as_u16(), %message, "api request rejected");
        Err(ApiError::rejection(status.as_u16(), message, data))
    }

    /// `send` plus deserialization into a concrete type. A success body
    /// that does not match `T` is treated like any other unparsable
    /// success response.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<T, ApiError> {
        let value = self.send(method, path, body).await?;
        serde_json::from_value(value).map_err(|e| {
            warn!(%path, error = %e, "success body did not match expected shape");
            ApiError::Transport
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, RequestBody::Empty).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, ApiError> {
        let value = serde_json::to_value(body).map_err(|_| ApiError::Transport)?;
        self.request(Method::POST, path, RequestBody::Json(value))
            .await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::PATCH, path, RequestBody::Empty).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_stripped_from_base() {
        let vault: Arc<dyn Vault> = Arc::new(servicehub_vault::MemoryVault::new());
        let client = ApiClient::new("http://localhost:4000/api//", vault);
        assert_eq!(client.base_url(), "http://localhost:4000/api");
    }

    #[test]
    fn empty_success_marker_shape() {
        assert_eq!(empty_success(), serde_json::json!({"success": true}));
    }
}
