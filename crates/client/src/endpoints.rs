//! Typed wrappers over [`ApiClient::send`] for each ServiceHub endpoint
//! group. Errors propagate as [`ApiError`] — callers own their handling
//! (the session store is the one layer that converts them to results).

use {
    reqwest::{
        Method,
        multipart::{Form, Part},
    },
    serde::Deserialize,
    serde_json::Value,
};

use servicehub_common::{
    Category, Comment, CommentDraft, JobRequest, JobRequestDraft, Notification, Portfolio,
    RegisterForm, User,
};

use crate::{
    error::ApiError,
    gateway::{ApiClient, RequestBody},
};

/// Successful login/register payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// One file in a portfolio-image upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

fn query_string(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

impl ApiClient {
    // ── Auth ─────────────────────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post(
            "/auth/login",
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Register a new account. Form validation is the caller's concern;
    /// the confirmation field is never serialized.
    pub async fn register(&self, form: &RegisterForm) -> Result<AuthResponse, ApiError> {
        self.post("/auth/register", form).await
    }

    // ── Users ────────────────────────────────────────────────────────────────

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.get("/users").await
    }

    pub async fn user(&self, id: &str) -> Result<User, ApiError> {
        self.get(&format!("/users/{id}")).await
    }

    /// Extended profile (portfolio, stats). Shape varies by role, so this
    /// stays untyped.
    pub async fn user_full_info(&self, id: &str) -> Result<Value, ApiError> {
        self.get(&format!("/users/{id}/full-info")).await
    }

    // ── Categories ───────────────────────────────────────────────────────────

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get("/categories").await
    }

    pub async fn categories_active_workers(&self) -> Result<Value, ApiError> {
        self.get("/categories/active-workers").await
    }

    // ── Portfolios ───────────────────────────────────────────────────────────

    pub async fn portfolios(&self, params: &[(&str, &str)]) -> Result<Vec<Portfolio>, ApiError> {
        let path = if params.is_empty() {
            "/portfolios".to_string()
        } else {
            format!("/portfolios?{}", query_string(params))
        };
        self.get(&path).await
    }

    pub async fn portfolio(&self, id: &str) -> Result<Portfolio, ApiError> {
        self.get(&format!("/portfolios/{id}")).await
    }

    // ── Portfolio images ─────────────────────────────────────────────────────

    pub async fn portfolio_images(&self, portfolio_id: &str) -> Result<Value, ApiError> {
        self.get(&format!(
            "/portfolio-images?portfolio_id={}",
            urlencoding::encode(portfolio_id)
        ))
        .await
    }

    /// Upload one or more images for a portfolio as a multipart form with
    /// a `portfolio_id` text part and one `images` part per file.
    pub async fn upload_portfolio_images(
        &self,
        portfolio_id: &str,
        files: Vec<UploadFile>,
    ) -> Result<Value, ApiError> {
        let mut form = Form::new().text("portfolio_id", portfolio_id.to_string());
        for file in files {
            let mut part = Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(mime) = file.mime {
                part = part.mime_str(&mime).map_err(|_| ApiError::Transport)?;
            }
            form = form.part("images", part);
        }
        self.send(
            Method::POST,
            "/portfolio-images/upload",
            RequestBody::Multipart(form),
        )
        .await
    }

    // ── Comments ─────────────────────────────────────────────────────────────

    pub async fn comments(&self, portfolio_id: &str) -> Result<Vec<Comment>, ApiError> {
        self.get(&format!("/comments/{portfolio_id}")).await
    }

    pub async fn create_comment(&self, draft: &CommentDraft) -> Result<Comment, ApiError> {
        self.post("/comments", draft).await
    }

    // ── Job requests ─────────────────────────────────────────────────────────

    pub async fn create_job_request(
        &self,
        draft: &JobRequestDraft,
    ) -> Result<JobRequest, ApiError> {
        self.post("/job-requests", draft).await
    }

    pub async fn my_job_requests(&self) -> Result<Vec<JobRequest>, ApiError> {
        self.get("/job-requests/my").await
    }

    pub async fn accept_job_request(&self, id: &str) -> Result<JobRequest, ApiError> {
        self.patch(&format!("/job-requests/{id}/accept")).await
    }

    pub async fn reject_job_request(&self, id: &str) -> Result<JobRequest, ApiError> {
        self.patch(&format!("/job-requests/{id}/reject")).await
    }

    // ── Notifications ────────────────────────────────────────────────────────

    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.get("/notifications").await
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<Value, ApiError> {
        self.send(
            Method::PATCH,
            &format!("/notifications/{id}/read"),
            RequestBody::Empty,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_string_encodes_values() {
        let qs = query_string(&[("categoryId", "c 1"), ("region", "north")]);
        assert_eq!(qs, "categoryId=c%201&region=north");
    }
}
