use reqwest::multipart;

use crate::config::Config;
use crate::error::{ApiError, TransportError};
use crate::models::{ComplaintDraft, LoginReply, RegisterReply, SubmissionResult};
use crate::session::Session;

/// Shared HTTP client for both the portal and the location services.
pub fn http_client(config: &Config) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("complaint-portal/0.1")
        .timeout(config.http_timeout)
        .build()
}

/// Client for the portal backend. One instance per invocation; attach
/// a token to authenticate the complaint endpoints.
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl PortalClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Exchanges credentials for a session. Empty credentials fail
    /// locally without a request.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let mut missing = Vec::new();
        if email.is_empty() {
            missing.push("email");
        }
        if password.is_empty() {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(ApiError::Validation { missing });
        }

        let url = format!("{}/api/user/login", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status).into());
        }

        let reply: LoginReply = resp
            .json()
            .await
            .map_err(|err| TransportError::Malformed(err.to_string()))?;
        if !reply.success {
            let message = if reply.message.is_empty() {
                "Login failed".to_string()
            } else {
                reply.message
            };
            return Err(ApiError::Rejected { message });
        }
        Ok(Session {
            token: reply.token,
            user: reply.user,
        })
    }

    /// Submits a draft as one multipart POST. Required fields are
    /// checked first; an incomplete draft never reaches the network.
    pub async fn register_complaint(
        &self,
        draft: &ComplaintDraft,
    ) -> Result<SubmissionResult, ApiError> {
        let missing = draft.missing_required();
        if !missing.is_empty() {
            return Err(ApiError::Validation { missing });
        }

        let mut form = multipart::Form::new()
            .text("title", draft.title.clone())
            .text("description", draft.description.clone())
            .text("latitude", draft.latitude.clone())
            .text("longitude", draft.longitude.clone())
            .text("locality", draft.locality.clone())
            .text("city", draft.city.clone())
            .text("state", draft.state.clone())
            .text("department", draft.department.clone());
        if let Some(image) = &draft.image {
            let part = multipart::Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime_type)
                .map_err(|err| TransportError::Malformed(format!("image part: {}", err)))?;
            form = form.part("image", part);
        }

        let url = format!("{}/api/user/register/complaint", self.base_url);
        let mut req = self.http.post(&url).multipart(form);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status).into());
        }

        let reply: RegisterReply = resp
            .json()
            .await
            .map_err(|err| TransportError::Malformed(err.to_string()))?;
        if !reply.success {
            let message = if reply.message.is_empty() {
                "Something went wrong!".to_string()
            } else {
                reply.message
            };
            return Err(ApiError::Rejected { message });
        }
        Ok(SubmissionResult {
            success: true,
            message: reply.message,
        })
    }
}
