//! Backend health and model information.

use super::{
    ApiClient, NOT_AUTHENTICATED, expire_session, failure_detail, is_unauthorized, read_json,
    require_token,
};
use crate::models::{HealthStatus, ModelInfo, VerificationSettings};
use crate::session::SessionStore;
use crate::{Error, Result};
use reqwest::Response;
use secrecy::ExposeSecret;

/// Client for the diagnostic endpoints. None of these are needed for the
/// core flows.
#[derive(Debug, Clone)]
pub struct DiagnosticsClient {
    api: ApiClient,
    session: SessionStore,
}

impl DiagnosticsClient {
    /// Creates a diagnostics client.
    #[must_use]
    pub const fn new(api: ApiClient, session: SessionStore) -> Self {
        Self { api, session }
    }

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] when the backend is unreachable or
    /// reports a failure status.
    pub async fn health(&self) -> Result<HealthStatus> {
        const OPERATION: &str = "health";
        let response = self
            .api
            .dispatch(OPERATION, self.api.get("/health"), None)
            .await?;
        let response = ensure_success(OPERATION, response).await?;
        read_json(OPERATION, response).await
    }

    /// `GET /model-info`.
    ///
    /// # Errors
    ///
    /// As [`health`](Self::health).
    pub async fn model_info(&self) -> Result<ModelInfo> {
        const OPERATION: &str = "model_info";
        let response = self
            .api
            .dispatch(OPERATION, self.api.get("/model-info"), None)
            .await?;
        let response = ensure_success(OPERATION, response).await?;
        read_json(OPERATION, response).await
    }

    /// `GET /verify/config`, the backend's verification settings.
    ///
    /// # Errors
    ///
    /// [`Error::Auth`] without a session or on 401 (the session is
    /// cleared); otherwise as [`health`](Self::health).
    pub async fn verification_config(&self) -> Result<VerificationSettings> {
        const OPERATION: &str = "verification_config";
        let token = require_token(&self.session, NOT_AUTHENTICATED)?;

        let request = self
            .api
            .get("/verify/config")
            .bearer_auth(token.expose_secret());
        let response = self.api.dispatch(OPERATION, request, None).await?;
        if is_unauthorized(response.status()) {
            return Err(expire_session(&self.session, OPERATION));
        }
        let response = ensure_success(OPERATION, response).await?;
        read_json(OPERATION, response).await
    }
}

/// Maps a failure status to a transport error.
async fn ensure_success(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = failure_detail(operation, response).await;
    Err(Error::Transport {
        operation: operation.to_string(),
        cause: detail.unwrap_or_else(|| format!("HTTP {status}")),
    })
}
