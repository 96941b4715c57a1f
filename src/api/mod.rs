//! HTTP clients for the verification backend.
//!
//! [`ApiClient`] owns the connection pool, base URL, and timeouts, and is
//! shared by the operation-specific clients:
//!
//! | Client | Endpoints |
//! |--------|-----------|
//! | [`AuthClient`] | `POST /auth/signup`, `POST /auth/login`, `GET /auth/me` |
//! | [`VerificationClient`] | `POST /verify/`, `POST /predict` |
//! | [`HistoryAggregator`] | `GET /verify/history`, `DELETE /verify/history` |
//! | [`DiagnosticsClient`] | `GET /health`, `GET /model-info`, `GET /verify/config` |
//!
//! Every authenticated call reads the token from the injected
//! [`SessionStore`]; a 401 clears it before the error is returned.
//! Failed requests are never retried here.

mod auth;
mod cancel;
mod diagnostics;
mod history;
mod verification;

pub use auth::AuthClient;
pub use cancel::CancellationToken;
pub use diagnostics::DiagnosticsClient;
pub use history::HistoryAggregator;
pub use verification::VerificationClient;

use crate::config::{ClientConfig, HttpConfig};
use crate::session::SessionStore;
use crate::{Error, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Returned when an authenticated call is attempted without a token.
pub const NOT_AUTHENTICATED: &str = "Not authenticated. Please login.";

/// Returned when the backend rejects the stored token.
pub const SESSION_EXPIRED: &str = "Session expired. Please login again.";

/// Shared HTTP core.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_base_url(&config.api_url, config.http)
    }

    /// Creates a client for an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_base_url(base_url: &str, http: HttpConfig) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: build_http_client(http)?,
        })
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` (which must start with `/`) onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path))
    }

    /// Sends a request, honouring an optional cancellation token.
    ///
    /// Only transport failures are errors here; HTTP error statuses are
    /// returned to the caller, which owns their interpretation.
    pub(crate) async fn dispatch(
        &self,
        operation: &str,
        request: RequestBuilder,
        cancel: Option<&CancellationToken>,
    ) -> Result<Response> {
        tracing::debug!(operation, "Dispatching backend request");

        let sent = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        tracing::info!(operation, "Request cancelled");
                        return Err(Error::Cancelled {
                            operation: operation.to_string(),
                        });
                    },
                    sent = request.send() => sent,
                }
            },
            None => request.send().await,
        };

        let response = sent.map_err(|e| transport_error(operation, &e))?;
        tracing::debug!(operation, status = %response.status(), "Backend responded");
        Ok(response)
    }
}

/// Builds the async HTTP client with configured timeouts.
fn build_http_client(config: HttpConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(format!("faceverify/{}", env!("CARGO_PKG_VERSION")));
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().map_err(|e| Error::OperationFailed {
        operation: "build_http_client".to_string(),
        cause: e.to_string(),
    })
}

/// Classifies and logs a reqwest failure.
pub(crate) fn transport_error(operation: &str, e: &reqwest::Error) -> Error {
    let error_kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_decode() {
        "decode"
    } else if e.is_request() {
        "request"
    } else {
        "unknown"
    };
    tracing::error!(
        operation,
        error = %e,
        error_kind = error_kind,
        is_timeout = e.is_timeout(),
        is_connect = e.is_connect(),
        "Backend request failed"
    );
    Error::Transport {
        operation: operation.to_string(),
        cause: format!("{error_kind} error: {e}"),
    }
}

/// Returns the stored token or an `Auth` error with `message`.
pub(crate) fn require_token(session: &SessionStore, message: &str) -> Result<SecretString> {
    session.token().ok_or_else(|| Error::Auth(message.to_string()))
}

/// Clears the session after the backend rejected its token.
pub(crate) fn expire_session(session: &SessionStore, operation: &str) -> Error {
    tracing::info!(operation, "Backend rejected session token; clearing session");
    if let Err(e) = session.clear() {
        tracing::warn!(operation, error = %e, "Failed to remove persisted session token");
    }
    Error::Auth(SESSION_EXPIRED.to_string())
}

/// Reads the body of a failed response and extracts the backend's message.
pub(crate) async fn failure_detail(operation: &str, response: Response) -> Option<String> {
    let status = response.status();
    let body = response.bytes().await.ok()?;
    let detail = extract_detail(&body);
    tracing::warn!(
        operation,
        status = %status,
        detail = detail.as_deref().unwrap_or(""),
        "Backend returned error status"
    );
    detail
}

/// Extracts a human-readable message from an error body.
///
/// Understands `{"detail": "..."}`, validation lists of the form
/// `{"detail": [{"msg": "..."}]}`, and `{"error": "..."}`.
pub(crate) fn extract_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;

    ["detail", "error"]
        .iter()
        .find_map(|key| match object.get(*key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            },
            _ => None,
        })
}

/// Reads a successful response body as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T> {
    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(operation, &e))?;

    serde_json::from_slice(&body).map_err(|e| {
        tracing::error!(operation, error = %e, "Failed to parse backend response");
        Error::Transport {
            operation: operation.to_string(),
            cause: format!("malformed response: {e}"),
        }
    })
}

/// Logs a failure status whose body is not surfaced to the caller.
pub(crate) fn log_failure_status(operation: &str, status: StatusCode) {
    tracing::warn!(operation, status = %status, "Backend returned error status");
}

/// Returns true for statuses that mean the token was rejected.
pub(crate) fn is_unauthorized(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED
}
