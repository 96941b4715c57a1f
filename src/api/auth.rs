//! Signup, login, and current-user requests.

use super::{
    ApiClient, CancellationToken, expire_session, failure_detail, is_unauthorized,
    log_failure_status, read_json, require_token,
};
use crate::models::{Session, UserRecord};
use crate::session::SessionStore;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Fallback when signup fails without a backend message.
pub const SIGNUP_FAILED: &str = "Signup failed";

/// Fallback when login fails without a backend message.
pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";

/// Returned by `current_user` when no token is stored.
pub const NO_TOKEN: &str = "No token found. Please login again.";

/// Returned when `/auth/me` fails for any reason other than 401.
pub const USER_INFO_FAILED: &str = "Failed to get user info";

/// Client for the `/auth` endpoints.
///
/// Login hands the issued token to the [`SessionStore`]; signup does not
/// log the user in.
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
    session: SessionStore,
}

/// Signup request body.
#[derive(Serialize)]
struct SignupRequest<'a> {
    email: &'a str,
    username: &'a str,
    password: &'a str,
}

/// Login response body.
#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

impl AuthClient {
    /// Creates an auth client.
    #[must_use]
    pub const fn new(api: ApiClient, session: SessionStore) -> Self {
        Self { api, session }
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] with the backend's message (or
    /// "Signup failed") when the backend rejects the request.
    pub async fn signup(&self, email: &str, username: &str, password: &str) -> Result<UserRecord> {
        const OPERATION: &str = "signup";
        tracing::info!(username, "Signing up");

        let request = self.api.post("/auth/signup").json(&SignupRequest {
            email,
            username,
            password,
        });
        let response = self.api.dispatch(OPERATION, request, None).await?;

        if !response.status().is_success() {
            let detail = failure_detail(OPERATION, response).await;
            return Err(Error::Validation(
                detail.unwrap_or_else(|| SIGNUP_FAILED.to_string()),
            ));
        }

        read_json(OPERATION, response).await
    }

    /// Logs in and stores the issued token.
    ///
    /// Credentials are sent as URL-encoded form fields; the backend's token
    /// endpoint does not accept JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] with the backend's message (or the generic
    /// login failure) when the credentials are rejected, and
    /// [`Error::Transport`] if a success response carries no token.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        self.login_inner(username, password, None).await
    }

    /// Like [`login`](Self::login), abandoning the request if `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`login`](Self::login), plus [`Error::Cancelled`].
    pub async fn login_cancellable(
        &self,
        username: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> Result<Session> {
        self.login_inner(username, password, Some(cancel)).await
    }

    async fn login_inner(
        &self,
        username: &str,
        password: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Session> {
        const OPERATION: &str = "login";
        tracing::info!(username, "Logging in");

        let request = self
            .api
            .post("/auth/login")
            .form(&[("username", username), ("password", password)]);
        let response = self.api.dispatch(OPERATION, request, cancel).await?;

        if !response.status().is_success() {
            let detail = failure_detail(OPERATION, response).await;
            return Err(Error::Auth(
                detail.unwrap_or_else(|| LOGIN_FAILED.to_string()),
            ));
        }

        let body: TokenResponse = read_json(OPERATION, response).await?;
        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Transport {
                operation: OPERATION.to_string(),
                cause: "malformed response: missing access_token".to_string(),
            })?;

        self.session.set_token(access_token.clone())?;
        tracing::info!(username, "Logged in");

        Ok(Session {
            access_token: SecretString::from(access_token),
            token_type: body.token_type.unwrap_or_else(|| "bearer".to_string()),
        })
    }

    /// Fetches the account behind the stored token.
    ///
    /// # Errors
    ///
    /// - [`Error::Auth`] "No token found" without a session
    /// - [`Error::Auth`] "Session expired" on 401, after clearing the session
    /// - [`Error::Auth`] "Failed to get user info" on any other failure status
    pub async fn current_user(&self) -> Result<UserRecord> {
        const OPERATION: &str = "current_user";
        let token = require_token(&self.session, NO_TOKEN)?;

        let request = self.api.get("/auth/me").bearer_auth(token.expose_secret());
        let response = self.api.dispatch(OPERATION, request, None).await?;
        let status = response.status();

        if is_unauthorized(status) {
            return Err(expire_session(&self.session, OPERATION));
        }
        if !status.is_success() {
            log_failure_status(OPERATION, status);
            return Err(Error::Auth(USER_INFO_FAILED.to_string()));
        }

        read_json(OPERATION, response).await
    }

    /// Ends the session locally. No network call is made.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted token cannot be removed.
    pub fn logout(&self) -> Result<()> {
        tracing::info!("Logging out");
        self.session.clear()
    }

    /// Returns true iff a token is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;

    fn client() -> AuthClient {
        let api = ApiClient::with_base_url("http://127.0.0.1:9", HttpConfig::default())
            .unwrap_or_else(|e| panic!("client: {e}"));
        AuthClient::new(api, SessionStore::in_memory())
    }

    #[tokio::test]
    async fn test_current_user_without_token_fails_fast() {
        let result = client().current_user().await;
        assert!(matches!(result, Err(Error::Auth(ref m)) if m == NO_TOKEN));
    }

    #[test]
    fn test_logout_twice() {
        let auth = client();
        assert!(auth.session.set_token("T").is_ok());
        assert!(auth.logout().is_ok());
        assert!(!auth.is_authenticated());
        assert!(auth.logout().is_ok());
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn test_token_response_tolerates_missing_fields() {
        let body: TokenResponse = serde_json::from_str("{}").unwrap_or_else(|e| panic!("{e}"));
        assert!(body.access_token.is_none());
        assert!(body.token_type.is_none());
    }
}
