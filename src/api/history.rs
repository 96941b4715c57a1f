//! Verification history retrieval and summary.

use super::{
    ApiClient, CancellationToken, NOT_AUTHENTICATED, expire_session, failure_detail,
    is_unauthorized, read_json, require_token,
};
use crate::config::ClientConfig;
use crate::models::{HistoryListing, HistoryRecord};
use crate::session::SessionStore;
use crate::{Error, Result};
use secrecy::ExposeSecret;

/// Fallback when the history endpoint fails without a backend message.
pub const HISTORY_FAILED: &str = "Failed to get history";

/// Fallback when clearing history fails without a backend message.
pub const CLEAR_HISTORY_FAILED: &str = "Failed to clear history";

/// Fetches the user's past verifications and summarizes them.
#[derive(Debug, Clone)]
pub struct HistoryAggregator {
    api: ApiClient,
    session: SessionStore,
    limit: Option<u32>,
}

impl HistoryAggregator {
    /// Creates an aggregator using the configured record limit.
    #[must_use]
    pub const fn new(api: ApiClient, session: SessionStore, config: &ClientConfig) -> Self {
        Self {
            api,
            session,
            limit: config.history_limit,
        }
    }

    /// Lists history in backend order, with a summary.
    ///
    /// An empty list is a successful, empty listing.
    ///
    /// # Errors
    ///
    /// - [`Error::Auth`] without a session, or on 401 (the session is cleared)
    /// - [`Error::Verification`] for any other failure status
    /// - [`Error::Transport`] on network failure or a malformed response
    pub async fn list_history(&self) -> Result<HistoryListing> {
        self.list_inner(None).await
    }

    /// Like [`list_history`](Self::list_history), abandoning the request if
    /// `cancel` fires.
    ///
    /// # Errors
    ///
    /// As [`list_history`](Self::list_history), plus [`Error::Cancelled`].
    pub async fn list_history_cancellable(
        &self,
        cancel: &CancellationToken,
    ) -> Result<HistoryListing> {
        self.list_inner(Some(cancel)).await
    }

    async fn list_inner(&self, cancel: Option<&CancellationToken>) -> Result<HistoryListing> {
        const OPERATION: &str = "list_history";
        let token = require_token(&self.session, NOT_AUTHENTICATED)?;

        let mut request = self
            .api
            .get("/verify/history")
            .bearer_auth(token.expose_secret());
        if let Some(limit) = self.limit {
            request = request.query(&[("limit", limit)]);
        }

        let response = self.api.dispatch(OPERATION, request, cancel).await?;
        let status = response.status();
        if is_unauthorized(status) {
            return Err(expire_session(&self.session, OPERATION));
        }
        if !status.is_success() {
            let detail = failure_detail(OPERATION, response).await;
            return Err(Error::Verification(
                detail.unwrap_or_else(|| HISTORY_FAILED.to_string()),
            ));
        }

        let records: Vec<HistoryRecord> = read_json(OPERATION, response).await?;
        let listing = HistoryListing::new(records);
        tracing::debug!(
            total = listing.summary.total,
            matches = listing.summary.matches,
            non_matches = listing.summary.non_matches,
            "Loaded verification history"
        );
        Ok(listing)
    }

    /// Deletes all of the user's history on the backend.
    ///
    /// # Errors
    ///
    /// Same contract as [`list_history`](Self::list_history).
    pub async fn clear_history(&self) -> Result<()> {
        const OPERATION: &str = "clear_history";
        let token = require_token(&self.session, NOT_AUTHENTICATED)?;

        let request = self
            .api
            .delete("/verify/history")
            .bearer_auth(token.expose_secret());
        let response = self.api.dispatch(OPERATION, request, None).await?;
        let status = response.status();
        if is_unauthorized(status) {
            return Err(expire_session(&self.session, OPERATION));
        }
        if !status.is_success() {
            let detail = failure_detail(OPERATION, response).await;
            return Err(Error::Verification(
                detail.unwrap_or_else(|| CLEAR_HISTORY_FAILED.to_string()),
            ));
        }

        tracing::info!("Cleared verification history");
        Ok(())
    }
}
