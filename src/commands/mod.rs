//! Command handlers module.
//!
//! This module organizes the CLI command implementations into separate files:
//! - `auth.rs`: Account commands (signup, login, logout, whoami)
//! - `verify.rs`: Image pair verification
//! - `history.rs`: History listing and clearing
//! - `diagnostics.rs`: Backend health and model info
//! - `config.rs`: Configuration display command

mod auth;
mod config;
mod diagnostics;
mod history;
mod verify;

pub use auth::{cmd_login, cmd_logout, cmd_signup, cmd_whoami};
pub use config::cmd_config;
pub use diagnostics::{cmd_health, cmd_model_info};
pub use history::{cmd_clear_history, cmd_history};
pub use verify::cmd_verify;

use faceverify::{
    ApiClient, AuthClient, CancellationToken, ClientConfig, DiagnosticsClient, FileTokenStorage,
    HistoryAggregator, SessionStore, VerificationClient,
};

/// Shared state for command handlers.
///
/// Every client shares one HTTP pool and one file-backed session.
pub struct Context {
    config: ClientConfig,
    api: ApiClient,
    session: SessionStore,
}

impl Context {
    /// Builds the HTTP client and opens the persisted session.
    pub fn new(config: ClientConfig) -> faceverify::Result<Self> {
        let api = ApiClient::new(&config)?;
        let session = SessionStore::open(FileTokenStorage::new(config.token_path.clone()));
        Ok(Self {
            config,
            api,
            session,
        })
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.api.clone(), self.session.clone())
    }

    pub fn verification(&self) -> VerificationClient {
        VerificationClient::new(self.api.clone(), self.session.clone(), &self.config)
    }

    pub fn history(&self) -> HistoryAggregator {
        HistoryAggregator::new(self.api.clone(), self.session.clone(), &self.config)
    }

    pub fn diagnostics(&self) -> DiagnosticsClient {
        DiagnosticsClient::new(self.api.clone(), self.session.clone())
    }
}

/// Returns a token that is cancelled on Ctrl-C.
fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });
    token
}

/// Formats a confidence in [0, 1] as a percentage.
fn percent(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}
