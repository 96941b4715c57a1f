//! Screen state machines.
//!
//! Each screen moves through [`ScreenState`]: `Idle` → `Loading` →
//! `Ready` | `Failed`. A screen refuses a second submission while one is in
//! flight, and [`user_message`] is the only place an [`Error`] becomes text
//! shown to the user.

mod auth;
mod history;
mod verification;

pub use auth::{AuthEvent, AuthMode, AuthScreen, SIGNUP_SUCCESS};
pub use history::{HistoryScreen, HistoryView};
pub use verification::{ImageSlot, VerificationScreen};

use crate::Error;
use thiserror::Error as ThisError;

/// Shown when the backend could not be reached.
pub const UNREACHABLE_MESSAGE: &str = "Unable to reach the server. Please try again.";

/// Shown when the user cancelled a request.
pub const CANCELLED_MESSAGE: &str = "Request cancelled.";

/// Where a screen is in its request cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenState<T> {
    /// Nothing submitted yet, or the last result was dismissed.
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request failed; carries user-facing text.
    Failed(String),
    /// The last request succeeded.
    Ready(T),
}

impl<T> Default for ScreenState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

/// Returned by [`Screen::begin`] while a request is already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[error("a request is already in progress")]
pub struct Busy;

/// Loading guard and result slot shared by every screen.
#[derive(Debug, Clone)]
pub struct Screen<T> {
    state: ScreenState<T>,
}

impl<T> Screen<T> {
    /// Creates an idle screen.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ScreenState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ScreenState<T> {
        &self.state
    }

    /// Returns true while a request is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, ScreenState::Loading)
    }

    /// The successful result, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match &self.state {
            ScreenState::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// The user-facing error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ScreenState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Enters `Loading`, clearing any previous result or error.
    ///
    /// # Errors
    ///
    /// Returns [`Busy`] if a request is already in flight.
    pub fn begin(&mut self) -> Result<(), Busy> {
        if self.is_loading() {
            tracing::debug!("Ignoring submission while a request is in flight");
            return Err(Busy);
        }
        self.state = ScreenState::Loading;
        Ok(())
    }

    /// Leaves `Loading` with the request's result.
    pub fn complete(&mut self, result: crate::Result<T>) -> &ScreenState<T> {
        self.state = match result {
            Ok(value) => ScreenState::Ready(value),
            Err(e) => ScreenState::Failed(user_message(&e)),
        };
        &self.state
    }

    /// Dismisses the result or error. Has no effect while loading.
    pub fn dismiss(&mut self) {
        if !self.is_loading() {
            self.state = ScreenState::Idle;
        }
    }
}

impl<T> Default for Screen<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts an error into the text shown to the user.
///
/// Messages from the backend and from client-side validation are shown
/// verbatim.
#[must_use]
pub fn user_message(error: &Error) -> String {
    match error {
        Error::Validation(message) | Error::Auth(message) | Error::Verification(message) => {
            message.clone()
        },
        Error::Transport { operation, cause } => {
            tracing::debug!(operation = %operation, cause = %cause, "Showing transport failure");
            UNREACHABLE_MESSAGE.to_string()
        },
        Error::Cancelled { .. } => CANCELLED_MESSAGE.to_string(),
        Error::OperationFailed { cause, .. } => cause.clone(),
    }
}
