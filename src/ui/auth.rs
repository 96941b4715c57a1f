//! Login and signup screen.

use super::{Busy, Screen, ScreenState};
use crate::api::{AuthClient, CancellationToken};
use crate::models::UserRecord;
use crate::Result;

/// Shown after a successful signup.
pub const SIGNUP_SUCCESS: &str = "Account created successfully! Please login.";

/// Which form is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Username and password.
    #[default]
    Login,
    /// Email, username, and password.
    Signup,
}

/// Result of a successful auth submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Logged in; carries the current user.
    LoggedIn(UserRecord),
    /// Account created; the user still has to log in.
    SignedUp(UserRecord),
}

/// Login/signup form state and the app-level authenticated flag.
#[derive(Debug, Default)]
pub struct AuthScreen {
    mode: AuthMode,
    screen: Screen<AuthEvent>,
    user: Option<UserRecord>,
    notice: Option<&'static str>,
}

impl AuthScreen {
    /// Creates a screen showing the login form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Which form is shown.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Switches forms, dismissing any error.
    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.screen.dismiss();
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ScreenState<AuthEvent> {
        self.screen.state()
    }

    /// The logged-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    /// True once a user has been loaded for the current session.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Informational message, such as the post-signup prompt.
    #[must_use]
    pub const fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    /// Restores a persisted session at startup.
    ///
    /// Does nothing without a stored token. A token the backend rejects is
    /// discarded by [`AuthClient::current_user`]; any other failure keeps
    /// the stored token so a later call can retry.
    ///
    /// # Errors
    ///
    /// Returns the `current_user` error. Check
    /// [`Error::requires_reauthentication`](crate::Error::requires_reauthentication)
    /// to tell an expired session from a transient failure.
    pub async fn restore(&mut self, auth: &AuthClient) -> Result<()> {
        if !auth.is_authenticated() {
            return Ok(());
        }
        match auth.current_user().await {
            Ok(user) => {
                self.user = Some(user);
                Ok(())
            },
            Err(e) => {
                tracing::info!(error = %e, "Could not restore session");
                self.user = None;
                Err(e)
            },
        }
    }

    /// Logs in, then loads the current user.
    ///
    /// # Errors
    ///
    /// Returns [`Busy`] if a submission is already in flight.
    pub async fn login(
        &mut self,
        auth: &AuthClient,
        username: &str,
        password: &str,
    ) -> std::result::Result<&ScreenState<AuthEvent>, Busy> {
        self.screen.begin()?;
        self.notice = None;
        let result = login_flow(auth, username, password, None).await;
        Ok(self.finish(result))
    }

    /// Like [`login`](Self::login), abandoning the request if `cancel`
    /// fires.
    ///
    /// # Errors
    ///
    /// Returns [`Busy`] if a submission is already in flight.
    pub async fn login_cancellable(
        &mut self,
        auth: &AuthClient,
        username: &str,
        password: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<&ScreenState<AuthEvent>, Busy> {
        self.screen.begin()?;
        self.notice = None;
        let result = login_flow(auth, username, password, Some(cancel)).await;
        Ok(self.finish(result))
    }

    /// Creates an account and switches to the login form on success.
    ///
    /// # Errors
    ///
    /// Returns [`Busy`] if a submission is already in flight.
    pub async fn signup(
        &mut self,
        auth: &AuthClient,
        email: &str,
        username: &str,
        password: &str,
    ) -> std::result::Result<&ScreenState<AuthEvent>, Busy> {
        self.screen.begin()?;
        self.notice = None;
        let result = auth
            .signup(email, username, password)
            .await
            .map(AuthEvent::SignedUp);
        Ok(self.finish(result))
    }

    /// Ends the session and returns to the login form.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted token cannot be removed.
    pub fn logout(&mut self, auth: &AuthClient) -> Result<()> {
        self.user = None;
        self.notice = None;
        self.mode = AuthMode::Login;
        self.screen.dismiss();
        auth.logout()
    }

    fn finish(&mut self, result: Result<AuthEvent>) -> &ScreenState<AuthEvent> {
        match &result {
            Ok(AuthEvent::LoggedIn(user)) => self.user = Some(user.clone()),
            Ok(AuthEvent::SignedUp(_)) => {
                self.mode = AuthMode::Login;
                self.notice = Some(SIGNUP_SUCCESS);
            },
            Err(_) => {},
        }
        self.screen.complete(result)
    }
}

async fn login_flow(
    auth: &AuthClient,
    username: &str,
    password: &str,
    cancel: Option<&CancellationToken>,
) -> Result<AuthEvent> {
    match cancel {
        Some(cancel) => auth.login_cancellable(username, password, cancel).await?,
        None => auth.login(username, password).await?,
    };
    auth.current_user().await.map(AuthEvent::LoggedIn)
}
