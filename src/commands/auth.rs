//! Account command handlers.

use super::{Context, cancel_on_interrupt};
use faceverify::ui::{AuthEvent, AuthMode, AuthScreen, ScreenState};

/// Signup command.
pub async fn cmd_signup(
    ctx: &Context,
    email: &str,
    username: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let auth = ctx.auth();
    let mut screen = AuthScreen::new();
    screen.set_mode(AuthMode::Signup);

    screen.signup(&auth, email, username, password).await?;
    match screen.state() {
        ScreenState::Ready(AuthEvent::SignedUp(user)) => {
            println!("Created account '{}' ({})", user.username, user.email);
            if let Some(notice) = screen.notice() {
                println!("{notice}");
            }
            Ok(())
        },
        ScreenState::Failed(message) => Err(message.clone().into()),
        _ => Err("signup did not complete".into()),
    }
}

/// Login command.
pub async fn cmd_login(
    ctx: &Context,
    username: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let auth = ctx.auth();
    let mut screen = AuthScreen::new();
    let cancel = cancel_on_interrupt();

    screen
        .login_cancellable(&auth, username, password, &cancel)
        .await?;
    match screen.state() {
        ScreenState::Ready(AuthEvent::LoggedIn(user)) => {
            println!("Logged in as {}", user.username);
            Ok(())
        },
        ScreenState::Failed(message) => Err(message.clone().into()),
        _ => Err("login did not complete".into()),
    }
}

/// Logout command.
pub fn cmd_logout(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let auth = ctx.auth();
    let was_authenticated = auth.is_authenticated();
    AuthScreen::new().logout(&auth)?;

    if was_authenticated {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

/// Whoami command.
pub async fn cmd_whoami(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let auth = ctx.auth();
    let mut screen = AuthScreen::new();
    screen.restore(&auth).await?;

    let Some(user) = screen.user() else {
        return Err("Not logged in. Run `faceverify login` first.".into());
    };

    println!("Username: {}", user.username);
    println!("Email:    {}", user.email);
    println!("ID:       {}", user.id);
    if let Some(created_at) = user.created_at {
        println!("Joined:   {}", created_at.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}
