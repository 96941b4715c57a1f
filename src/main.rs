//! Binary entry point for faceverify.
//!
//! This binary provides the CLI interface for the face verification client.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    Context, cmd_clear_history, cmd_config, cmd_health, cmd_history, cmd_login, cmd_logout,
    cmd_model_info, cmd_signup, cmd_verify, cmd_whoami,
};
use faceverify::ClientConfig;
use faceverify::observability::{self, LoggingConfig};
use std::path::PathBuf;
use std::process::ExitCode;

/// Faceverify - compare two face images with a verification service.
#[derive(Parser)]
#[command(name = "faceverify")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Create an account.
    Signup {
        /// Email address.
        #[arg(short, long)]
        email: String,

        /// Username.
        #[arg(short, long)]
        username: String,

        /// Password.
        #[arg(short, long, env = "FACEVERIFY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log in and store the session token.
    Login {
        /// Username.
        #[arg(short, long)]
        username: String,

        /// Password.
        #[arg(short, long, env = "FACEVERIFY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session token.
    Logout,

    /// Show the logged-in user.
    Whoami,

    /// Compare two face images.
    Verify {
        /// First image.
        image1: PathBuf,

        /// Second image.
        image2: PathBuf,

        /// Use the unauthenticated prediction endpoint.
        #[arg(long)]
        public: bool,

        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show past verifications.
    History {
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete all past verifications.
    ClearHistory,

    /// Check backend health.
    Health,

    /// Show information about the backend's model.
    ModelInfo,

    /// Show the effective configuration.
    Config,
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(LoggingConfig::from_settings(
        Some(&config.logging),
        cli.verbose,
    )) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    if matches!(cli.command, Commands::Config) {
        return cmd_config(&config);
    }

    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Signup {
            email,
            username,
            password,
        } => cmd_signup(&ctx, &email, &username, &password).await,

        Commands::Login { username, password } => cmd_login(&ctx, &username, &password).await,

        Commands::Logout => cmd_logout(&ctx),

        Commands::Whoami => cmd_whoami(&ctx).await,

        Commands::Verify {
            image1,
            image2,
            public,
            json,
        } => cmd_verify(&ctx, &image1, &image2, public, json).await,

        Commands::History { json } => cmd_history(&ctx, json).await,

        Commands::ClearHistory => cmd_clear_history(&ctx).await,

        Commands::Health => cmd_health(&ctx).await,

        Commands::ModelInfo => cmd_model_info(&ctx).await,

        Commands::Config => cmd_config(ctx.config()),
    }
}

/// Loads configuration.
fn load_config(path: Option<&str>) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    // If a path is provided, load from that file
    if let Some(config_path) = path {
        return ClientConfig::load_from_file(std::path::Path::new(config_path))
            .map_err(std::convert::Into::into);
    }

    // Environment override for config path
    if let Ok(config_path) = std::env::var("FACEVERIFY_CONFIG_PATH") {
        if !config_path.trim().is_empty() {
            return ClientConfig::load_from_file(std::path::Path::new(&config_path))
                .map_err(std::convert::Into::into);
        }
    }

    // Otherwise, load from default location
    ClientConfig::load_default().map_err(std::convert::Into::into)
}
