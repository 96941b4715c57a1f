//! Diagnostic command handlers.

use super::Context;
use faceverify::ui::user_message;

/// Health command.
pub async fn cmd_health(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let health = ctx
        .diagnostics()
        .health()
        .await
        .map_err(|e| user_message(&e))?;

    println!("Backend: {}", ctx.config().api_url);
    println!("Status:  {}", health.status);
    if let Some(message) = &health.message {
        println!("Message: {message}");
    }
    if let Some(loaded) = health.model_loaded {
        println!("Model loaded: {loaded}");
    }
    if let Some(model) = &health.model {
        println!("Model:   {model}");
    }
    if let Some(threshold) = health.threshold {
        println!("Threshold: {threshold}");
    }
    Ok(())
}

/// Model-info command.
pub async fn cmd_model_info(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let diagnostics = ctx.diagnostics();
    let info = diagnostics
        .model_info()
        .await
        .map_err(|e| user_message(&e))?;

    println!("Model Information");
    println!("=================");
    println!("Name:        {}", info.model_name.as_deref().unwrap_or("(unknown)"));
    println!("Type:        {}", info.model_type.as_deref().unwrap_or("(unknown)"));
    if let Some(threshold) = info.threshold {
        println!("Threshold:   {threshold}");
    }
    if let Some(description) = &info.description {
        println!("Description: {description}");
    }
    for (key, value) in &info.extra {
        println!("{key}: {value}");
    }

    // Settings need a session; skip them quietly when logged out.
    if ctx.auth().is_authenticated() {
        match diagnostics.verification_config().await {
            Ok(settings) => {
                println!();
                println!("Verification Settings:");
                println!("  Threshold: {}", settings.threshold);
                println!("  Allowed extensions: {}", settings.allowed_extensions.join(", "));
                println!("  Max file size: {} MB", settings.max_file_size_mb);
            },
            Err(e) => eprintln!("Could not load verification settings: {}", user_message(&e)),
        }
    }
    Ok(())
}
