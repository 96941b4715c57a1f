//! Config command handler.

use faceverify::ClientConfig;

/// Config command.
pub fn cmd_config(config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("API URL: {}", config.api_url);
    println!("Token Path: {}", config.token_path.display());
    println!(
        "Max Image Size: {} bytes ({:.1} MiB)",
        config.max_image_bytes,
        bytes_to_mib(config.max_image_bytes)
    );
    match config.history_limit {
        Some(limit) => println!("History Limit: {limit}"),
        None => println!("History Limit: (backend default)"),
    }
    println!();

    println!("HTTP:");
    display_timeout("Request Timeout", config.http.timeout_ms);
    display_timeout("Connect Timeout", config.http.connect_timeout_ms);
    println!();

    println!("Logging:");
    println!(
        "  Format: {}",
        config.logging.format.as_deref().unwrap_or("pretty")
    );
    println!(
        "  Filter: {}",
        config.logging.filter.as_deref().unwrap_or("(default)")
    );
    match &config.logging.file {
        Some(path) => println!("  File: {}", path.display()),
        None => println!("  File: (stderr)"),
    }

    Ok(())
}

fn display_timeout(label: &str, ms: u64) {
    if ms == 0 {
        println!("  {label}: disabled");
    } else {
        println!("  {label}: {ms}ms");
    }
}

#[allow(clippy::cast_precision_loss)]
fn bytes_to_mib(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
