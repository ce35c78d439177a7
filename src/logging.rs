// Logging module — powered by tracing-subscriber
//
// Uses tracing-subscriber for the console and file layers. A compatibility
// bridge (`tracing_log::LogTracer`) captures the `log::*` macro calls made
// by the library crates and routes them through the same subscriber.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::Path;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Build the `EnvFilter` from the base level, hardcoded noisy-crate
/// overrides, and optional per-target overrides from config.
fn build_env_filter(
    level: &str,
    target_levels: Option<&HashMap<String, String>>,
) -> anyhow::Result<EnvFilter> {
    // Base directive — set the default level
    let mut directives = vec![level.to_string()];

    // Suppress noisy third-party crates
    let noisy: &[(&str, &str)] = &[
        ("actix_server", "warn"),
        ("actix_web", "warn"),
        ("h2", "warn"),
        ("hyper", "warn"),
        ("reqwest", "warn"),
        ("tracing", "warn"),
    ];
    for (target, lvl) in noisy {
        directives.push(format!("{}={}", target, lvl));
    }

    // Per-target overrides from config.toml
    if let Some(map) = target_levels {
        for (target, lvl) in map.iter() {
            directives.push(format!("{}={}", target, lvl));
        }
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("Invalid tracing filter '{}': {}", filter_str, e))
}

/// Initialize logging based on configuration.
///
/// Sets up `tracing-subscriber` with a colored console layer (when
/// `log_to_console` is true) and a compact-text file layer, then installs
/// the `log` bridge so the library crates' `log::*` calls land in the same
/// place.
pub fn init_logging(
    level: &str,
    log_file_path: &str,
    log_to_console: bool,
    target_levels: Option<&HashMap<String, String>>,
) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(log_file_path).parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    let file_filter = build_env_filter(level, target_levels)?;
    let console_filter = build_env_filter(level, target_levels)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_filter(file_filter);

    let console_layer = log_to_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(true)
            .with_filter(console_filter)
    });

    tracing_log::LogTracer::init()?;
    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()?;
    Ok(())
}
