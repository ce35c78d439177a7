//! jobdeck console server entrypoint.
//!
//! Wires configuration, logging, the login gate, the status-API client, and
//! the per-ticket session registry into an actix-web app. Also hosts the
//! `debug` subcommand for invoking a single upstream endpoint from the
//! command line.

use actix_web::{web, App, HttpServer};
use anyhow::Result;
use jobdeck_auth::{CookieConfig, HttpIdentityService, LoginGate};
use jobdeck_client::{HttpStatusTransport, StatusClient};
use jobdeck_server::config::ServerConfig;
use jobdeck_server::session::SessionRegistry;
use jobdeck_server::{commands, logging, routes, RuntimeSettings};
use log::info;
use std::env;
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    // Load configuration (the debug subcommand shares it)
    let config_path =
        env::var("JOBDECK_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = match ServerConfig::from_file(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("FATAL: failed to load {}: {}", config_path, e);
            eprintln!("The server cannot start without valid configuration");
            std::process::exit(1);
        }
    };

    // Debug runner: one endpoint call, no server
    if args.get(1).map(String::as_str) == Some("debug") {
        return commands::debug::run(&config, &args[2..]).await;
    }

    // Logging before any other side effects
    let server_log_path = format!("{}/server.log", config.logging.logs_path);
    logging::init_logging(
        &config.logging.level,
        &server_log_path,
        config.logging.log_to_console,
        Some(&config.logging.targets),
    )?;

    info!("jobdeck-server v{}", env!("CARGO_PKG_VERSION"));
    info!("status api: {}", config.upstream.status_api_url);
    info!("identity service: {}", config.upstream.identity_url);

    let secret = config.auth.secret_bytes()?;
    let timeout = Duration::from_secs(config.upstream.timeout_seconds);

    let identity = HttpIdentityService::new(config.upstream.identity_url.as_str(), timeout)
        .map_err(|e| anyhow::anyhow!("identity client setup failed: {}", e))?;
    let gate = Arc::new(LoginGate::new(
        Arc::new(identity),
        secret,
        config.auth.default_redirect.clone(),
        config.auth.admin_users.clone(),
        CookieConfig {
            secure: config.auth.cookie_secure,
            path: "/".to_string(),
            max_age_days: config.auth.cookie_max_age_days,
        },
    ));

    let transport = HttpStatusTransport::new(
        config.upstream.status_api_url.as_str(),
        timeout,
        Duration::from_millis(config.upstream.progress_after_ms),
    )
    .map_err(|e| anyhow::anyhow!("status transport setup failed: {}", e))?;
    let client = Arc::new(StatusClient::new(Arc::new(transport)));
    let sessions = Arc::new(SessionRegistry::new());
    let settings = RuntimeSettings {
        ignore_client_ip: config.auth.ignore_client_ip,
        max_rows: config.upstream.max_rows,
        progress_after_ms: config.upstream.progress_after_ms,
    };

    let workers = if config.server.workers == 0 {
        num_cpus::get()
    } else {
        config.server.workers
    };
    let bind = (config.server.host.clone(), config.server.port);
    info!("listening on {}:{} ({} workers)", bind.0, bind.1, workers);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(gate.clone()))
            .app_data(web::Data::from(client.clone()))
            .app_data(web::Data::from(sessions.clone()))
            .app_data(web::Data::new(settings.clone()))
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
