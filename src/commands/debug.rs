//! Debug runner: invoke a single status-API endpoint from the command line.
//!
//! Simulates what one console action would send, without standing up the
//! HTTP server:
//!
//! ```text
//! jobdeck-server debug <endpoint> [json-request] [ticket-cookie]
//! ```
//!
//! `json-request` defaults to `{}` and `ticket-cookie` (the serialized
//! `auth_tkt` value) is optional — endpoints other than `authenticate_user`
//! usually need one. Never expose this against a production secret from a
//! shared machine: the ticket on the command line lands in shell history.

use crate::config::ServerConfig;
use jobdeck_client::{Endpoint, HttpStatusTransport, StatusClient};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub async fn run(config: &ServerConfig, args: &[String]) -> anyhow::Result<()> {
    let endpoint_name = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("usage: jobdeck-server debug <endpoint> [json] [ticket]"))?;
    let endpoint = Endpoint::parse(endpoint_name)
        .ok_or_else(|| anyhow::anyhow!("unknown endpoint '{}'", endpoint_name))?;

    let request: Value = match args.get(1).map(String::as_str) {
        Some(raw) if raw != "-" => serde_json::from_str(raw)?,
        _ => Value::Object(Default::default()),
    };
    let ticket = args.get(2).map(String::as_str).filter(|t| *t != "-");

    let transport = HttpStatusTransport::new(
        config.upstream.status_api_url.as_str(),
        Duration::from_secs(config.upstream.timeout_seconds),
        Duration::from_millis(config.upstream.progress_after_ms),
    )
    .map_err(|e| anyhow::anyhow!("transport setup failed: {}", e))?;
    let client = StatusClient::new(Arc::new(transport));

    match client.call(endpoint, &request, ticket).await {
        Ok(reply) => {
            println!("{}", serde_json::to_string_pretty(&reply)?);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("request (token redacted): {}", err.payload());
            anyhow::bail!("call failed")
        }
    }
}
