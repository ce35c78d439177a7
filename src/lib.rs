//! jobdeck console server library.
//!
//! The heavy lifting (gate, client, browser) lives in the member crates;
//! this package wires them behind HTTP: configuration, logging, the
//! per-ticket session registry, and the route handlers.

pub mod commands;
pub mod config;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod session;

/// Small per-request knobs shared by the handlers.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// Sign and verify tickets as 0.0.0.0 instead of the peer address.
    pub ignore_client_ip: bool,
    /// Summary page size cap passed through to listing queries.
    pub max_rows: Option<u32>,
    /// Advisory delay before a renderer should show a progress indicator;
    /// surfaced to clients on every console view.
    pub progress_after_ms: u64,
}
