//! HTTP routes for the console server.
//!
//! - GET  /login                              — login gate (form + submit)
//! - GET  /healthcheck                        — liveness probe
//! - GET  /console/jobs                       — summary listing
//! - POST /console/select | sort | navigate | options — listing state
//! - GET  /console/jobs/{id}                  — drill-down
//! - GET  /console/jobs/{id}/stackdump        — administrators only
//! - POST /console/jobs/{id}/retry            — resubmit a failed job
//! - GET  /console/receivers/{serno}[/files]  — receiver views

use crate::handlers;
use actix_web::{web, HttpResponse};
use serde_json::json;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::get().to(handlers::login::login_handler))
        .route("/healthcheck", web::get().to(healthcheck_handler))
        .service(
            web::scope("/console")
                .route("/jobs", web::get().to(handlers::console::list_jobs))
                .route("/select", web::post().to(handlers::console::select))
                .route("/sort", web::post().to(handlers::console::sort))
                .route("/navigate", web::post().to(handlers::console::navigate))
                .route("/options", web::post().to(handlers::console::options))
                .route("/jobs/{id}", web::get().to(handlers::console::job_details))
                .route(
                    "/jobs/{id}/stackdump",
                    web::get().to(handlers::console::stack_dump),
                )
                .route("/jobs/{id}/retry", web::post().to(handlers::console::retry))
                .route(
                    "/receivers/{serno}",
                    web::get().to(handlers::console::receiver_info),
                )
                .route(
                    "/receivers/{serno}/files",
                    web::get().to(handlers::console::receiver_files),
                ),
        );
}

/// Health check endpoint handler
async fn healthcheck_handler() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
