//! Console endpoints.
//!
//! Every endpoint verifies the `auth_tkt` cookie, resolves the caller's
//! browsing session, runs one controller action under the session lock, and
//! returns the resulting view as JSON. A missing, forged, expired, or
//! malformed ticket is treated as an absent cookie: back to the login gate.

use crate::handlers::client_ip;
use crate::session::SessionRegistry;
use crate::RuntimeSettings;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use jobdeck_auth::{LoginGate, AUTH_COOKIE_NAME};
use jobdeck_browser::{BrowserError, JobBrowser, Navigation};
use jobdeck_client::StatusClient;
use jobdeck_commons::{JobId, Selector, SortField};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Verify the ticket cookie and resolve the caller's browsing session.
/// Any ticket failure sends the caller back to the gate.
fn session(
    req: &HttpRequest,
    gate: &LoginGate,
    settings: &RuntimeSettings,
    sessions: &SessionRegistry,
    client: &Arc<StatusClient>,
) -> Result<Arc<Mutex<JobBrowser>>, HttpResponse> {
    let cookie = req
        .cookie(AUTH_COOKIE_NAME)
        .ok_or_else(|| to_login(None))?;
    let ip = client_ip(req, settings.ignore_client_ip);
    let now = Utc::now().timestamp() as u32;
    let ticket = gate
        .authenticate(cookie.value(), ip, now)
        .map_err(|err| {
            log::warn!("rejecting ticket cookie: {}", err);
            // Drop any session the now-rejected ticket may have opened
            // while it still verified (e.g. it just expired).
            if let Ok(parsed) = jobdeck_ticket::parse(cookie.value()) {
                sessions.evict(&parsed.digest);
            }
            to_login(Some(err.to_string()))
        })?;
    Ok(sessions.session_for(&ticket, cookie.value(), client, settings.max_rows))
}

fn to_login(reason: Option<String>) -> HttpResponse {
    if let Some(reason) = reason {
        log::debug!("redirecting to login: {}", reason);
    }
    HttpResponse::Found()
        .insert_header(("Location", "/login"))
        .finish()
}

/// Serialize a console view, stamping the advisory progress threshold so
/// renderers know when to raise a progress indicator.
fn view_response(settings: &RuntimeSettings, view: impl serde::Serialize) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(("X-Progress-After-Ms", settings.progress_after_ms.to_string()))
        .json(view)
}

type Gate = web::Data<LoginGate>;
type Settings = web::Data<RuntimeSettings>;
type Sessions = web::Data<SessionRegistry>;
type Client = web::Data<StatusClient>;

/// GET /console/jobs — (re)load the summary listing.
pub async fn list_jobs(
    req: HttpRequest,
    gate: Gate,
    settings: Settings,
    sessions: Sessions,
    client: Client,
) -> HttpResponse {
    let session = match session(&req, &gate, &settings, &sessions, &client.into_inner()) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };
    let view = session.lock().await.refresh().await;
    view_response(&settings, view)
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    /// One of: all, id, idnear, user, project, type, log.
    pub kind: String,
    #[serde(default)]
    pub value: String,
}

impl SelectRequest {
    fn selector(&self) -> Result<Selector, String> {
        let value = self.value.trim();
        let numeric = || {
            value
                .parse::<i64>()
                .map(JobId::new)
                .map_err(|_| format!("'{}' is not a job ID", value))
        };
        match self.kind.as_str() {
            "all" => Ok(Selector::None),
            "id" => Ok(Selector::ById(numeric()?)),
            "idnear" => Ok(Selector::NearId(numeric()?)),
            "user" => Ok(Selector::ByUser(jobdeck_commons::UserId::new(value))),
            "project" => Ok(Selector::ByProject(jobdeck_commons::ProjectId::new(value))),
            "type" => Ok(Selector::ByType(value.to_string())),
            "log" => Ok(Selector::ByLogSubstring(value.to_string())),
            other => Err(format!("unknown selector kind '{}'", other)),
        }
    }
}

/// POST /console/select — replace the active filter and re-list.
pub async fn select(
    req: HttpRequest,
    gate: Gate,
    settings: Settings,
    sessions: Sessions,
    client: Client,
    body: web::Json<SelectRequest>,
) -> HttpResponse {
    let session = match session(&req, &gate, &settings, &sessions, &client.into_inner()) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };
    let selector = match body.selector() {
        Ok(selector) => selector,
        Err(message) => return HttpResponse::BadRequest().json(json!({ "error": message })),
    };
    let view = session.lock().await.select(selector).await;
    view_response(&settings, view)
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub field: String,
}

/// POST /console/sort — column-header click.
pub async fn sort(
    req: HttpRequest,
    gate: Gate,
    settings: Settings,
    sessions: Sessions,
    client: Client,
    body: web::Json<SortRequest>,
) -> HttpResponse {
    let session = match session(&req, &gate, &settings, &sessions, &client.into_inner()) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };
    let Some(field) = SortField::parse(&body.field) else {
        return HttpResponse::BadRequest()
            .json(json!({ "error": format!("unknown sort column '{}'", body.field) }));
    };
    let view = session.lock().await.sort_by(field).await;
    view_response(&settings, view)
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    /// One of: top, bottom, up, down.
    pub target: String,
}

/// POST /console/navigate — page relative to the current cursor.
pub async fn navigate(
    req: HttpRequest,
    gate: Gate,
    settings: Settings,
    sessions: Sessions,
    client: Client,
    body: web::Json<NavigateRequest>,
) -> HttpResponse {
    let session = match session(&req, &gate, &settings, &sessions, &client.into_inner()) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };
    let Some(nav) = Navigation::parse(&body.target) else {
        return HttpResponse::BadRequest()
            .json(json!({ "error": format!("unknown navigation target '{}'", body.target) }));
    };
    let view = session.lock().await.navigate(nav).await;
    view_response(&settings, view)
}

#[derive(Debug, Deserialize)]
pub struct OptionsRequest {
    pub error_only: bool,
}

/// POST /console/options — toggle the errors-only filter.
pub async fn options(
    req: HttpRequest,
    gate: Gate,
    settings: Settings,
    sessions: Sessions,
    client: Client,
    body: web::Json<OptionsRequest>,
) -> HttpResponse {
    let session = match session(&req, &gate, &settings, &sessions, &client.into_inner()) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };
    let view = session.lock().await.set_error_only(body.error_only).await;
    view_response(&settings, view)
}

/// GET /console/jobs/{id} — drill into one stump job.
pub async fn job_details(
    req: HttpRequest,
    gate: Gate,
    settings: Settings,
    sessions: Sessions,
    client: Client,
    path: web::Path<i64>,
) -> HttpResponse {
    let session = match session(&req, &gate, &settings, &sessions, &client.into_inner()) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };
    let view = session
        .lock()
        .await
        .job_details(JobId::new(path.into_inner()))
        .await;
    view_response(&settings, view)
}

/// GET /console/jobs/{id}/stackdump — administrators only.
pub async fn stack_dump(
    req: HttpRequest,
    gate: Gate,
    settings: Settings,
    sessions: Sessions,
    client: Client,
    path: web::Path<i64>,
) -> HttpResponse {
    let session = match session(&req, &gate, &settings, &sessions, &client.into_inner()) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };
    let result = session
        .lock()
        .await
        .stack_dump(JobId::new(path.into_inner()))
        .await;
    match result {
        Ok(view) => view_response(&settings, view),
        Err(err @ BrowserError::NotAuthorized) => {
            HttpResponse::Forbidden().json(json!({ "error": err.to_string() }))
        }
        Err(err) => HttpResponse::Conflict().json(json!({ "error": err.to_string() })),
    }
}

#[derive(Debug, Deserialize)]
pub struct RetryRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// POST /console/jobs/{id}/retry — resubmit a failed job. A duplicate
/// submit while the first awaits its reply is refused with 409.
pub async fn retry(
    req: HttpRequest,
    gate: Gate,
    settings: Settings,
    sessions: Sessions,
    client: Client,
    path: web::Path<i64>,
    body: web::Json<RetryRequest>,
) -> HttpResponse {
    let session = match session(&req, &gate, &settings, &sessions, &client.into_inner()) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };
    let result = session
        .lock()
        .await
        .retry_job(JobId::new(path.into_inner()), body.message.as_deref())
        .await;
    match result {
        Ok(view) => view_response(&settings, view),
        Err(err @ BrowserError::RetryPending(_)) => {
            HttpResponse::Conflict().json(json!({ "error": err.to_string() }))
        }
        Err(err) => HttpResponse::Forbidden().json(json!({ "error": err.to_string() })),
    }
}

/// GET /console/receivers/{serno} — receiver summary with daily counts.
pub async fn receiver_info(
    req: HttpRequest,
    gate: Gate,
    settings: Settings,
    sessions: Sessions,
    client: Client,
    path: web::Path<String>,
) -> HttpResponse {
    let session = match session(&req, &gate, &settings, &sessions, &client.into_inner()) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };
    let view = session.lock().await.receiver_info(&path.into_inner()).await;
    view_response(&settings, view)
}

#[derive(Debug, Deserialize)]
pub struct ReceiverFilesQuery {
    pub day: String,
}

/// GET /console/receivers/{serno}/files?day=YYYY-MM-DD — one day's files.
pub async fn receiver_files(
    req: HttpRequest,
    gate: Gate,
    settings: Settings,
    sessions: Sessions,
    client: Client,
    path: web::Path<String>,
    query: web::Query<ReceiverFilesQuery>,
) -> HttpResponse {
    let session = match session(&req, &gate, &settings, &sessions, &client.into_inner()) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };
    let view = session
        .lock()
        .await
        .receiver_files(&path.into_inner(), &query.day)
        .await;
    view_response(&settings, view)
}
