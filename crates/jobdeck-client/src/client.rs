//! The status-API client.
//!
//! Every call is `POST <base>/<endpoint>` with a single `json` form field
//! carrying the serialized request object. The caller's access ticket is
//! attached as `authToken` on every endpoint except the identity exchange
//! itself. Outcomes are classified into success, API error (explicit
//! `error` field), and transport error (network failure, timeout, or an
//! undecodable body).

use crate::error::{QueryError, Result};
use crate::query;
use crate::wire::{
    AuthenticateReply, ListJobsReply, ListJobsRequest, ReceiverFiles, ReceiverInfo, RetryReply,
    StackDump,
};
use async_trait::async_trait;
use jobdeck_commons::{Job, JobId};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// The API entries the console consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ListJobs,
    GetReceiverInfo,
    ListReceiverFiles,
    GetJobStackdump,
    RetryJob,
    AuthenticateUser,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::ListJobs => "list_jobs",
            Endpoint::GetReceiverInfo => "get_receiver_info",
            Endpoint::ListReceiverFiles => "list_receiver_files",
            Endpoint::GetJobStackdump => "get_job_stackdump",
            Endpoint::RetryJob => "retry_job",
            Endpoint::AuthenticateUser => "authenticate_user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "list_jobs" => Some(Endpoint::ListJobs),
            "get_receiver_info" => Some(Endpoint::GetReceiverInfo),
            "list_receiver_files" => Some(Endpoint::ListReceiverFiles),
            "get_job_stackdump" => Some(Endpoint::GetJobStackdump),
            "retry_job" => Some(Endpoint::RetryJob),
            "authenticate_user" => Some(Endpoint::AuthenticateUser),
            _ => None,
        }
    }
}

/// Transport seam: one POST, raw body back. Tests inject scripted
/// implementations; production uses [`HttpStatusTransport`].
#[async_trait]
pub trait StatusTransport: Send + Sync {
    /// Returns the raw response body, or a transport-level failure message.
    async fn post(&self, endpoint: &str, json_payload: &str) -> std::result::Result<Vec<u8>, String>;
}

/// reqwest-backed transport.
///
/// The timeout is a hard bound converting to a transport error; the
/// progress threshold is advisory only — it tells renderers when to start
/// showing a progress indicator, it never aborts the call.
pub struct HttpStatusTransport {
    base_url: String,
    client: reqwest::Client,
    progress_after: Duration,
}

impl HttpStatusTransport {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        progress_after: Duration,
    ) -> std::result::Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            progress_after,
        })
    }

    /// Advisory delay before a renderer should show a progress indicator.
    pub fn progress_after(&self) -> Duration {
        self.progress_after
    }
}

#[async_trait]
impl StatusTransport for HttpStatusTransport {
    async fn post(&self, endpoint: &str, json_payload: &str) -> std::result::Result<Vec<u8>, String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let started = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .form(&[("json", json_payload)])
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let body = response.bytes().await.map_err(|e| e.to_string())?;
        if started.elapsed() > self.progress_after {
            log::debug!(
                "{} took {:?}, past the progress-indicator threshold",
                endpoint,
                started.elapsed()
            );
        }
        Ok(body.to_vec())
    }
}

/// Outcome of a summary listing, after stale classification.
#[derive(Debug, Clone, PartialEq)]
pub enum ListOutcome {
    /// A page to display, replacing the previous one.
    Page(Vec<Job>),
    /// Zero rows while a non-empty page is on screen: keep showing the
    /// previous page (avoids flicker on transient misses). Never surfaced
    /// to the user.
    Stale,
    /// Zero rows and nothing displayed yet: genuinely no matches.
    NoMatches,
}

/// Classify a `list_jobs` result page against what is currently displayed.
pub fn classify_list(jobs: Vec<Job>, displaying_nonempty: bool) -> ListOutcome {
    if jobs.is_empty() {
        if displaying_nonempty {
            ListOutcome::Stale
        } else {
            ListOutcome::NoMatches
        }
    } else {
        ListOutcome::Page(jobs)
    }
}

/// Client for the remote status API.
pub struct StatusClient {
    transport: Arc<dyn StatusTransport>,
}

impl StatusClient {
    pub fn new(transport: Arc<dyn StatusTransport>) -> Self {
        Self { transport }
    }

    /// Call one endpoint with an arbitrary request object.
    ///
    /// Attaches `ticket` as `authToken` unless the endpoint is the identity
    /// exchange. Returns the reply as JSON after error classification.
    pub async fn call<T: Serialize>(
        &self,
        endpoint: Endpoint,
        request: &T,
        ticket: Option<&str>,
    ) -> Result<Value> {
        let name = endpoint.as_str();
        let mut payload = serde_json::to_value(request).map_err(|e| QueryError::Transport {
            endpoint: name.to_string(),
            message: format!("request serialization failed: {}", e),
            payload: String::new(),
        })?;
        if endpoint != Endpoint::AuthenticateUser {
            if let (Value::Object(map), Some(ticket)) = (&mut payload, ticket) {
                map.insert("authToken".to_string(), Value::String(ticket.to_string()));
            }
        }
        let redacted = redacted_payload(&payload);
        let json_payload = payload.to_string();

        log::debug!("status api call: {} {}", name, redacted);
        let body = self
            .transport
            .post(name, &json_payload)
            .await
            .map_err(|message| QueryError::Transport {
                endpoint: name.to_string(),
                message,
                payload: redacted.clone(),
            })?;

        let reply: Value =
            serde_json::from_slice(&body).map_err(|e| QueryError::Transport {
                endpoint: name.to_string(),
                message: format!("undecodable response: {}", e),
                payload: redacted.clone(),
            })?;

        if let Some(error) = reply.get("error") {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(QueryError::Api {
                endpoint: name.to_string(),
                message,
                payload: redacted,
            });
        }
        Ok(reply)
    }

    /// Summary or detail listing, converted to rows at the boundary.
    pub async fn list_jobs(&self, request: &ListJobsRequest, ticket: &str) -> Result<Vec<Job>> {
        let reply = self.call(Endpoint::ListJobs, request, Some(ticket)).await?;
        let columns: ListJobsReply = decode(Endpoint::ListJobs, reply)?;
        columns.into_jobs(Endpoint::ListJobs.as_str())
    }

    /// Drill-down listing for one stump job.
    pub async fn list_subjobs(&self, stump: JobId, ticket: &str) -> Result<Vec<Job>> {
        self.list_jobs(&query::build_details(stump), ticket).await
    }

    pub async fn get_receiver_info(&self, serno: &str, ticket: &str) -> Result<ReceiverInfo> {
        let reply = self
            .call(Endpoint::GetReceiverInfo, &json!({ "serno": serno }), Some(ticket))
            .await?;
        decode(Endpoint::GetReceiverInfo, reply)
    }

    pub async fn list_receiver_files(
        &self,
        serno: &str,
        day: Option<&str>,
        ticket: &str,
    ) -> Result<ReceiverFiles> {
        let request = match day {
            Some(day) => json!({ "serno": serno, "day": day }),
            None => json!({ "serno": serno }),
        };
        let reply = self
            .call(Endpoint::ListReceiverFiles, &request, Some(ticket))
            .await?;
        decode(Endpoint::ListReceiverFiles, reply)
    }

    pub async fn get_job_stackdump(&self, job_id: JobId, ticket: &str) -> Result<StackDump> {
        let reply = self
            .call(Endpoint::GetJobStackdump, &json!({ "jobID": job_id }), Some(ticket))
            .await?;
        decode(Endpoint::GetJobStackdump, reply)
    }

    /// Submit a failed job for retrying, with an optional operator message
    /// appended to the job's log.
    pub async fn retry_job(
        &self,
        job_id: JobId,
        message: Option<&str>,
        ticket: &str,
    ) -> Result<RetryReply> {
        let request = json!({ "jobID": job_id, "message": message.unwrap_or("") });
        let reply = self.call(Endpoint::RetryJob, &request, Some(ticket)).await?;
        decode(Endpoint::RetryJob, reply)
    }

    /// Exchange credentials for an upstream auth token. The only endpoint
    /// that never carries a ticket.
    pub async fn authenticate_user(
        &self,
        login: &str,
        pword: &str,
        date: &str,
    ) -> Result<AuthenticateReply> {
        let request = json!({ "date": date, "login": login, "pword": pword });
        let reply = self
            .call(Endpoint::AuthenticateUser, &request, None)
            .await?;
        decode(Endpoint::AuthenticateUser, reply)
    }
}

fn decode<T: serde::de::DeserializeOwned>(endpoint: Endpoint, reply: Value) -> Result<T> {
    serde_json::from_value(reply).map_err(|e| QueryError::Transport {
        endpoint: endpoint.as_str().to_string(),
        message: format!("unexpected reply shape: {}", e),
        payload: String::new(),
    })
}

/// Render a request payload for diagnostics with the access token redacted.
/// The raw digest must never reach a log line or an error box.
fn redacted_payload(payload: &Value) -> String {
    let mut clone = payload.clone();
    if let Value::Object(map) = &mut clone {
        if map.contains_key("authToken") {
            map.insert(
                "authToken".to_string(),
                Value::String("(omitted)".to_string()),
            );
        }
    }
    clone.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobdeck_commons::{JobStatus, PaginationCursor, SortSpec};
    use std::sync::Mutex;

    /// Transport returning a canned body and recording what it was asked.
    struct Scripted {
        body: std::result::Result<&'static str, &'static str>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl Scripted {
        fn new(body: std::result::Result<&'static str, &'static str>) -> Arc<Self> {
            Arc::new(Self {
                body,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl StatusTransport for Scripted {
        async fn post(
            &self,
            endpoint: &str,
            json_payload: &str,
        ) -> std::result::Result<Vec<u8>, String> {
            self.seen
                .lock()
                .unwrap()
                .push((endpoint.to_string(), json_payload.to_string()));
            match self.body {
                Ok(body) => Ok(body.as_bytes().to_vec()),
                Err(message) => Err(message.to_string()),
            }
        }
    }

    fn list_request() -> ListJobsRequest {
        query::build(
            &query::SelectorSet::default(),
            SortSpec::default(),
            &PaginationCursor::top(),
            query::QueryOptions::default(),
        )
    }

    #[tokio::test]
    async fn ticket_attached_to_list_jobs() {
        let transport = Scripted::new(Ok(r#"{"id":[]}"#));
        let client = StatusClient::new(transport.clone());
        client.list_jobs(&list_request(), "TICKET").await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].0, "list_jobs");
        let sent: Value = serde_json::from_str(&seen[0].1).unwrap();
        assert_eq!(sent["authToken"], "TICKET");
    }

    #[tokio::test]
    async fn identity_exchange_never_carries_ticket() {
        let transport = Scripted::new(Ok(r#"{"userID":7,"authToken":"abc"}"#));
        let client = StatusClient::new(transport.clone());
        client
            .authenticate_user("alice", "hunter2", "20260806120000")
            .await
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        let sent: Value = serde_json::from_str(&seen[0].1).unwrap();
        assert!(sent.get("authToken").is_none());
    }

    #[tokio::test]
    async fn explicit_error_field_is_an_api_error() {
        let transport = Scripted::new(Ok(r#"{"error":"no such job"}"#));
        let client = StatusClient::new(transport);
        let err = client
            .list_jobs(&list_request(), "TICKET")
            .await
            .unwrap_err();
        match &err {
            QueryError::Api { message, payload, .. } => {
                assert_eq!(message, "no such job");
                assert!(payload.contains("(omitted)"), "token must be redacted");
                assert!(!payload.contains("TICKET"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn network_failure_is_a_transport_error() {
        let transport = Scripted::new(Err("connection reset"));
        let client = StatusClient::new(transport);
        let err = client
            .list_jobs(&list_request(), "TICKET")
            .await
            .unwrap_err();
        match &err {
            QueryError::Transport { endpoint, message, payload } => {
                assert_eq!(endpoint, "list_jobs");
                assert!(message.contains("connection reset"));
                assert!(!payload.contains("TICKET"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_a_transport_error() {
        let transport = Scripted::new(Ok("<html>bad gateway</html>"));
        let client = StatusClient::new(transport);
        let err = client
            .list_jobs(&list_request(), "TICKET")
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Transport { .. }));
    }

    #[test]
    fn stale_classification() {
        let job = Job {
            id: JobId::new(1),
            ctime: None,
            mtime: None,
            kind: None,
            queue: None,
            done: Some(1),
            sj_done: None,
            data: None,
            stump: None,
            project_id: None,
        };
        assert_eq!(classify_list(vec![], true), ListOutcome::Stale);
        assert_eq!(classify_list(vec![], false), ListOutcome::NoMatches);
        match classify_list(vec![job.clone()], true) {
            ListOutcome::Page(jobs) => {
                assert_eq!(jobs[0].status(), JobStatus::Ok);
            }
            other => panic!("expected page, got {other:?}"),
        }
    }
}
