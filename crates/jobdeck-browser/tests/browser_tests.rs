//! Unit tests for the job-browser controller.
//!
//! Tests cover:
//! - Cursor-relative pagination round trips
//! - Stale-reply and superseded-reply handling
//! - Sort-header behavior (toggle vs reset)
//! - Drill-down hierarchy and role-gated stack dumps
//! - Retry disable-on-submit discipline

use async_trait::async_trait;
use jobdeck_browser::{ConsoleView, JobBrowser, Navigation};
use jobdeck_client::{StatusClient, StatusTransport};
use jobdeck_commons::{JobId, Selector, SortField};
use jobdeck_ticket::TicketCodec;
use serde_json::Value;
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

/// Transport that replays scripted bodies in order and records every
/// request it was sent.
struct Replay {
    bodies: Mutex<VecDeque<&'static str>>,
    seen: Mutex<Vec<(String, Value)>>,
}

impl Replay {
    fn new(bodies: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            bodies: Mutex::new(bodies.iter().copied().collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn request(&self, i: usize) -> (String, Value) {
        self.seen.lock().unwrap()[i].clone()
    }
}

#[async_trait]
impl StatusTransport for Replay {
    async fn post(&self, endpoint: &str, json_payload: &str) -> Result<Vec<u8>, String> {
        let payload: Value = serde_json::from_str(json_payload).unwrap();
        self.seen
            .lock()
            .unwrap()
            .push((endpoint.to_string(), payload));
        match self.bodies.lock().unwrap().pop_front() {
            Some(body) => Ok(body.as_bytes().to_vec()),
            None => Err("script exhausted".to_string()),
        }
    }
}

fn ticket_for(role: &str) -> String {
    TicketCodec::issue(
        Ipv4Addr::LOCALHOST,
        "alice",
        &["12".into(), "47".into()],
        role,
        b"secret",
        1_700_000_000,
    )
    .serialize()
}

fn browser(transport: Arc<Replay>, role: &str) -> JobBrowser {
    JobBrowser::new(
        Arc::new(StatusClient::new(transport)),
        ticket_for(role),
        None,
    )
}

fn rows(view: &ConsoleView) -> Vec<i64> {
    match view {
        ConsoleView::JobList(list) => list.rows.iter().map(|r| r.id.as_i64()).collect(),
        other => panic!("expected a job list, got {other:?}"),
    }
}

// Pages used by the pagination tests, mtime descending.
const PAGE_ONE: &str =
    r#"{"id":[50,42],"mtime":[2000.0,1700.0],"done":[1,1],"sjDone":[1,1]}"#;
const PAGE_TWO: &str =
    r#"{"id":[40,39],"mtime":[1600.0,1500.0],"done":[1,1],"sjDone":[1,1]}"#;

/// PageDown keys off the last row `(mtime, id)`; the following PageUp keys
/// off the first row of the page PageDown produced, not the original page.
#[tokio::test]
async fn test_pagination_round_trip_is_cursor_relative() {
    let transport = Replay::new(&[PAGE_ONE, PAGE_TWO, PAGE_ONE]);
    let mut browser = browser(transport.clone(), "");

    // Landing page under the default mtime-descending order.
    assert_eq!(rows(&browser.refresh().await), vec![50, 42]);
    assert_eq!(rows(&browser.navigate(Navigation::PageDown).await), vec![40, 39]);
    browser.navigate(Navigation::PageUp).await;

    // PageDown keyed off page one's last row.
    let (_, payload) = transport.request(1);
    assert_eq!(payload["order"]["lastKey"], serde_json::json!([1700.0, 42]));
    assert_eq!(payload["order"]["forwardFromKey"], true);

    // PageUp keyed off the intermediate page's first row, not the original
    // page's.
    let (_, payload) = transport.request(2);
    assert_eq!(
        payload["order"]["lastKey"],
        serde_json::json!([1600.0, 40]),
        "PageUp must key off the intermediate page's first row"
    );
    assert_eq!(payload["order"]["forwardFromKey"], false);
}

/// Toggling the sorted column flips direction and keeps the cursor;
/// switching columns resets to the top ascending.
#[tokio::test]
async fn test_sort_header_toggle_and_reset() {
    let transport = Replay::new(&[PAGE_ONE, PAGE_ONE, PAGE_ONE, PAGE_ONE]);
    let mut browser = browser(transport.clone(), "");

    browser.sort_by(SortField::Mtime).await;
    browser.sort_by(SortField::Mtime).await;
    browser.navigate(Navigation::PageDown).await;
    browser.sort_by(SortField::Ctime).await;

    let (_, flip) = transport.request(1);
    assert_eq!(flip["order"]["sortBy"], "mtime");
    assert_eq!(flip["order"]["sortDesc"], true);

    let (_, reset) = transport.request(3);
    assert_eq!(reset["order"]["sortBy"], "ctime");
    assert_eq!(reset["order"]["sortDesc"], false);
    assert_eq!(reset["order"]["lastKey"], serde_json::json!([]));
    assert_eq!(reset["order"]["forwardFromKey"], true);
}

/// A zero-row reply with a page on screen keeps the page (stale miss, never
/// an empty flash); with nothing on screen it reports no matches.
#[tokio::test]
async fn test_zero_rows_keeps_previous_page() {
    let transport = Replay::new(&[PAGE_ONE, r#"{"id":[]}"#]);
    let mut browser = browser(transport, "");

    assert_eq!(rows(&browser.refresh().await), vec![50, 42]);
    assert_eq!(rows(&browser.refresh().await), vec![50, 42]);
}

#[tokio::test]
async fn test_zero_rows_on_empty_screen_is_no_matches() {
    let transport = Replay::new(&[r#"{"id":[]}"#]);
    let mut browser = browser(transport, "");
    assert!(matches!(browser.refresh().await, ConsoleView::NoMatches));
}

/// A reply for a superseded request must not overwrite a newer page, no
/// matter the arrival order.
#[tokio::test]
async fn test_superseded_reply_is_discarded() {
    let transport = Replay::new(&[PAGE_ONE]);
    let mut browser = browser(transport, "");

    let first = browser.prepare_list();
    let second = browser.prepare_list();

    // Newer reply lands first.
    let newer = serde_json::from_str::<jobdeck_client::ListJobsReply>(PAGE_ONE)
        .unwrap()
        .into_jobs("list_jobs")
        .unwrap();
    assert_eq!(rows(&browser.apply_list(second.seq, Ok(newer))), vec![50, 42]);

    // The older reply arrives late and must be dropped.
    let older = serde_json::from_str::<jobdeck_client::ListJobsReply>(PAGE_TWO)
        .unwrap()
        .into_jobs("list_jobs")
        .unwrap();
    assert_eq!(rows(&browser.apply_list(first.seq, Ok(older))), vec![50, 42]);
}

/// API errors surface as an error descriptor with the token redacted; the
/// page is left alone.
#[tokio::test]
async fn test_api_error_becomes_error_view() {
    let transport = Replay::new(&[PAGE_ONE, r#"{"error":"database is busy"}"#]);
    let mut browser = browser(transport, "");

    browser.refresh().await;
    match browser.refresh().await {
        ConsoleView::Error(error) => {
            assert_eq!(error.endpoint, "list_jobs");
            assert_eq!(error.message, "database is busy");
            assert!(error.request.contains("(omitted)"));
            assert!(!error.request.contains(&ticket_for("")));
        }
        other => panic!("expected an error view, got {other:?}"),
    }
    assert_eq!(rows(&browser.current_view()), vec![50, 42]);
}

/// Drill-down returns the stump first with its subjobs, logs collected from
/// private fields, and stack dumps offered only to administrators on error
/// rows.
#[tokio::test]
async fn test_job_details_hierarchy_and_role_gating() {
    const DETAILS: &str = r#"{
        "id":[100,101,102],
        "ctime":[1000.0,1001.0,1002.0],
        "done":[1,1,-3],
        "queue":[0,0,0],
        "stump":[100,100,100],
        "data":[
            "{\"summary_\":\"2 of 3 steps ok\",\"products_\":[\"/out/a.csv\"],\"filename\":\"u.zip\"}",
            "{\"log_\":\"resolved 8 tags\"}",
            "{\"log_\":\"exploded\"}"
        ]
    }"#;

    // Administrator sees the stack-dump link on the failed subjob.
    let transport = Replay::new(&[DETAILS]);
    let mut admin = browser(transport, "administrator");
    match admin.job_details(JobId::new(100)).await {
        ConsoleView::JobDetails(view) => {
            assert_eq!(view.stump_id, JobId::new(100));
            assert_eq!(view.summary.as_deref(), Some("2 of 3 steps ok"));
            assert_eq!(view.rows.len(), 3);
            assert!(!view.rows[0].stack_dump_available);
            assert!(view.rows[2].stack_dump_available);
            assert_eq!(view.logs.len(), 2);
            assert_eq!(view.products[0].name, "a.csv");
            assert_eq!(
                view.rows[0].params,
                vec![("filename".to_string(), "u.zip".to_string())]
            );
        }
        other => panic!("expected details, got {other:?}"),
    }

    // A plain user gets the same hierarchy without the dump link.
    let transport = Replay::new(&[DETAILS]);
    let mut plain = browser(transport, "");
    match plain.job_details(JobId::new(100)).await {
        ConsoleView::JobDetails(view) => {
            assert!(!view.rows[2].stack_dump_available);
        }
        other => panic!("expected details, got {other:?}"),
    }
}

/// The drill-down request selects the stump with subjobs, id ascending.
#[tokio::test]
async fn test_job_details_request_shape() {
    let transport = Replay::new(&[r#"{"id":[7],"done":[1]}"#]);
    let mut browser = browser(transport.clone(), "");
    browser.job_details(JobId::new(7)).await;

    let (endpoint, payload) = transport.request(0);
    assert_eq!(endpoint, "list_jobs");
    assert_eq!(payload["select"]["stump"], 7);
    assert_eq!(payload["options"]["includeSubjobs"], true);
    assert_eq!(payload["order"]["sortBy"], "id");
    assert_eq!(payload["order"]["sortDesc"], false);
}

/// Stack dumps are refused outright for non-administrators.
#[tokio::test]
async fn test_stack_dump_requires_admin() {
    let transport = Replay::new(&[]);
    let browser = browser(transport, "");
    assert!(browser.stack_dump(JobId::new(5)).await.is_err());
}

#[tokio::test]
async fn test_stack_dump_for_admin() {
    let transport = Replay::new(&[
        r#"{"jobID":5,"URL":"https://example.org/dumps/5.rds","path":"/dumps/5.rds","size":1234}"#,
    ]);
    let browser = browser(transport, "administrator");
    match browser.stack_dump(JobId::new(5)).await.unwrap() {
        ConsoleView::StackDump(dump) => {
            assert_eq!(dump.job_id, JobId::new(5));
            assert_eq!(dump.size, 1234);
        }
        other => panic!("expected a stack dump, got {other:?}"),
    }
}

/// A second retry for the same job before the reply lands is refused; a
/// different job is fine, and the slot frees once the reply arrives.
#[tokio::test]
async fn test_retry_disable_on_submit() {
    let transport = Replay::new(&[
        r#"{"jobs":{"jobID":[5,6]},"reply":"requeued"}"#,
        r#"{"jobs":{"jobID":[5,6]},"reply":"requeued"}"#,
    ]);
    let mut browser = browser(transport, "administrator");

    browser.begin_retry(JobId::new(5)).unwrap();
    assert!(browser.begin_retry(JobId::new(5)).is_err());
    browser.begin_retry(JobId::new(6)).unwrap();

    // Reply lands: slot frees, manifest renders.
    let reply = serde_json::json!({"jobs":{"jobID":[5,6]},"reply":"requeued"});
    let reply: jobdeck_client::RetryReply = serde_json::from_value(reply).unwrap();
    match browser.finish_retry(JobId::new(5), Ok(reply)) {
        ConsoleView::RetryReply(view) => {
            assert!(view.message.contains("5, 6"));
            assert!(view.message.contains("requeued"));
        }
        other => panic!("expected retry reply, got {other:?}"),
    }
    browser.begin_retry(JobId::new(5)).unwrap();
}

/// retry_job end to end: an API error lands in the reply slot, not the
/// error box.
#[tokio::test]
async fn test_retry_api_error_shown_in_reply() {
    let transport = Replay::new(&[r#"{"error":"job 9 has no errors to retry"}"#]);
    let mut browser = browser(transport, "administrator");
    match browser.retry_job(JobId::new(9), Some("please")).await.unwrap() {
        ConsoleView::RetryReply(view) => {
            assert_eq!(view.message, "job 9 has no errors to retry");
        }
        other => panic!("expected retry reply, got {other:?}"),
    }
}

/// Selecting a filter reissues the query with the filter applied and the
/// ticket attached.
#[tokio::test]
async fn test_select_by_project_request_shape() {
    let transport = Replay::new(&[PAGE_ONE]);
    let mut browser = browser(transport.clone(), "");
    browser.select(Selector::ByProject("47".into())).await;

    let (_, payload) = transport.request(0);
    assert_eq!(payload["select"]["projectID"], "47");
    assert_eq!(payload["options"]["includeUnknownProjects"], false);
    assert_eq!(payload["authToken"], ticket_for(""));
}

/// NearId navigation seeds the cursor ten below the target.
#[tokio::test]
async fn test_near_id_request_shape() {
    let transport = Replay::new(&[PAGE_ONE]);
    let mut browser = browser(transport.clone(), "");
    browser.select(Selector::NearId(JobId::new(100))).await;

    let (_, payload) = transport.request(0);
    assert!(payload.get("select").is_none());
    assert_eq!(payload["order"]["sortBy"], "id");
    assert_eq!(payload["order"]["sortDesc"], false);
    assert_eq!(payload["order"]["lastKey"], serde_json::json!([90]));
    assert_eq!(payload["order"]["forwardFromKey"], true);
}
