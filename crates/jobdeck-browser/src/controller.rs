//! The job-browser controller.
//!
//! One `JobBrowser` per authenticated session. All user actions are
//! serialized through `&mut self`, so at most one listing query is
//! outstanding per logical operation; list, drill-down, and retry are
//! independent operations and may overlap at the server level.
//!
//! Reply reconciliation is split from request preparation
//! ([`JobBrowser::prepare_list`] / [`JobBrowser::apply_list`]) so the
//! superseded-reply rule is testable without a network: replies carry the
//! sequence number of their request and are discarded when a newer request
//! was issued meanwhile. The transport does not guarantee arrival order, so
//! arrival order must never decide which page wins.

use crate::cursor::{transition, Navigation};
use crate::error::BrowserError;
use crate::view::{
    ConsoleView, ErrorView, JobDetailsView, JobListView, ReceiverFilesView, ReceiverInfoView,
    RetryReplyView,
};
use jobdeck_client::{classify_list, query, ListOutcome, QueryError, StatusClient};
use jobdeck_client::wire::ListJobsRequest;
use jobdeck_commons::{Job, JobId, PaginationCursor, Selector, SortField, SortSpec};
use std::collections::HashSet;
use std::sync::Arc;

/// A prepared listing query: the sequence number to quote back on
/// completion plus the immutable request.
#[derive(Debug, Clone)]
pub struct PreparedList {
    pub seq: u64,
    pub request: ListJobsRequest,
}

/// Per-session browsing state and orchestration.
pub struct JobBrowser {
    client: Arc<StatusClient>,
    /// Serialized ticket, attached to every call as the access token.
    ticket: String,
    /// Role claim read from the ticket's extra-data slot. Informational
    /// display gating only; the upstream API enforces the real authority.
    role: String,
    selector: Selector,
    sort: SortSpec,
    cursor: PaginationCursor,
    error_only: bool,
    max_rows: Option<u32>,
    /// Most recent successful page; retained as the fallback when a query
    /// returns zero rows.
    page: Vec<Job>,
    /// Sequence number of the most recently issued listing query.
    issued_seq: u64,
    /// Sequence number of the most recently applied reply.
    applied_seq: u64,
    /// Jobs with a retry submitted and not yet answered.
    pending_retries: HashSet<JobId>,
}

impl JobBrowser {
    /// Open a browsing session for a verified ticket.
    ///
    /// `ticket` must already have passed verification; the controller only
    /// reads the (unverified-by-itself) role slot for display gating.
    pub fn new(client: Arc<StatusClient>, ticket: String, max_rows: Option<u32>) -> Self {
        let role = jobdeck_ticket::parse_role(&ticket);
        Self {
            client,
            ticket,
            role,
            selector: Selector::None,
            sort: SortSpec::default(),
            cursor: PaginationCursor::top(),
            error_only: false,
            max_rows,
            page: Vec::new(),
            issued_seq: 0,
            applied_seq: 0,
            pending_retries: HashSet::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "administrator"
    }

    /// The current page as a view, without querying.
    pub fn current_view(&self) -> ConsoleView {
        ConsoleView::JobList(JobListView::new(
            &self.page,
            self.sort,
            self.selector.clone(),
            self.error_only,
        ))
    }

    /// Prepare the next listing query from current state.
    pub fn prepare_list(&mut self) -> PreparedList {
        self.issued_seq += 1;
        let request = query::build(
            &query::SelectorSet::from(self.selector.clone()),
            self.sort,
            &self.cursor,
            query::QueryOptions {
                error_only: self.error_only,
                max_rows: self.max_rows,
                ..Default::default()
            },
        );
        PreparedList {
            seq: self.issued_seq,
            request,
        }
    }

    /// Reconcile a listing reply.
    ///
    /// A reply is applied only if no newer request was issued and no newer
    /// reply was applied; a superseded reply leaves the page untouched and
    /// re-emits the current view.
    pub fn apply_list(
        &mut self,
        seq: u64,
        result: Result<Vec<Job>, QueryError>,
    ) -> ConsoleView {
        if seq < self.issued_seq || seq <= self.applied_seq {
            log::debug!(
                "discarding superseded list reply (seq {}, issued {}, applied {})",
                seq,
                self.issued_seq,
                self.applied_seq
            );
            return self.current_view();
        }
        match result {
            Err(err) => {
                log::warn!("list query failed: {}", err);
                ConsoleView::Error(ErrorView::from(err))
            }
            Ok(jobs) => {
                self.applied_seq = seq;
                match classify_list(jobs, !self.page.is_empty()) {
                    ListOutcome::Page(jobs) => {
                        self.page = jobs;
                        self.current_view()
                    }
                    ListOutcome::Stale => {
                        log::debug!("zero-row reply with a page on screen; keeping prior page");
                        self.current_view()
                    }
                    ListOutcome::NoMatches => ConsoleView::NoMatches,
                }
            }
        }
    }

    /// Run one listing query to completion.
    pub async fn refresh(&mut self) -> ConsoleView {
        let prepared = self.prepare_list();
        let result = self
            .client
            .list_jobs(&prepared.request, &self.ticket)
            .await;
        self.apply_list(prepared.seq, result)
    }

    /// Replace the active filter and re-list.
    pub async fn select(&mut self, selector: Selector) -> ConsoleView {
        self.selector = selector;
        self.refresh().await
    }

    /// Column-header click: same column flips direction and keeps the
    /// cursor; a new column resets to the top, ascending.
    pub async fn sort_by(&mut self, field: SortField) -> ConsoleView {
        if self.sort.field == field {
            self.sort.descending = !self.sort.descending;
        } else {
            self.sort = SortSpec::ascending(field);
            self.cursor = PaginationCursor::top();
        }
        self.refresh().await
    }

    /// Navigate relative to the current page.
    pub async fn navigate(&mut self, nav: Navigation) -> ConsoleView {
        self.cursor = transition(nav, &self.page, self.sort.field);
        self.refresh().await
    }

    /// Toggle the errors-only filter and re-list.
    pub async fn set_error_only(&mut self, error_only: bool) -> ConsoleView {
        self.error_only = error_only;
        self.refresh().await
    }

    /// Drill into one job: the stump plus all its subjobs, id ascending.
    pub async fn job_details(&mut self, id: JobId) -> ConsoleView {
        match self.client.list_subjobs(id, &self.ticket).await {
            Err(err) => ConsoleView::Error(ErrorView::from(err)),
            Ok(jobs) => match JobDetailsView::from_batch(&jobs, self.is_admin()) {
                Some(view) => ConsoleView::JobDetails(view),
                None => ConsoleView::NoMatches,
            },
        }
    }

    /// Receiver summary: device info chained with the daily file counts.
    pub async fn receiver_info(&mut self, serno: &str) -> ConsoleView {
        let info = match self.client.get_receiver_info(serno, &self.ticket).await {
            Ok(info) => info,
            Err(err) => return ConsoleView::Error(ErrorView::from(err)),
        };
        let canonical_serno = info.serno.clone();
        match self
            .client
            .list_receiver_files(&canonical_serno, None, &self.ticket)
            .await
        {
            Ok(files) => ConsoleView::ReceiverInfo(ReceiverInfoView::new(info, files)),
            Err(err) => ConsoleView::Error(ErrorView::from(err)),
        }
    }

    /// One day's files for a receiver.
    pub async fn receiver_files(&mut self, serno: &str, day: &str) -> ConsoleView {
        match self
            .client
            .list_receiver_files(serno, Some(day), &self.ticket)
            .await
        {
            Ok(files) => ConsoleView::ReceiverFiles(ReceiverFilesView::new(files)),
            Err(err) => ConsoleView::Error(ErrorView::from(err)),
        }
    }

    /// Stack-dump descriptor for a failed job. Administrator tickets only;
    /// everyone else sees the plain error indicator and cannot reach this.
    pub async fn stack_dump(&self, job_id: JobId) -> Result<ConsoleView, BrowserError> {
        if !self.is_admin() {
            return Err(BrowserError::NotAuthorized);
        }
        Ok(match self.client.get_job_stackdump(job_id, &self.ticket).await {
            Ok(dump) => ConsoleView::StackDump(dump.into()),
            Err(err) => ConsoleView::Error(ErrorView::from(err)),
        })
    }

    /// Claim the retry slot for a job. Refused when a retry for the same
    /// job is already awaiting its reply (disable-on-submit discipline).
    pub fn begin_retry(&mut self, job_id: JobId) -> Result<(), BrowserError> {
        if !self.pending_retries.insert(job_id) {
            return Err(BrowserError::RetryPending(job_id));
        }
        Ok(())
    }

    /// Release the retry slot and turn the reply into a view.
    pub fn finish_retry(
        &mut self,
        job_id: JobId,
        result: Result<jobdeck_client::RetryReply, QueryError>,
    ) -> ConsoleView {
        self.pending_retries.remove(&job_id);
        match result {
            Ok(reply) => {
                let ids = reply
                    .jobs
                    .job_ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                ConsoleView::RetryReply(RetryReplyView {
                    message: format!("These jobs will be retried: {}\n{}", ids, reply.reply),
                })
            }
            // The retry dialog shows API errors in its reply slot rather
            // than raising the error box.
            Err(QueryError::Api { message, .. }) => {
                ConsoleView::RetryReply(RetryReplyView { message })
            }
            Err(err) => ConsoleView::Error(ErrorView::from(err)),
        }
    }

    /// Submit a failed job for retrying, with an optional operator message.
    ///
    /// At most one retry per job may be in flight: a second submit before
    /// the reply lands is refused rather than duplicated.
    pub async fn retry_job(
        &mut self,
        job_id: JobId,
        message: Option<&str>,
    ) -> Result<ConsoleView, BrowserError> {
        self.begin_retry(job_id)?;
        let result = self.client.retry_job(job_id, message, &self.ticket).await;
        Ok(self.finish_retry(job_id, result))
    }
}
