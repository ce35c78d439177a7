//! Display-ready view data.
//!
//! The controller emits these; the external renderer turns them into markup
//! or whatever else. Everything here is plain serializable data with the
//! status codes already decoded and private fields already stripped.

use jobdeck_client::wire::{ReceiverFiles, ReceiverInfo, StackDump};
use jobdeck_client::QueryError;
use jobdeck_commons::{Job, JobId, JobStatus, ProjectId, Selector, SortSpec};
use serde::Serialize;

/// Everything the console can show.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ConsoleView {
    JobList(JobListView),
    /// Zero matches with nothing on screen ("No jobs found!").
    NoMatches,
    JobDetails(JobDetailsView),
    ReceiverInfo(ReceiverInfoView),
    ReceiverFiles(ReceiverFilesView),
    StackDump(StackDumpView),
    RetryReply(RetryReplyView),
    Error(ErrorView),
}

/// One row of the summary job table.
#[derive(Debug, Clone, Serialize)]
pub struct JobRow {
    pub id: JobId,
    pub ctime: Option<f64>,
    pub mtime: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Aggregate status over the job's subjobs.
    pub status: JobStatus,
    pub project_id: Option<ProjectId>,
    /// Public parameters, private keys already excluded.
    pub params: Vec<(String, String)>,
}

impl JobRow {
    fn from_job(job: &Job) -> Self {
        Self {
            id: job.id,
            ctime: job.ctime,
            mtime: job.mtime,
            kind: job.kind.clone(),
            status: job.aggregate_status(),
            project_id: job.project_id.clone(),
            params: job.data.as_ref().map(|d| d.params()).unwrap_or_default(),
        }
    }
}

/// The summary listing plus the state it was produced under, so the
/// renderer can mark the sorted column and the active filter.
#[derive(Debug, Clone, Serialize)]
pub struct JobListView {
    pub rows: Vec<JobRow>,
    pub sort: SortSpec,
    pub selector: Selector,
    pub error_only: bool,
}

impl JobListView {
    pub fn new(page: &[Job], sort: SortSpec, selector: Selector, error_only: bool) -> Self {
        Self {
            rows: page.iter().map(JobRow::from_job).collect(),
            sort,
            selector,
            error_only,
        }
    }
}

/// One subjob row in the drill-down view.
#[derive(Debug, Clone, Serialize)]
pub struct SubjobRow {
    pub id: JobId,
    pub ctime: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// This job's own status (not the subjob aggregate).
    pub status: JobStatus,
    pub params: Vec<(String, String)>,
    /// True when the row is an error an administrator may pull a stack
    /// dump for.
    pub stack_dump_available: bool,
}

/// One job's accumulated log text.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub job_id: JobId,
    pub message: String,
}

/// A product file attached to the stump job.
#[derive(Debug, Clone, Serialize)]
pub struct ProductLink {
    pub link: String,
    /// Basename of the link, for display.
    pub name: String,
}

/// Parent/children hierarchy for one stump job.
#[derive(Debug, Clone, Serialize)]
pub struct JobDetailsView {
    pub stump_id: JobId,
    pub summary: Option<String>,
    pub rows: Vec<SubjobRow>,
    pub logs: Vec<LogEntry>,
    pub products: Vec<ProductLink>,
}

impl JobDetailsView {
    /// Assemble from a stump-ordered batch (parent first, id ascending).
    pub fn from_batch(jobs: &[Job], admin: bool) -> Option<Self> {
        let parent = jobs.first()?;
        let rows = jobs
            .iter()
            .map(|job| {
                let status = job.status();
                SubjobRow {
                    id: job.id,
                    ctime: job.ctime,
                    kind: job.kind.clone(),
                    status,
                    params: job.data.as_ref().map(|d| d.params()).unwrap_or_default(),
                    stack_dump_available: admin && status.is_error(),
                }
            })
            .collect();
        let logs = jobs
            .iter()
            .filter_map(|job| {
                let message = job.data.as_ref()?.log()?;
                Some(LogEntry {
                    job_id: job.id,
                    message: message.to_string(),
                })
            })
            .collect();
        let products = parent
            .data
            .as_ref()
            .map(|d| d.products())
            .unwrap_or_default()
            .into_iter()
            .map(|link| {
                let name = link.rsplit('/').next().unwrap_or(&link).to_string();
                ProductLink { link, name }
            })
            .collect();
        Some(Self {
            stump_id: parent.id,
            summary: parent
                .data
                .as_ref()
                .and_then(|d| d.summary())
                .map(str::to_string),
            rows,
            logs,
            products,
        })
    }
}

/// One receiver deployment row.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentRow {
    pub project_id: Option<ProjectId>,
    pub ts_start: Option<f64>,
    pub ts_end: Option<f64>,
    pub status: Option<String>,
}

/// Per-day file counts; a filesystem/database mismatch is flagged for the
/// renderer.
#[derive(Debug, Clone, Serialize)]
pub struct FileCountRow {
    pub day: String,
    pub count_fs: i64,
    pub count_db: i64,
    pub mismatch: bool,
}

/// Receiver summary: device info, deployments, and daily file counts.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiverInfoView {
    pub serno: String,
    pub device_id: Option<i64>,
    pub receiver_type: Option<String>,
    pub deployments: Vec<DeploymentRow>,
    pub file_counts: Vec<FileCountRow>,
}

impl ReceiverInfoView {
    pub fn new(info: ReceiverInfo, files: ReceiverFiles) -> Self {
        let d = info.deployments;
        let n = d.ts_start.len().max(d.ts_end.len()).max(d.project_id.len());
        let deployments = (0..n)
            .map(|i| DeploymentRow {
                project_id: d.project_id.get(i).cloned().flatten(),
                ts_start: d.ts_start.get(i).copied().flatten(),
                ts_end: d.ts_end.get(i).copied().flatten(),
                status: d.status.get(i).cloned().flatten(),
            })
            .collect();
        let file_counts = files
            .file_counts
            .map(|c| {
                (0..c.day.len())
                    .map(|i| {
                        let count_fs = c.count_fs.get(i).copied().unwrap_or(0);
                        let count_db = c.count_db.get(i).copied().unwrap_or(0);
                        FileCountRow {
                            day: c.day[i].clone(),
                            count_fs,
                            count_db,
                            mismatch: count_fs != count_db,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            serno: info.serno,
            device_id: info.device_id,
            receiver_type: info.receiver_type,
            deployments,
            file_counts,
        }
    }
}

/// One file on a receiver for one day.
#[derive(Debug, Clone, Serialize)]
pub struct FileRow {
    pub name: String,
    pub size: Option<i64>,
    /// Job that ingested the file, when known; links back to the job view.
    pub job_id: Option<JobId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiverFilesView {
    pub serno: String,
    pub day: Option<String>,
    pub files: Vec<FileRow>,
}

impl ReceiverFilesView {
    pub fn new(files: ReceiverFiles) -> Self {
        let rows = files
            .file_details
            .map(|d| {
                (0..d.name.len())
                    .map(|i| FileRow {
                        name: d.name[i].clone(),
                        size: d.size.get(i).copied().flatten(),
                        job_id: d.job_id.get(i).copied().flatten().map(JobId::new),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            serno: files.serno,
            day: files.day,
            files: rows,
        }
    }
}

/// Stack-dump download descriptor for a failed job.
#[derive(Debug, Clone, Serialize)]
pub struct StackDumpView {
    pub job_id: JobId,
    pub url: String,
    pub path: String,
    pub size: u64,
}

impl From<StackDump> for StackDumpView {
    fn from(dump: StackDump) -> Self {
        Self {
            job_id: dump.job_id,
            url: dump.url,
            path: dump.path,
            size: dump.size,
        }
    }
}

/// Reply line shown in the retry dialog.
#[derive(Debug, Clone, Serialize)]
pub struct RetryReplyView {
    pub message: String,
}

/// Error descriptor forwarded to the renderer. Carries the diagnostic
/// context an operator needs; the access token is already redacted and the
/// ticket digest never appears.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub endpoint: String,
    pub message: String,
    /// The request payload, token redacted.
    pub request: String,
}

impl From<QueryError> for ErrorView {
    fn from(err: QueryError) -> Self {
        Self {
            endpoint: err.endpoint().to_string(),
            message: err.message().to_string(),
            request: err.payload().to_string(),
        }
    }
}
