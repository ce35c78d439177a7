//! Upstream wire shapes.
//!
//! The status API speaks JSON with a quirk: `list_jobs` replies are
//! column-oriented — one array per field, index-aligned across fields —
//! rather than row-oriented. That shape is preserved here at the boundary
//! and converted to row-oriented [`Job`] records immediately on receipt;
//! nothing past this module sees a column.

use crate::error::QueryError;
use jobdeck_commons::{Job, JobData, JobId, PaginationCursor, ProjectId, SortSpec, UserId};
use serde::{Deserialize, Serialize};

/// The `select` member of a `list_jobs` request: exactly one criterion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SelectSpec {
    User {
        #[serde(rename = "userID")]
        user_id: UserId,
    },
    Project {
        #[serde(rename = "projectID")]
        project_id: ProjectId,
    },
    Job {
        #[serde(rename = "jobID")]
        job_id: JobId,
    },
    Type {
        #[serde(rename = "type")]
        kind: String,
    },
    /// Log text match; the value carries `*` wildcard markers.
    Log { log: String },
    /// A top-level job together with all its subjobs.
    Stump { stump: JobId },
}

/// The `order` member: sort spec plus keyset cursor, flattened to the wire
/// field names (`sortBy`, `sortDesc`, `lastKey`, `forwardFromKey`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSpec {
    #[serde(flatten)]
    pub sort: SortSpec,
    #[serde(flatten)]
    pub cursor: PaginationCursor,
}

/// The `options` member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireOptions {
    #[serde(rename = "includeUnknownProjects")]
    pub include_unknown_projects: bool,
    pub full: bool,
    #[serde(rename = "errorOnly")]
    pub error_only: bool,
    #[serde(rename = "maxRows", skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u32>,
    #[serde(rename = "includeSubjobs", skip_serializing_if = "Option::is_none")]
    pub include_subjobs: Option<bool>,
}

/// One normalized, immutable `list_jobs` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListJobsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<SelectSpec>,
    pub order: OrderSpec,
    pub options: WireOptions,
}

/// Column-oriented `list_jobs` reply. Every field is index-aligned with
/// `id`; absent columns deserialize as empty and are treated as all-null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListJobsReply {
    #[serde(default)]
    pub id: Vec<i64>,
    #[serde(default)]
    pub ctime: Vec<Option<f64>>,
    #[serde(default)]
    pub mtime: Vec<Option<f64>>,
    #[serde(rename = "type", default)]
    pub kind: Vec<Option<String>>,
    #[serde(default)]
    pub queue: Vec<Option<f64>>,
    #[serde(default)]
    pub done: Vec<Option<i64>>,
    #[serde(rename = "sjDone", default)]
    pub sj_done: Vec<Option<i64>>,
    #[serde(default)]
    pub data: Vec<Option<String>>,
    #[serde(default)]
    pub stump: Vec<Option<i64>>,
    #[serde(rename = "projectID", default)]
    pub project_id: Vec<Option<ProjectId>>,
}

impl ListJobsReply {
    /// Convert columns to row-oriented job records.
    ///
    /// Columns must either be empty (treated as all-null) or match the `id`
    /// column's length; a misaligned reply is reported rather than silently
    /// truncated.
    pub fn into_jobs(self, endpoint: &str) -> Result<Vec<Job>, QueryError> {
        let n = self.id.len();
        check_len("ctime", self.ctime.len(), n, endpoint)?;
        check_len("mtime", self.mtime.len(), n, endpoint)?;
        check_len("type", self.kind.len(), n, endpoint)?;
        check_len("queue", self.queue.len(), n, endpoint)?;
        check_len("done", self.done.len(), n, endpoint)?;
        check_len("sjDone", self.sj_done.len(), n, endpoint)?;
        check_len("data", self.data.len(), n, endpoint)?;
        check_len("stump", self.stump.len(), n, endpoint)?;
        check_len("projectID", self.project_id.len(), n, endpoint)?;

        let jobs = (0..n)
            .map(|i| Job {
                id: JobId::new(self.id[i]),
                ctime: col(&self.ctime, i),
                mtime: col(&self.mtime, i),
                kind: col(&self.kind, i),
                queue: col(&self.queue, i),
                done: col(&self.done, i),
                sj_done: col(&self.sj_done, i),
                data: col(&self.data, i).and_then(|raw| JobData::parse(&raw)),
                stump: col(&self.stump, i).map(JobId::new),
                project_id: col(&self.project_id, i),
            })
            .collect();
        Ok(jobs)
    }
}

fn col<T: Clone>(column: &[Option<T>], i: usize) -> Option<T> {
    column.get(i).cloned().flatten()
}

fn check_len(name: &str, len: usize, expected: usize, endpoint: &str) -> Result<(), QueryError> {
    if len != 0 && len != expected {
        return Err(QueryError::Transport {
            endpoint: endpoint.to_string(),
            message: format!(
                "misaligned reply: column {} has {} rows, id has {}",
                name, len, expected
            ),
            payload: String::new(),
        });
    }
    Ok(())
}

/// Reply to `retry_job`: the manifest of jobs being retried plus a
/// human-readable reply line.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryReply {
    #[serde(default)]
    pub jobs: RetryManifest,
    #[serde(default)]
    pub reply: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetryManifest {
    #[serde(rename = "jobID", default)]
    pub job_ids: Vec<JobId>,
}

/// Reply to `get_job_stackdump`.
#[derive(Debug, Clone, Deserialize)]
pub struct StackDump {
    #[serde(rename = "jobID")]
    pub job_id: JobId,
    #[serde(rename = "URL")]
    pub url: String,
    pub path: String,
    #[serde(default)]
    pub size: u64,
}

/// Reply to `get_receiver_info`. Deployments arrive column-oriented like
/// job listings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiverInfo {
    pub serno: String,
    #[serde(rename = "deviceID", default)]
    pub device_id: Option<i64>,
    #[serde(rename = "receiverType", default)]
    pub receiver_type: Option<String>,
    #[serde(default)]
    pub deployments: Deployments,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Deployments {
    #[serde(rename = "projectID", default)]
    pub project_id: Vec<Option<ProjectId>>,
    #[serde(rename = "tsStart", default)]
    pub ts_start: Vec<Option<f64>>,
    #[serde(rename = "tsEnd", default)]
    pub ts_end: Vec<Option<f64>>,
    #[serde(default)]
    pub status: Vec<Option<String>>,
}

/// Reply to `list_receiver_files`: per-day counts when called without a
/// day, per-file details when called with one.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiverFiles {
    pub serno: String,
    #[serde(default)]
    pub day: Option<String>,
    #[serde(rename = "fileCounts", default)]
    pub file_counts: Option<FileCounts>,
    #[serde(rename = "fileDetails", default)]
    pub file_details: Option<FileDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileCounts {
    #[serde(default)]
    pub day: Vec<String>,
    /// Files present on the filesystem.
    #[serde(rename = "countFS", default)]
    pub count_fs: Vec<i64>,
    /// Files recorded in the database.
    #[serde(rename = "countDB", default)]
    pub count_db: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileDetails {
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub size: Vec<Option<i64>>,
    #[serde(rename = "jobID", default)]
    pub job_id: Vec<Option<i64>>,
}

/// Reply to `authenticate_user`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticateReply {
    #[serde(rename = "userID", default)]
    pub user_id: Option<i64>,
    #[serde(rename = "authToken")]
    pub auth_token: String,
}
