//! Job records and status decoding.

use super::{JobId, ProjectId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Decoded job status.
///
/// The upstream API stores a raw status code per job: `0` means not yet run,
/// `1` means finished successfully, anything else is an error. A job with
/// code `0` that has been assigned a positive queue number is running on that
/// queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Waiting,
    Running(i64),
    Ok,
    Error,
}

impl JobStatus {
    /// Decode a raw status code plus queue number.
    pub fn from_code(code: i64, queue: Option<f64>) -> Self {
        match code {
            0 => match queue {
                Some(q) if q > 0.0 => JobStatus::Running(q.round() as i64),
                _ => JobStatus::Waiting,
            },
            1 => JobStatus::Ok,
            _ => JobStatus::Error,
        }
    }

    /// Decode possibly-missing wire fields. A row without a status code
    /// renders as an error, matching the console's historical behavior.
    pub fn from_parts(code: Option<i64>, queue: Option<f64>) -> Self {
        match code {
            Some(c) => Self::from_code(c, queue),
            None => JobStatus::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, JobStatus::Error)
    }
}

/// The opaque per-job parameter blob.
///
/// Stored upstream as a JSON object serialized into the `data` column. Keys
/// ending in `_` are private fields (log text, summary, product links) and
/// are excluded from the generic parameter display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobData(Map<String, Value>);

/// Marker suffix for private keys inside a job's `data` blob.
pub const PRIVATE_KEY_MARKER: char = '_';

impl JobData {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Parse the raw `data` column. Returns `None` for absent, empty, or
    /// non-object payloads.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Some(Self(map)),
            _ => None,
        }
    }

    /// Public parameters, with private (`_`-suffixed) keys excluded.
    /// Values are rendered the way the console prints them: strings bare,
    /// everything else as compact JSON.
    pub fn params(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(k, _)| !k.ends_with(PRIVATE_KEY_MARKER))
            .map(|(k, v)| (k.clone(), render_value(v)))
            .collect()
    }

    /// The job's accumulated log text, if any.
    pub fn log(&self) -> Option<&str> {
        self.0.get("log_").and_then(Value::as_str)
    }

    /// One-line summary of the stump job.
    pub fn summary(&self) -> Option<&str> {
        self.0.get("summary_").and_then(Value::as_str)
    }

    /// Product links attached to the job.
    ///
    /// Upstream auto-unboxes single-element arrays when serializing, so a
    /// lone product arrives as a bare string; normalize both shapes to a
    /// list.
    pub fn products(&self) -> Vec<String> {
        match self.0.get("products_") {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

fn render_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One job row, converted from the upstream column-oriented wire shape.
///
/// Snapshots are immutable: the browser replaces the whole page on each
/// successful query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Creation time, fractional epoch seconds.
    pub ctime: Option<f64>,
    /// Last-modification time, fractional epoch seconds.
    pub mtime: Option<f64>,
    /// Job type, e.g. "uploadProcess".
    pub kind: Option<String>,
    /// Processing queue the job was assigned to, when any.
    pub queue: Option<f64>,
    /// Raw status code of this job itself.
    pub done: Option<i64>,
    /// Aggregate status code over the job's subjobs.
    pub sj_done: Option<i64>,
    /// Parameter blob; `None` when the wire value was null or malformed.
    pub data: Option<JobData>,
    /// ID of the top-level ("stump") job this row belongs to.
    pub stump: Option<JobId>,
    pub project_id: Option<ProjectId>,
}

impl Job {
    /// Status of this job alone (detail views).
    pub fn status(&self) -> JobStatus {
        JobStatus::from_parts(self.done, self.queue)
    }

    /// Aggregate status over subjobs (summary listings). Falls back to the
    /// job's own code when no aggregate was computed.
    pub fn aggregate_status(&self) -> JobStatus {
        JobStatus::from_parts(self.sj_done.or(self.done), self.queue)
    }
}
