//! Job-list filter criteria.

use super::{JobId, ProjectId, UserId};
use serde::{Deserialize, Serialize};

/// The mutually-exclusive criterion narrowing the job list.
///
/// Exactly one variant is active at a time. When a caller manages to set
/// several (e.g. a job ID and a project filter survive in session state), the
/// query builder applies a fixed precedence:
/// `ById > NearId > ByUser > ByProject > ByType > ByLogSubstring > None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Selector {
    /// No filter; list all jobs.
    None,
    /// Jobs belonging to one upstream user.
    ByUser(UserId),
    /// Jobs belonging to one project.
    ByProject(ProjectId),
    /// The single job with this ID.
    ById(JobId),
    /// Jobs with IDs near this one; the listing is forced to ascending
    /// `id` order seeded ten below the target.
    NearId(JobId),
    /// Jobs of one type (e.g. "uploadProcess").
    ByType(String),
    /// Jobs whose log contains this text anywhere.
    ByLogSubstring(String),
}

impl Selector {
    pub fn is_none(&self) -> bool {
        matches!(self, Selector::None)
    }
}

impl Default for Selector {
    fn default() -> Self {
        Selector::None
    }
}
