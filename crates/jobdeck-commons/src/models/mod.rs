//! Core data models for the jobdeck console.

mod cursor;
mod ids;
mod job;
mod selector;
mod sort;

pub use cursor::{KeyScalar, PaginationCursor};
pub use ids::{JobId, ProjectId, UserId};
pub use job::{Job, JobData, JobStatus};
pub use selector::Selector;
pub use sort::{SortField, SortSpec};
