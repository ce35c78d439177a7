//! # jobdeck-browser
//!
//! The browsing half of the console: per-session query state and the
//! controller that turns user actions (sort click, filter submit, page
//! navigation, drill-down, retry) into deterministic API queries and
//! reconciles the asynchronous, possibly error-bearing replies.
//!
//! All state is per session; nothing is shared across sessions and nothing
//! is mutated in place across a query — each action rebuilds the request
//! from scratch, so replaying an action is idempotent. The controller emits
//! display-ready [`ConsoleView`] values; rendering them is the caller's
//! problem.

pub mod controller;
pub mod cursor;
pub mod error;
pub mod view;

pub use controller::{JobBrowser, PreparedList};
pub use cursor::{row_key, transition, Navigation};
pub use error::BrowserError;
pub use view::{
    ConsoleView, DeploymentRow, ErrorView, FileCountRow, FileRow, JobDetailsView, JobListView,
    JobRow, LogEntry, ProductLink, ReceiverFilesView, ReceiverInfoView, RetryReplyView,
    StackDumpView, SubjobRow,
};
