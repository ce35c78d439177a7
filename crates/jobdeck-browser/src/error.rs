use jobdeck_commons::JobId;
use thiserror::Error;

/// Local guard failures inside the browsing session. These never reach the
/// upstream API; API and transport failures are folded into
/// [`ErrorView`](crate::view::ErrorView) instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    /// A retry for this job was already submitted and has not answered yet
    /// (disable-on-submit discipline).
    #[error("Retry for job {0} already submitted, awaiting reply")]
    RetryPending(JobId),

    /// Stack dumps are reserved for administrator tickets.
    #[error("Stack dumps require the administrator role")]
    NotAuthorized,
}
