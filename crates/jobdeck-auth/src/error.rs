use jobdeck_ticket::TicketError;
use thiserror::Error;

/// Errors from the login gate and ticket extraction.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The identity service could not be reached or answered garbage at the
    /// transport level. Shown as a generic outage, details go to the log.
    #[error("Identity service unavailable: {0}")]
    IdentityServiceUnavailable(String),

    /// Credentials were rejected (or the response was undecodable, which the
    /// gate treats the same way). Recovered locally with a user-facing
    /// message; internals are never surfaced.
    #[error("Invalid login")]
    InvalidCredentials,

    /// The presented ticket is structurally broken or fails its digest
    /// check. Fatal to the session: treat the cookie as absent.
    #[error(transparent)]
    Ticket(#[from] TicketError),

    /// The ticket is authentic but older than the configured max age.
    /// Treated like an absent cookie.
    #[error("Ticket expired")]
    TicketExpired,
}

/// Result type for auth operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;
