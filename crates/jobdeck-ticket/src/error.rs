use thiserror::Error;

/// Errors from ticket parsing and verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// The serialized form is structurally wrong (too short, non-hex digest
    /// or timestamp).
    #[error("Invalid ticket: {0}")]
    InvalidTicket(String),

    /// The ticket parsed but its digest does not match a recomputation with
    /// the shared secret. Treat the cookie as absent.
    #[error("Ticket digest mismatch")]
    TicketForged,
}

/// Result type for ticket operations.
pub type Result<T> = std::result::Result<T, TicketError>;
