//! # jobdeck-ticket
//!
//! Signed, stateless access tickets for the jobdeck console.
//!
//! A ticket proves a prior successful login and carries the holder's
//! authorized project tokens. It travels as an opaque cookie and is
//! re-verifiable by any process sharing the secret — no server-side session
//! state. The digest scheme is bit-compatible with the Apache `mod_auth_tkt`
//! cookie format, so an existing front-end configured with the same secret
//! accepts tickets issued here and vice versa.
//!
//! The codec deliberately does not enforce ticket expiry; the caller owns
//! the max-age policy (see `jobdeck-auth`).

pub mod codec;
pub mod error;

pub use codec::{parse, parse_role, verify, AccessTicket, ParsedTicket, TicketCodec};
pub use error::{Result, TicketError};
