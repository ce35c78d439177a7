//! # jobdeck-client
//!
//! Client side of the upstream job-status API.
//!
//! Three pieces:
//! - `query`: the pure request builder turning `{selector, sort, cursor,
//!   options}` into a normalized, immutable API request
//! - `wire`: the upstream wire shapes — requests as they serialize, and the
//!   column-oriented `list_jobs` reply converted to row-oriented [`Job`]
//!   records at the boundary
//! - `client`: the transport (`POST <base>/<endpoint>` with a single `json`
//!   form field), ticket attachment, and outcome classification
//!   (success / API error / transport error / stale)
//!
//! [`Job`]: jobdeck_commons::Job

pub mod client;
pub mod error;
pub mod query;
pub mod wire;

pub use client::{
    classify_list, Endpoint, HttpStatusTransport, ListOutcome, StatusClient, StatusTransport,
};
pub use error::{QueryError, Result};
pub use query::{build, build_details, QueryOptions, SelectorSet};
pub use wire::{
    AuthenticateReply, ListJobsReply, ListJobsRequest, ReceiverFiles, ReceiverInfo, RetryReply,
    StackDump,
};
