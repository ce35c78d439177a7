//! # jobdeck-commons
//!
//! Shared types for the jobdeck status console.
//!
//! This crate provides the foundational models used across all jobdeck crates
//! (jobdeck-ticket, jobdeck-auth, jobdeck-client, jobdeck-browser). It keeps
//! external dependencies to serde only, to prevent circular dependency issues.
//!
//! ## Type-Safe Wrappers
//!
//! The crate provides type-safe wrappers for common identifiers:
//! - `JobId`: numeric job identifier
//! - `ProjectId`: project identifier (the token unit carried by access tickets)
//! - `UserId`: upstream user identifier
//!
//! ## Core Models
//!
//! - `Job`: one row of the job table, converted from the upstream
//!   column-oriented wire shape
//! - `JobStatus`: decoded status (`Waiting` / `Running` / `Ok` / `Error`)
//! - `Selector`: the mutually-exclusive filter narrowing the job list
//! - `SortSpec` / `SortField`: sort order for job listings
//! - `PaginationCursor` / `KeyScalar`: keyset pagination state

pub mod models;

pub use models::{
    Job, JobData, JobId, JobStatus, KeyScalar, PaginationCursor, ProjectId, Selector, SortField,
    SortSpec, UserId,
};
