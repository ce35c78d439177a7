//! Maintenance / debugging subcommands.

pub mod debug;
