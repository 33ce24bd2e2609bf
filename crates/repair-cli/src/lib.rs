//! Repair Simulator CLI Library
//!
//! Command handlers behind the `repair-sim` binary, exposed as a library so
//! they can be driven from integration tests.

/// Command handlers for CLI operations
pub mod commands;
