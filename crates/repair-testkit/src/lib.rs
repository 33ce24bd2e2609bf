//! Repair Simulator Testing Infrastructure
//!
//! Shared fixtures, proptest strategies and assertion helpers for the
//! repair-sim test suites and benches.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! repair-testkit = { workspace = true }
//! ```
//!
//! ```rust,no_run
//! use repair_testkit::*;
//! use repair_sim::{FaultKind, ParticipantId, RepairAlgorithm};
//!
//! let registry = fano_registry();
//! let (report, target) = run_single(
//!     &registry,
//!     RepairAlgorithm::StoredGrouping,
//!     ParticipantId(0),
//!     &params(FaultKind::Transient, 1.0),
//!     7,
//! );
//! assert_repaired!(report);
//! assert_no_self_contact(&report, target.id());
//! ```

pub mod assertions;
pub mod fixtures;
pub mod strategies;

pub use assertions::*;
pub use fixtures::*;
