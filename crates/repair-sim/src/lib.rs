//! Share Repair Simulator
//!
//! Participants each hold a block of shares from a combinatorial block design.
//! When one participant loses its shares it must contact peers until every
//! share is recovered. This crate compares three ways of choosing whom to
//! contact, under transient or permanent peer unavailability:
//!
//! - random walk over every participant
//! - random walk over the precomputed intersecting participants
//! - per-share resolution from the precomputed holder lists
//!
//! # Example
//!
//! ```rust,no_run
//! use repair_sim::{catalog, run_design, SweepConfig};
//!
//! let design = catalog::get("7,7,3,3,1").expect("catalogue design");
//! let report = run_design(&design, SweepConfig::default().with_trials(100))?;
//! for cell in &report.cells {
//!     println!(
//!         "{} {} p={} success={:.2}",
//!         cell.algorithm,
//!         cell.fault_kind,
//!         cell.probability,
//!         cell.success_rate()
//!     );
//! }
//! # Ok::<(), repair_sim::SimError>(())
//! ```

pub mod clock;
pub mod config;
pub mod design;
pub mod error;
pub mod fault;
pub mod ids;
pub mod registry;
pub mod repair;
pub mod results;
pub mod runner;
pub mod sink;

pub use config::SweepConfig;
pub use design::{catalog, BlockDesign, DesignParameters};
pub use error::{Result, SimError};
pub use fault::{ContactDecision, FaultKind, FaultModel, Probability};
pub use ids::{ParticipantId, ShareId};
pub use registry::{Participant, ParticipantRegistry, RegistryView, RepairTarget};
pub use repair::{
    Contact, FailureReason, RandomWalk, RepairAlgorithm, RepairOutcome, RepairParams,
    RepairReport, RepairStrategy, StoredGrouping, StoredIntersection,
};
pub use results::{CellReport, ExperimentReport, OutcomeStats, ResultRecord, TrialResult};
pub use runner::{run_design, Cell, ExperimentRunner};
pub use sink::{
    export, write_records, CsvSink, JsonLinesSink, OutputFormat, ResultSink, TableSink,
};
