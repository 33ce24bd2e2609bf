//! Experiment runner
//!
//! Sweeps algorithm × fault kind × probability over one registry. Each trial
//! owns its RNG stream, its registry view and its repair target, so trials
//! can run on the rayon pool in any order and still produce the same numbers
//! as a sequential run.

use crate::clock::{Timing, TrialClock};
use crate::config::SweepConfig;
use crate::design::BlockDesign;
use crate::error::{Result, SimError};
use crate::fault::{FaultKind, Probability};
use crate::ids::ParticipantId;
use crate::registry::ParticipantRegistry;
use crate::repair::{RepairAlgorithm, RepairParams, RepairReport};
use crate::results::{CellReport, ExperimentReport, TrialResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, info_span};

/// One point of the sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Algorithm under test
    pub algorithm: RepairAlgorithm,
    /// Fault kind applied to every contact
    pub fault_kind: FaultKind,
    /// Availability probability
    pub probability: Probability,
}

impl Cell {
    /// Seed shared by every trial of this cell; trials differ by ChaCha stream.
    pub fn seed(&self, root: u64) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"repair-sim/cell/v1");
        hasher.update(&root.to_le_bytes());
        hasher.update(self.algorithm.name().as_bytes());
        hasher.update(self.fault_kind.as_str().as_bytes());
        hasher.update(&self.probability.value().to_bits().to_le_bytes());
        *hasher.finalize().as_bytes()
    }

    /// RNG for one trial of this cell
    pub fn trial_rng(&self, root: u64, trial: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::from_seed(self.seed(root));
        rng.set_stream(trial);
        rng
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / p={}",
            self.algorithm, self.fault_kind, self.probability
        )
    }
}

/// Runs sweeps against a borrowed registry
#[derive(Debug, Clone)]
pub struct ExperimentRunner<'r> {
    registry: &'r ParticipantRegistry,
    config: SweepConfig,
}

impl<'r> ExperimentRunner<'r> {
    /// Validate `config` against `registry`.
    ///
    /// Fails before any trial runs if the config is unusable or if an indexed
    /// algorithm is requested on an unindexed registry.
    pub fn new(registry: &'r ParticipantRegistry, config: SweepConfig) -> Result<Self> {
        config.validate()?;
        if registry.is_empty() {
            return Err(SimError::EmptyDesign);
        }
        if config.needs_index() && !registry.is_indexed() {
            return Err(SimError::NotIndexed);
        }
        if u32::try_from(registry.len()).is_err() {
            return Err(SimError::config("registry too large"));
        }
        Ok(Self { registry, config })
    }

    /// The sweep configuration
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// The registry under test
    pub fn registry(&self) -> &'r ParticipantRegistry {
        self.registry
    }

    /// Cells in sweep order: algorithm, then fault kind, then probability
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.config.cell_count());
        for &algorithm in &self.config.algorithms {
            for &fault_kind in &self.config.fault_kinds {
                for &probability in &self.config.probabilities {
                    cells.push(Cell {
                        algorithm,
                        fault_kind,
                        probability,
                    });
                }
            }
        }
        cells
    }

    /// Run every cell
    pub fn run(&self) -> Result<ExperimentReport> {
        let design = self.registry.design();
        let parameters = design.parameters();
        let label = design.label();
        let span = info_span!("design", design = %label, participants = self.registry.len());
        let _guard = span.enter();

        info!(
            %parameters,
            cells = self.config.cell_count(),
            trials = self.config.trials,
            parallel = self.config.parallel,
            "starting sweep"
        );

        let cells = self
            .cells()
            .into_iter()
            .map(|cell| self.run_cell(cell))
            .collect::<Result<Vec<_>>>()?;

        info!("sweep complete");
        Ok(ExperimentReport {
            design: design.name,
            parameters,
            cells,
        })
    }

    /// Run all trials of one cell and fold them
    pub fn run_cell(&self, cell: Cell) -> Result<CellReport> {
        let span = info_span!(
            "cell",
            algorithm = %cell.algorithm,
            fault = %cell.fault_kind,
            p = %cell.probability
        );
        let _guard = span.enter();

        let params = self
            .config
            .repair_params(cell.fault_kind, cell.probability)?;
        let trials = 0..self.config.trials;

        let results: Vec<TrialResult> = if self.config.parallel {
            trials
                .into_par_iter()
                .map(|trial| self.run_trial(cell, &params, trial))
                .collect::<Result<_>>()?
        } else {
            trials
                .map(|trial| self.run_trial(cell, &params, trial))
                .collect::<Result<_>>()?
        };

        let report =
            CellReport::from_trials(cell.algorithm, cell.fault_kind, cell.probability, &results);
        debug!(
            successes = report.successes.count,
            failures = report.failures.count,
            success_avg_contacted = ?report.successes.average_contacted(),
            fail_avg_contacted = ?report.failures.average_contacted(),
            "cell complete"
        );
        Ok(report)
    }

    /// Run one trial and keep only its summary
    pub fn run_trial(&self, cell: Cell, params: &RepairParams, trial: u64) -> Result<TrialResult> {
        let (target, report, timing) = self.trial_report(cell, params, trial)?;
        Ok(TrialResult {
            target,
            outcome: report.outcome,
            contacted: report.contacted,
            timing,
        })
    }

    /// Run one trial and return the full contact trace.
    ///
    /// The target is drawn uniformly from the registry. Timing covers the
    /// repair call only, not the view setup.
    pub fn trial_report(
        &self,
        cell: Cell,
        params: &RepairParams,
        trial: u64,
    ) -> Result<(ParticipantId, RepairReport, Timing)> {
        let mut rng = cell.trial_rng(self.config.seed, trial);
        let count = u32::try_from(self.registry.len())
            .map_err(|_| SimError::config("registry too large"))?;
        let target_id = ParticipantId(rng.gen_range(0..count));

        let mut view = self.registry.view_excluding(target_id)?;
        let mut target = view.target();

        let clock = TrialClock::start();
        let report = cell
            .algorithm
            .repair(&mut view, &mut target, params, &mut rng)?;
        let timing = clock.stop();

        Ok((target_id, report, timing))
    }
}

/// Index a design and run a sweep over it
pub fn run_design(design: &BlockDesign, config: SweepConfig) -> Result<ExperimentReport> {
    let registry = ParticipantRegistry::indexed(design)?;
    ExperimentRunner::new(&registry, config)?.run()
}
