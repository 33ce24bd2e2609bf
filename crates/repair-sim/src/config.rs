//! Sweep configuration
//!
//! A sweep is the cross product of algorithms, fault kinds and availability
//! probabilities, with a fixed number of trials per cell. Configuration can
//! come from TOML or be assembled with the `with_*` builders.

use crate::error::{Result, SimError};
use crate::fault::{FaultKind, FaultModel, Probability};
use crate::repair::{RepairAlgorithm, RepairParams};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default trials per cell
pub const DEFAULT_TRIALS: u64 = 1_000;

/// Default safety bound on contacts per repair attempt
pub const DEFAULT_MAX_CONTACTS: u64 = 10_000;

/// Parameters for one experiment sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Availability levels, swept in the given order
    pub probabilities: Vec<Probability>,
    /// Fault kinds, swept in the given order
    pub fault_kinds: Vec<FaultKind>,
    /// Algorithms to compare
    pub algorithms: Vec<RepairAlgorithm>,
    /// Trials per cell
    pub trials: u64,
    /// Contact budget per repair attempt
    pub max_contacts: u64,
    /// Root seed; every cell derives its own stream from it
    pub seed: u64,
    /// Run trials of a cell on the rayon pool
    pub parallel: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            probabilities: Probability::default_sweep(),
            fault_kinds: FaultKind::ALL.to_vec(),
            algorithms: RepairAlgorithm::ALL.to_vec(),
            trials: DEFAULT_TRIALS,
            max_contacts: DEFAULT_MAX_CONTACTS,
            seed: 0,
            parallel: true,
        }
    }
}

impl SweepConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| SimError::io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&input)
    }

    /// Check the sweep is non-empty and the budget is usable
    pub fn validate(&self) -> Result<()> {
        if self.probabilities.is_empty() {
            return Err(SimError::config("at least one probability is required"));
        }
        if self.fault_kinds.is_empty() {
            return Err(SimError::config("at least one fault kind is required"));
        }
        if self.algorithms.is_empty() {
            return Err(SimError::config("at least one algorithm is required"));
        }
        if self.trials == 0 {
            return Err(SimError::config("trials must be positive"));
        }
        if self.max_contacts == 0 {
            return Err(SimError::config("max_contacts must be positive"));
        }
        Ok(())
    }

    /// Set the availability levels
    pub fn with_probabilities<I>(mut self, probabilities: I) -> Self
    where
        I: IntoIterator<Item = Probability>,
    {
        self.probabilities = probabilities.into_iter().collect();
        self
    }

    /// Set the fault kinds
    pub fn with_fault_kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = FaultKind>,
    {
        self.fault_kinds = kinds.into_iter().collect();
        self
    }

    /// Set the algorithms
    pub fn with_algorithms<I>(mut self, algorithms: I) -> Self
    where
        I: IntoIterator<Item = RepairAlgorithm>,
    {
        self.algorithms = algorithms.into_iter().collect();
        self
    }

    /// Set trials per cell
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    /// Set the contact budget
    pub fn with_max_contacts(mut self, max_contacts: u64) -> Self {
        self.max_contacts = max_contacts;
        self
    }

    /// Set the root seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable parallel trials
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Number of cells in the sweep
    pub fn cell_count(&self) -> usize {
        self.probabilities.len() * self.fault_kinds.len() * self.algorithms.len()
    }

    /// Whether any configured algorithm reads the registry indices
    pub fn needs_index(&self) -> bool {
        self.algorithms.iter().any(|a| a.needs_index())
    }

    /// Per-attempt parameters for one cell
    pub fn repair_params(&self, kind: FaultKind, probability: Probability) -> Result<RepairParams> {
        RepairParams::new(FaultModel::new(kind, probability), self.max_contacts)
    }
}
