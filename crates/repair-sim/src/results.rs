//! Aggregated experiment results
//!
//! Trials are collected first and folded afterwards; nothing here is shared
//! between worker threads.

use crate::clock::Timing;
use crate::design::DesignParameters;
use crate::fault::{FaultKind, Probability};
use crate::ids::ParticipantId;
use crate::repair::{FailureReason, RepairAlgorithm, RepairOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Summary of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Participant that was repaired
    pub target: ParticipantId,
    /// How the attempt ended
    pub outcome: RepairOutcome,
    /// Contact attempts made
    pub contacted: u64,
    /// Elapsed time
    pub timing: Timing,
}

impl TrialResult {
    /// Whether the target was repaired
    pub fn success(&self) -> bool {
        self.outcome == RepairOutcome::Repaired
    }
}

/// Totals for one outcome class (successes or failures) of a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeStats {
    /// Number of trials in this class
    pub count: u64,
    /// Sum of contact counts
    pub total_contacted: u64,
    /// Sum of wall-clock time
    pub total_wall: Duration,
    /// Sum of CPU time
    pub total_cpu: Duration,
}

impl OutcomeStats {
    /// Add one trial
    pub fn record(&mut self, trial: &TrialResult) {
        self.count += 1;
        self.total_contacted += trial.contacted;
        self.total_wall += trial.timing.wall;
        self.total_cpu += trial.timing.cpu;
    }

    /// Mean contacts per trial; `None` when the class is empty
    pub fn average_contacted(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total_contacted as f64 / self.count as f64)
    }

    /// Mean wall time per trial
    pub fn average_wall(&self) -> Option<Duration> {
        self.average(self.total_wall)
    }

    /// Mean CPU time per trial
    pub fn average_cpu(&self) -> Option<Duration> {
        self.average(self.total_cpu)
    }

    fn average(&self, total: Duration) -> Option<Duration> {
        let count = u32::try_from(self.count).ok().filter(|c| *c > 0)?;
        Some(total / count)
    }
}

/// Aggregate for one (algorithm, fault kind, probability) cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellReport {
    /// Algorithm compared
    pub algorithm: RepairAlgorithm,
    /// Fault kind applied
    pub fault_kind: FaultKind,
    /// Availability probability applied
    pub probability: Probability,
    /// Number of trials run
    pub trials: u64,
    /// Successful repairs
    pub successes: OutcomeStats,
    /// Failed repairs
    pub failures: OutcomeStats,
    /// Failed trials per [`FailureReason::label`]
    pub failure_reasons: BTreeMap<String, u64>,
}

impl CellReport {
    /// Fold collected trials into a report
    pub fn from_trials(
        algorithm: RepairAlgorithm,
        fault_kind: FaultKind,
        probability: Probability,
        trials: &[TrialResult],
    ) -> Self {
        let mut report = Self {
            algorithm,
            fault_kind,
            probability,
            trials: 0,
            successes: OutcomeStats::default(),
            failures: OutcomeStats::default(),
            failure_reasons: BTreeMap::new(),
        };
        for trial in trials {
            report.trials += 1;
            match trial.outcome {
                RepairOutcome::Repaired => report.successes.record(trial),
                RepairOutcome::Failed(reason) => {
                    report.failures.record(trial);
                    *report
                        .failure_reasons
                        .entry(reason.label().to_string())
                        .or_default() += 1;
                }
            }
        }
        report
    }

    /// Fraction of trials that repaired the target
    pub fn success_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.successes.count as f64 / self.trials as f64
    }

    /// Fraction of trials that failed
    pub fn failure_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.failures.count as f64 / self.trials as f64
    }

    /// Failed trials for one reason kind
    pub fn failures_for(&self, reason: FailureReason) -> u64 {
        self.failure_reasons
            .get(reason.label())
            .copied()
            .unwrap_or(0)
    }

    /// Flat record for export
    pub fn record(&self, design: Option<&str>) -> ResultRecord {
        let secs = |d: Duration| d.as_secs_f64();
        let success = &self.successes;
        let fail = &self.failures;
        let present = |stats: &OutcomeStats| stats.count > 0;

        ResultRecord {
            design: design.map(str::to_owned),
            algorithm: self.algorithm.name().to_string(),
            fault_model: self.fault_kind.to_string(),
            availability_probability: self.probability.value(),
            successful_repairs: success.count,
            success_total_contacted: present(success).then_some(success.total_contacted),
            success_average_contacted: success.average_contacted(),
            total_success_wall_time: present(success).then(|| secs(success.total_wall)),
            average_success_wall_time: success.average_wall().map(secs),
            total_success_process_time: present(success).then(|| secs(success.total_cpu)),
            average_success_process_time: success.average_cpu().map(secs),
            failed_repairs: fail.count,
            fail_total_contacted: present(fail).then_some(fail.total_contacted),
            fail_average_contacted: fail.average_contacted(),
            total_fail_wall_time: present(fail).then(|| secs(fail.total_wall)),
            average_fail_wall_time: fail.average_wall().map(secs),
            total_fail_process_time: present(fail).then(|| secs(fail.total_cpu)),
            average_fail_process_time: fail.average_cpu().map(secs),
            safety_bound_exceeded: self.failures_for(FailureReason::SafetyBoundExceeded),
        }
    }
}

/// Full sweep result for one design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    /// Design name, if known
    pub design: Option<String>,
    /// Observed design parameters
    pub parameters: DesignParameters,
    /// One report per cell, in sweep order
    pub cells: Vec<CellReport>,
}

impl ExperimentReport {
    /// Find a cell
    pub fn cell(
        &self,
        algorithm: RepairAlgorithm,
        fault_kind: FaultKind,
        probability: Probability,
    ) -> Option<&CellReport> {
        self.cells.iter().find(|cell| {
            cell.algorithm == algorithm
                && cell.fault_kind == fault_kind
                && cell.probability == probability
        })
    }

    /// Export records for every cell
    pub fn records(&self) -> Vec<ResultRecord> {
        self.cells
            .iter()
            .map(|cell| cell.record(self.design.as_deref()))
            .collect()
    }
}

/// Flat per-cell record handed to a [`ResultSink`](crate::sink::ResultSink).
///
/// Times are in seconds. Totals and averages of an empty outcome class are
/// absent rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Design label, when the design is named
    #[serde(rename = "Design")]
    pub design: Option<String>,
    /// Algorithm name
    #[serde(rename = "Algorithm")]
    pub algorithm: String,
    /// Fault kind
    #[serde(rename = "Fault model")]
    pub fault_model: String,
    /// Availability probability of the cell
    #[serde(rename = "Availability probability")]
    pub availability_probability: f64,
    /// Number of successful trials
    #[serde(rename = "Successful repairs")]
    pub successful_repairs: u64,
    /// Contacts summed over successful trials
    #[serde(rename = "Success total contacted")]
    pub success_total_contacted: Option<u64>,
    /// Mean contacts per successful trial
    #[serde(rename = "Success average contacted")]
    pub success_average_contacted: Option<f64>,
    /// Wall time summed over successful trials
    #[serde(rename = "Total success wall clock time")]
    pub total_success_wall_time: Option<f64>,
    /// Mean wall time per successful trial
    #[serde(rename = "Average success wall clock time")]
    pub average_success_wall_time: Option<f64>,
    /// CPU time summed over successful trials
    #[serde(rename = "Total success process time")]
    pub total_success_process_time: Option<f64>,
    /// Mean CPU time per successful trial
    #[serde(rename = "Average success process time")]
    pub average_success_process_time: Option<f64>,
    /// Number of failed trials
    #[serde(rename = "Failed repairs")]
    pub failed_repairs: u64,
    /// Contacts summed over failed trials
    #[serde(rename = "Fail total contacted")]
    pub fail_total_contacted: Option<u64>,
    /// Mean contacts per failed trial
    #[serde(rename = "Fail average contacted")]
    pub fail_average_contacted: Option<f64>,
    /// Wall time summed over failed trials
    #[serde(rename = "Total fail wall clock time")]
    pub total_fail_wall_time: Option<f64>,
    /// Mean wall time per failed trial
    #[serde(rename = "Average fail wall clock time")]
    pub average_fail_wall_time: Option<f64>,
    /// CPU time summed over failed trials
    #[serde(rename = "Total fail process time")]
    pub total_fail_process_time: Option<f64>,
    /// Mean CPU time per failed trial
    #[serde(rename = "Average fail process time")]
    pub average_fail_process_time: Option<f64>,
    /// Failed trials that hit the contact budget
    #[serde(rename = "Safety bound exceeded")]
    pub safety_bound_exceeded: u64,
}

impl ResultRecord {
    /// Column names in export order
    pub const COLUMNS: [&'static str; 19] = [
        "Design",
        "Algorithm",
        "Fault model",
        "Availability probability",
        "Successful repairs",
        "Success total contacted",
        "Success average contacted",
        "Total success wall clock time",
        "Average success wall clock time",
        "Total success process time",
        "Average success process time",
        "Failed repairs",
        "Fail total contacted",
        "Fail average contacted",
        "Total fail wall clock time",
        "Average fail wall clock time",
        "Total fail process time",
        "Average fail process time",
        "Safety bound exceeded",
    ];

    /// Field values rendered as text, aligned with [`COLUMNS`](Self::COLUMNS);
    /// absent values are empty strings.
    pub fn values(&self) -> Vec<String> {
        fn opt<T: ToString>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }
        vec![
            opt(self.design.as_deref()),
            self.algorithm.clone(),
            self.fault_model.clone(),
            self.availability_probability.to_string(),
            self.successful_repairs.to_string(),
            opt(self.success_total_contacted),
            opt(self.success_average_contacted),
            opt(self.total_success_wall_time),
            opt(self.average_success_wall_time),
            opt(self.total_success_process_time),
            opt(self.average_success_process_time),
            self.failed_repairs.to_string(),
            opt(self.fail_total_contacted),
            opt(self.fail_average_contacted),
            opt(self.total_fail_wall_time),
            opt(self.average_fail_wall_time),
            opt(self.total_fail_process_time),
            opt(self.average_fail_process_time),
            self.safety_bound_exceeded.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(outcome: RepairOutcome, contacted: u64, millis: u64) -> TrialResult {
        TrialResult {
            target: ParticipantId(0),
            outcome,
            contacted,
            timing: Timing {
                wall: Duration::from_millis(millis),
                cpu: Duration::from_millis(millis / 2),
            },
        }
    }

    #[test]
    fn test_fold_splits_outcome_classes() {
        let trials = vec![
            trial(RepairOutcome::Repaired, 3, 10),
            trial(RepairOutcome::Repaired, 5, 30),
            trial(
                RepairOutcome::Failed(FailureReason::SafetyBoundExceeded),
                100,
                40,
            ),
            trial(
                RepairOutcome::Failed(FailureReason::CandidatesExhausted),
                7,
                20,
            ),
        ];
        let cell = CellReport::from_trials(
            RepairAlgorithm::RandomWalk,
            FaultKind::Permanent,
            Probability::new(0.5).unwrap(),
            &trials,
        );

        assert_eq!(cell.trials, 4);
        assert_eq!(cell.successes.count, 2);
        assert_eq!(cell.successes.total_contacted, 8);
        assert_eq!(cell.successes.average_contacted(), Some(4.0));
        assert_eq!(cell.successes.average_wall(), Some(Duration::from_millis(20)));
        assert_eq!(cell.failures.count, 2);
        assert_eq!(cell.failures_for(FailureReason::SafetyBoundExceeded), 1);
        assert_eq!(cell.failures_for(FailureReason::CandidatesExhausted), 1);
        assert_eq!(cell.failures_for(FailureReason::Unrecoverable(crate::ids::ShareId(0))), 0);
        assert!((cell.success_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_class_has_no_averages() {
        let cell = CellReport::from_trials(
            RepairAlgorithm::StoredGrouping,
            FaultKind::Transient,
            Probability::ALWAYS,
            &[trial(RepairOutcome::Repaired, 3, 4)],
        );
        let record = cell.record(Some("7,7,3,3,1"));
        assert_eq!(record.failed_repairs, 0);
        assert_eq!(record.fail_total_contacted, None);
        assert_eq!(record.fail_average_contacted, None);
        assert_eq!(record.average_fail_wall_time, None);
        assert_eq!(record.success_total_contacted, Some(3));
        assert_eq!(record.algorithm, "stored_grouped_participants");
        assert_eq!(record.values().len(), ResultRecord::COLUMNS.len());
        assert_eq!(record.values()[12], "");
    }

    #[test]
    fn test_record_accumulates_totals() {
        let mut stats = OutcomeStats::default();
        stats.record(&trial(RepairOutcome::Repaired, 2, 2));
        stats.record(&trial(RepairOutcome::Repaired, 4, 6));
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total_contacted, 6);
        assert_eq!(stats.total_wall, Duration::from_millis(8));
        assert_eq!(stats.average_wall(), Some(Duration::from_millis(4)));
    }

    #[test]
    fn test_record_serializes_with_column_names() {
        let cell = CellReport::from_trials(
            RepairAlgorithm::RandomWalk,
            FaultKind::Transient,
            Probability::ALWAYS,
            &[trial(RepairOutcome::Repaired, 3, 4)],
        );
        let json = serde_json::to_value(cell.record(None)).unwrap();
        let object = json.as_object().unwrap();
        for column in ResultRecord::COLUMNS {
            assert!(object.contains_key(column), "missing {column}");
        }
    }
}
