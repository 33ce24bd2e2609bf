//! Experiment runner integration tests over the catalogue designs

#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use repair_sim::{
    catalog, run_design, ExperimentRunner, FailureReason, FaultKind, ParticipantId,
    ParticipantRegistry, Probability, RepairAlgorithm, SimError, SweepConfig,
};
use repair_testkit::{
    assert_failed_with, assert_index_matches_design, assert_no_self_contact, assert_repaired,
    catalog_registry, fano_design, fano_registry, params, run_single, small_sweep,
};

fn p(value: f64) -> Probability {
    Probability::new(value).unwrap()
}

#[test]
fn fano_indices_match_hand_computed_values() {
    let registry = fano_registry();
    let p0 = registry.participant(ParticipantId(0)).unwrap();

    let everyone_else: Vec<ParticipantId> = (1..7).map(ParticipantId).collect();
    assert_eq!(p0.intersecting_participants(), everyone_else.as_slice());
    assert_eq!(
        p0.holders_of(repair_sim::ShareId(0)),
        &[ParticipantId(1), ParticipantId(2)]
    );
    assert_index_matches_design(&registry);
}

#[test]
fn every_catalogue_design_repairs_under_perfect_availability() {
    for name in catalog::names() {
        let registry = catalog_registry(name);
        assert_index_matches_design(&registry);

        let runner = ExperimentRunner::new(
            &registry,
            small_sweep(30, 1)
                .with_probabilities([Probability::ALWAYS])
                .with_fault_kinds([FaultKind::Transient]),
        )
        .unwrap();
        let report = runner.run().unwrap();

        for cell in &report.cells {
            assert_eq!(cell.failures.count, 0, "{name}: {} failed", cell.algorithm);
            assert_eq!(cell.successes.count, 30);
        }

        // Stored grouping spends exactly one contact per share when nobody fails.
        let k = report.parameters.k.unwrap() as u64;
        let grouped = report
            .cell(
                RepairAlgorithm::StoredGrouping,
                FaultKind::Transient,
                Probability::ALWAYS,
            )
            .unwrap();
        assert_eq!(grouped.successes.total_contacted, 30 * k, "{name}");
    }
}

#[test]
fn successful_repairs_reach_distinct_peer_lower_bound() {
    // Fano blocks meet in one share, so three peers are needed for three shares.
    assert_eq!(fano_design().min_contacts_lower_bound(), Some(3));

    for design in catalog::all() {
        let registry = ParticipantRegistry::indexed(&design).unwrap();
        let max_intersection = design.max_block_intersection();
        assert!(max_intersection > 0, "{}", design.label());

        let mut successes = 0;
        for algorithm in RepairAlgorithm::ALL {
            for kind in FaultKind::ALL {
                for availability in [1.0, 0.8, 0.5] {
                    let params = params(kind, availability);
                    for (seed, participant) in registry.iter().enumerate().step_by(3) {
                        let bound = participant.shares().len().div_ceil(max_intersection);
                        if let Some(uniform) = design.min_contacts_lower_bound() {
                            assert_eq!(bound, uniform, "{}", design.label());
                        }

                        let target = participant.id();
                        let (report, _) =
                            run_single(&registry, algorithm, target, &params, seed as u64);
                        if report.success() {
                            successes += 1;
                            assert!(
                                report.distinct_peers() >= bound,
                                "{} {algorithm} {kind} p={availability}: {} peers, bound {bound}",
                                design.label(),
                                report.distinct_peers(),
                            );
                        }
                    }
                }
            }
        }
        assert!(successes > 0, "{} never repaired", design.label());
    }
}

#[test]
fn permanent_failure_rate_grows_as_availability_drops() {
    let registry = fano_registry();
    let config = small_sweep(400, 99)
        .with_probabilities([p(1.0), p(0.7), p(0.4), p(0.1)])
        .with_fault_kinds([FaultKind::Permanent]);
    let report = ExperimentRunner::new(&registry, config)
        .unwrap()
        .run()
        .unwrap();

    for algorithm in RepairAlgorithm::ALL {
        let rates: Vec<f64> = report
            .cells
            .iter()
            .filter(|cell| cell.algorithm == algorithm)
            .map(|cell| cell.failure_rate())
            .collect();
        assert_eq!(rates.len(), 4);
        assert_eq!(rates[0], 0.0, "{algorithm} failed with p = 1");
        for pair in rates.windows(2) {
            assert!(
                pair[1] + 0.05 >= pair[0],
                "{algorithm}: failure rate fell from {} to {}",
                pair[0],
                pair[1]
            );
        }
        assert!(rates[3] > rates[1], "{algorithm}: {rates:?}");
    }
}

#[test]
fn zero_availability_never_repairs() {
    let report = run_design(
        &catalog::get("9,12,4,3,1").unwrap(),
        small_sweep(20, 5)
            .with_probabilities([Probability::NEVER])
            .with_max_contacts(200),
    )
    .unwrap();

    for cell in &report.cells {
        assert_eq!(cell.successes.count, 0);
        assert_eq!(cell.failures.count, 20);
        match cell.fault_kind {
            FaultKind::Transient => {
                assert_eq!(cell.failures_for(FailureReason::SafetyBoundExceeded), 20);
                assert_eq!(cell.failures.total_contacted, 20 * 200);
            }
            FaultKind::Permanent => {
                assert_eq!(cell.failures_for(FailureReason::SafetyBoundExceeded), 0);
            }
        }
    }
}

#[test]
fn same_seed_same_results_in_parallel_and_sequential() {
    let design = catalog::get("13,13,4,4,1").unwrap();
    let base = SweepConfig::default()
        .with_trials(64)
        .with_seed(2024)
        .with_probabilities([p(0.9), p(0.5)]);

    let parallel = run_design(&design, base.clone().with_parallel(true)).unwrap();
    let sequential = run_design(&design, base.clone().with_parallel(false)).unwrap();
    let again = run_design(&design, base.with_parallel(true)).unwrap();

    for ((a, b), c) in parallel
        .cells
        .iter()
        .zip(&sequential.cells)
        .zip(&again.cells)
    {
        assert_eq!(a.successes.count, b.successes.count);
        assert_eq!(a.successes.total_contacted, b.successes.total_contacted);
        assert_eq!(a.failures.total_contacted, b.failures.total_contacted);
        assert_eq!(a.failure_reasons, b.failure_reasons);
        assert_eq!(a.successes.total_contacted, c.successes.total_contacted);
    }
}

#[test]
fn trials_never_contact_their_target() {
    let registry = catalog_registry("16,20,5,4,1");
    let config = small_sweep(50, 3).with_probabilities([p(0.6)]);
    let runner = ExperimentRunner::new(&registry, config).unwrap();

    for cell in runner.cells() {
        let repair_params = runner
            .config()
            .repair_params(cell.fault_kind, cell.probability)
            .unwrap();
        for trial in 0..50 {
            let (target, report, _) = runner.trial_report(cell, &repair_params, trial).unwrap();
            assert_no_self_contact(&report, target);
        }
    }
}

#[test]
fn canonical_registry_untouched_by_trials() {
    let registry = fano_registry();
    let snapshot = registry.clone();

    run_single(
        &registry,
        RepairAlgorithm::RandomWalk,
        ParticipantId(3),
        &params(FaultKind::Permanent, 0.2),
        8,
    );
    let runner = ExperimentRunner::new(&registry, small_sweep(50, 8)).unwrap();
    runner.run().unwrap();

    assert_eq!(registry, snapshot);
}

#[test]
fn single_holder_share_is_reported_unrecoverable() {
    let registry = ParticipantRegistry::build(vec![vec![0, 1], vec![1, 2], vec![2, 0], vec![7]])
        .unwrap();
    let mut registry = registry;
    registry.index();

    for algorithm in RepairAlgorithm::ALL {
        let (report, _) = run_single(
            &registry,
            algorithm,
            ParticipantId(3),
            &params(FaultKind::Transient, 1.0),
            0,
        );
        assert_failed_with!(report, FailureReason::Unrecoverable(repair_sim::ShareId(7)));
        assert_eq!(report.contacted, 0);

        let (report, _) = run_single(
            &registry,
            algorithm,
            ParticipantId(0),
            &params(FaultKind::Transient, 1.0),
            0,
        );
        assert_repaired!(report);
    }
}

#[test]
fn configuration_errors_fail_before_trials() {
    let registry = fano_registry();

    let err = ExperimentRunner::new(&registry, SweepConfig::default().with_fault_kinds([]))
        .unwrap_err();
    assert!(err.is_configuration());

    let err = SweepConfig::from_toml_str("fault_kinds = [\"Intermittent\"]").unwrap_err();
    assert_matches!(err, SimError::Parse { .. });
    assert!(err.is_configuration());
    assert!(err.to_string().contains("Intermittent"), "{err}");
    assert_matches!(
        ParticipantRegistry::build(Vec::<Vec<u32>>::new()),
        Err(SimError::EmptyDesign)
    );
    assert_matches!(
        registry.view_excluding(ParticipantId(70)),
        Err(SimError::UnknownParticipant { .. })
    );
}
