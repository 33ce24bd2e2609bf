//! Reusable registries, parameters and single-trial drivers

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use repair_sim::{
    catalog, BlockDesign, FaultKind, FaultModel, ParticipantId, ParticipantRegistry,
    Probability, RepairAlgorithm, RepairParams, RepairReport, RepairTarget, SweepConfig,
};

/// Contact budget used by fixtures
pub const TEST_MAX_CONTACTS: u64 = 10_000;

/// The (7, 7, 3, 3, 1) design written out by hand
pub fn fano_design() -> BlockDesign {
    BlockDesign::new(vec![
        vec![0, 1, 3],
        vec![0, 2, 6],
        vec![0, 4, 5],
        vec![1, 2, 4],
        vec![1, 5, 6],
        vec![2, 3, 5],
        vec![3, 4, 6],
    ])
    .with_name("fano")
}

/// Indexed registry for [`fano_design`]
pub fn fano_registry() -> ParticipantRegistry {
    ParticipantRegistry::indexed(&fano_design()).unwrap()
}

/// Indexed registry for a catalogue design; panics on an unknown name
pub fn catalog_registry(name: &str) -> ParticipantRegistry {
    let design = catalog::get(name).unwrap_or_else(|| panic!("no catalogue design '{name}'"));
    ParticipantRegistry::indexed(&design).unwrap()
}

/// Repair parameters with the fixture budget
pub fn params(kind: FaultKind, p: f64) -> RepairParams {
    RepairParams::new(
        FaultModel::new(kind, Probability::new(p).unwrap()),
        TEST_MAX_CONTACTS,
    )
    .unwrap()
}

/// Small sequential sweep for fast integration tests
pub fn small_sweep(trials: u64, seed: u64) -> SweepConfig {
    SweepConfig::default()
        .with_trials(trials)
        .with_seed(seed)
        .with_parallel(false)
}

/// Run one repair of `target` with a seeded RNG.
///
/// Returns the report and the target's final working state.
pub fn run_single(
    registry: &ParticipantRegistry,
    algorithm: RepairAlgorithm,
    target: ParticipantId,
    params: &RepairParams,
    seed: u64,
) -> (RepairReport, RepairTarget) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut view = registry.view_excluding(target).unwrap();
    let mut working = view.target();
    let report = algorithm
        .repair(&mut view, &mut working, params, &mut rng)
        .unwrap();
    (report, working)
}
