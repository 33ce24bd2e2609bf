//! Property test strategies for repair-sim types

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use repair_sim::{BlockDesign, FaultKind, Probability, RepairAlgorithm};

/// Strategy for arbitrary non-empty designs
///
/// Up to 12 shares and 10 blocks, each block holding 1 to 4 distinct shares.
/// Designs are not regular and some shares may have a single holder.
pub fn arb_design() -> impl Strategy<Value = BlockDesign> {
    (2u32..=12, 2usize..=10).prop_flat_map(|(v, b)| {
        let k_max = v.min(4) as usize;
        prop::collection::vec(prop::collection::btree_set(0..v, 1..=k_max), b)
            .prop_map(BlockDesign::new)
    })
}

/// Strategy for designs where every share has at least two holders
///
/// Built by listing each block of an [`arb_design`] twice, so any single
/// participant's shares remain held by someone else.
pub fn arb_recoverable_design() -> impl Strategy<Value = BlockDesign> {
    arb_design().prop_map(|design| {
        let blocks = design
            .blocks
            .iter()
            .chain(design.blocks.iter())
            .map(|block| block.iter().map(|share| share.0).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        BlockDesign::new(blocks)
    })
}

/// Strategy for availability probabilities on the 0.1 grid, 0 and 1 included
pub fn arb_probability() -> impl Strategy<Value = Probability> {
    (0u8..=10).prop_map(|tenths| Probability::new(f64::from(tenths) / 10.0).unwrap())
}

/// Strategy for fault kinds
pub fn arb_fault_kind() -> impl Strategy<Value = FaultKind> {
    prop_oneof![Just(FaultKind::Transient), Just(FaultKind::Permanent)]
}

/// Strategy for repair algorithms
pub fn arb_algorithm() -> impl Strategy<Value = RepairAlgorithm> {
    prop::sample::select(RepairAlgorithm::ALL.to_vec())
}
