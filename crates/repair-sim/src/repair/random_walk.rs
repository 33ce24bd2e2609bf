//! Algorithm 1: uniform draws from the whole contactable pool.

use super::{walk, RepairParams, RepairReport, RepairStrategy};
use crate::error::Result;
use crate::registry::{RegistryView, RepairTarget};
use rand::Rng;

/// Draws peers uniformly, with replacement, from every participant in the view.
///
/// Peers that fail permanently leave the pool. Every accepted contact recovers
/// at most one missing share even when the blocks overlap in more.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomWalk;

impl RandomWalk {
    /// Name used in result records
    pub const NAME: &'static str = "random_participants";
}

impl RepairStrategy for RandomWalk {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn repair<R: Rng + ?Sized>(
        &self,
        view: &mut RegistryView<'_>,
        target: &mut RepairTarget,
        params: &RepairParams,
        rng: &mut R,
    ) -> Result<RepairReport> {
        let pool = view.members().to_vec();
        Ok(walk(pool, view, target, params, rng))
    }
}
