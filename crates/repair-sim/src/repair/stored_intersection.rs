//! Algorithm 2: uniform draws restricted to the stored intersecting list.

use super::{walk, RepairParams, RepairReport, RepairStrategy};
use crate::error::{Result, SimError};
use crate::registry::{RegistryView, RepairTarget};
use rand::Rng;

/// Same contact loop as [`RandomWalk`](super::RandomWalk), but candidates are
/// only the peers known to share at least one sub-share with the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredIntersection;

impl StoredIntersection {
    /// Name used in result records
    pub const NAME: &'static str = "stored_intersecting_participants";
}

impl RepairStrategy for StoredIntersection {
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
        let registry = view.registry();
        if !registry.is_indexed() {
            return Err(SimError::NotIndexed);
        }
        let pool = registry
            .participant(target.id())
            .map(|p| {
                p.intersecting_participants()
                    .iter()
                    .copied()
                    .filter(|peer| view.contains(*peer))
                    .collect()
            })
            .unwrap_or_default();
        Ok(walk(pool, view, target, params, rng))
    }
}
