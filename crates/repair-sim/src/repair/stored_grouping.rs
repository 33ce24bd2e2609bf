//! Algorithm 3: per-share resolution from the stored holder lists.

use super::{
    uncovered_share, Attempt, ContactSession, FailureReason, RepairOutcome, RepairParams,
    RepairReport, RepairStrategy,
};
use crate::error::{Result, SimError};
use crate::ids::ParticipantId;
use crate::registry::{RegistryView, RepairTarget};
use rand::Rng;

/// Resolves each missing share on its own, drawing only from that share's
/// holders until one answers.
///
/// The first share whose holders are all exhausted fails the whole attempt;
/// later shares are not tried. Cost is the sum of contacts over all shares.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredGrouping;

impl StoredGrouping {
    /// Name used in result records
    pub const NAME: &'static str = "stored_grouped_participants";
}

impl RepairStrategy for StoredGrouping {
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
        let Some(owner) = registry.participant(target.id()) else {
            return Err(SimError::UnknownParticipant { id: target.id() });
        };

        let mut session = ContactSession::new(params);

        let reachable: Vec<ParticipantId> = view.members().to_vec();
        if let Some(share) = uncovered_share(&reachable, view, target) {
            return Ok(session.finish(RepairOutcome::Failed(FailureReason::Unrecoverable(share))));
        }

        for share in target.missing_shares().to_vec() {
            let mut candidates: Vec<ParticipantId> = owner
                .holders_of(share)
                .iter()
                .copied()
                .filter(|peer| view.contains(*peer) && view.is_available(*peer))
                .collect();

            loop {
                if candidates.is_empty() {
                    return Ok(
                        session.finish(RepairOutcome::Failed(FailureReason::ShareExhausted(share)))
                    );
                }
                if session.budget_spent() {
                    return Ok(
                        session.finish(RepairOutcome::Failed(FailureReason::SafetyBoundExceeded))
                    );
                }

                let index = rng.gen_range(0..candidates.len());
                let peer = candidates[index];
                match session.contact(peer, Some(share), view, target, rng) {
                    Attempt::Accepted(_) => break,
                    Attempt::Rejected => {
                        if !view.is_available(peer) {
                            candidates.swap_remove(index);
                        }
                    }
                }
            }
        }

        Ok(session.finish(RepairOutcome::Repaired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::FaultKind;
    use crate::ids::ShareId;
    use crate::registry::ParticipantRegistry;
    use crate::repair::tests::{fano, params};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_perfect_availability_costs_one_contact_per_share() {
        let registry = fano();
        let mut rng = ChaCha8Rng::seed_from_u64(41);
        for id in registry.ids() {
            let mut view = registry.view_excluding(id).unwrap();
            let mut target = view.target();
            let report = StoredGrouping
                .repair(&mut view, &mut target, &params(FaultKind::Transient, 1.0), &mut rng)
                .unwrap();
            assert!(report.success());
            assert_eq!(report.contacted, 3);

            let recovered: Vec<ShareId> =
                report.contacts.iter().filter_map(|c| c.recovered).collect();
            assert_eq!(recovered, target.shares());
        }
    }

    #[test]
    fn test_contacts_only_holders_of_the_share_in_progress() {
        let registry = fano();
        let owner = registry.participant(ParticipantId(0)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..50 {
            let mut view = registry.view_excluding(ParticipantId(0)).unwrap();
            let mut target = view.target();
            let report = StoredGrouping
                .repair(&mut view, &mut target, &params(FaultKind::Transient, 0.4), &mut rng)
                .unwrap();
            assert!(report.success());

            // Contacts arrive in share order: every contact up to and including
            // the one recovering share s is a holder of s.
            let mut shares = target.shares().iter();
            let mut current = *shares.next().unwrap();
            for contact in &report.contacts {
                assert!(owner.holders_of(current).contains(&contact.peer));
                if contact.recovered.is_some() {
                    assert_eq!(contact.recovered, Some(current));
                    if let Some(next) = shares.next() {
                        current = *next;
                    }
                }
            }
        }
    }

    #[test]
    fn test_exhausted_share_short_circuits() {
        // Each share of participant 0 has exactly one other holder.
        let mut registry =
            ParticipantRegistry::build(vec![vec![0, 1], vec![1, 2], vec![0, 2]]).unwrap();
        registry.index();
        let mut rng = ChaCha8Rng::seed_from_u64(43);

        let mut view = registry.view_excluding(ParticipantId(0)).unwrap();
        let mut target = view.target();
        let report = StoredGrouping
            .repair(&mut view, &mut target, &params(FaultKind::Permanent, 0.0), &mut rng)
            .unwrap();

        // Share 0 has a single holder (participant 2), rejected once; share 1 is never tried.
        assert_eq!(report.failure(), Some(FailureReason::ShareExhausted(ShareId(0))));
        assert_eq!(report.contacted, 1);
        assert_eq!(target.missing_shares(), &[ShareId(0), ShareId(1)]);
    }
}
