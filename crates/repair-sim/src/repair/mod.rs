//! Repair algorithms
//!
//! All three algorithms share one contract: given the trial's contactable view
//! (target excluded), the target's working share set, a fault model and a
//! contact budget, drive contacts until the target holds every share again or
//! recovery is impossible. They differ only in where candidates come from:
//!
//! - [`RandomWalk`] draws from every contactable participant
//! - [`StoredIntersection`] draws from the precomputed intersecting list
//! - [`StoredGrouping`] resolves each share separately from its holder list
//!
//! Each contact runs the same small state machine: select a candidate, apply
//! the fault model, then either reject or check the candidate's shares for
//! overlap with what is still missing.

use crate::error::{Result, SimError};
use crate::fault::{ContactDecision, FaultModel};
use crate::ids::{ParticipantId, ShareId};
use crate::registry::{RegistryView, RepairTarget};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

mod random_walk;
mod stored_grouping;
mod stored_intersection;

pub use random_walk::RandomWalk;
pub use stored_grouping::StoredGrouping;
pub use stored_intersection::StoredIntersection;

/// Per-attempt parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepairParams {
    /// Availability model applied to every contact
    pub fault: FaultModel,
    /// Safety bound on contact attempts; reaching it fails the attempt
    pub max_contacts: u64,
}

impl RepairParams {
    /// Create parameters; a zero contact budget is rejected.
    pub fn new(fault: FaultModel, max_contacts: u64) -> Result<Self> {
        if max_contacts == 0 {
            return Err(SimError::config("max_contacts must be positive"));
        }
        Ok(Self {
            fault,
            max_contacts,
        })
    }
}

/// Why a repair attempt gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FailureReason {
    /// Every remaining candidate is unavailable or holds nothing still missing
    CandidatesExhausted,
    /// Stored grouping ran out of holders for this share
    ShareExhausted(ShareId),
    /// The contact budget ran out first
    SafetyBoundExceeded,
    /// Nobody in the contactable pool holds this share at all
    Unrecoverable(ShareId),
}

impl FailureReason {
    /// Short label for aggregation
    pub const fn label(self) -> &'static str {
        match self {
            Self::CandidatesExhausted => "candidates_exhausted",
            Self::ShareExhausted(_) => "share_exhausted",
            Self::SafetyBoundExceeded => "safety_bound_exceeded",
            Self::Unrecoverable(_) => "unrecoverable",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CandidatesExhausted => write!(f, "candidates exhausted"),
            Self::ShareExhausted(share) => write!(f, "holders of share {share} exhausted"),
            Self::SafetyBoundExceeded => write!(f, "safety bound on contacts exceeded"),
            Self::Unrecoverable(share) => write!(f, "share {share} has no reachable holder"),
        }
    }
}

/// Terminal state of a repair attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairOutcome {
    /// All missing shares recovered
    Repaired,
    /// Recovery stopped early
    Failed(FailureReason),
}

/// One attempted interaction with a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Peer contacted
    pub peer: ParticipantId,
    /// Whether the fault draw let the contact through
    pub accepted: bool,
    /// Share recovered from this contact, if any
    pub recovered: Option<ShareId>,
}

/// What a repair attempt did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    /// Terminal state
    pub outcome: RepairOutcome,
    /// Contact attempts made, rejected ones included
    pub contacted: u64,
    /// Per-contact trace, in order
    pub contacts: Vec<Contact>,
}

impl RepairReport {
    /// Whether the target was fully repaired
    pub fn success(&self) -> bool {
        self.outcome == RepairOutcome::Repaired
    }

    /// Failure reason, if the attempt failed
    pub fn failure(&self) -> Option<FailureReason> {
        match self.outcome {
            RepairOutcome::Repaired => None,
            RepairOutcome::Failed(reason) => Some(reason),
        }
    }

    /// Distinct peers contacted
    pub fn distinct_peers(&self) -> usize {
        let mut peers: Vec<ParticipantId> = self.contacts.iter().map(|c| c.peer).collect();
        peers.sort_unstable();
        peers.dedup();
        peers.len()
    }
}

/// Capability shared by every repair algorithm
pub trait RepairStrategy {
    /// Stable algorithm name
    fn name(&self) -> &'static str;

    /// Run one repair attempt. Mutates only the trial-local `view` and `target`.
    fn repair<R: Rng + ?Sized>(
        &self,
        view: &mut RegistryView<'_>,
        target: &mut RepairTarget,
        params: &RepairParams,
        rng: &mut R,
    ) -> Result<RepairReport>;
}

/// The closed set of repair algorithms compared by an experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RepairAlgorithm {
    /// Algorithm 1
    RandomWalk,
    /// Algorithm 2
    StoredIntersection,
    /// Algorithm 3
    StoredGrouping,
}

impl RepairAlgorithm {
    /// All algorithms in comparison order
    pub const ALL: [RepairAlgorithm; 3] = [
        RepairAlgorithm::RandomWalk,
        RepairAlgorithm::StoredIntersection,
        RepairAlgorithm::StoredGrouping,
    ];

    /// Stable name used in result records
    pub const fn name(self) -> &'static str {
        match self {
            Self::RandomWalk => RandomWalk::NAME,
            Self::StoredIntersection => StoredIntersection::NAME,
            Self::StoredGrouping => StoredGrouping::NAME,
        }
    }

    /// Whether the algorithm reads the registry's derived indices
    pub const fn needs_index(self) -> bool {
        !matches!(self, Self::RandomWalk)
    }

    /// Dispatch to the algorithm's implementation
    pub fn repair<R: Rng + ?Sized>(
        self,
        view: &mut RegistryView<'_>,
        target: &mut RepairTarget,
        params: &RepairParams,
        rng: &mut R,
    ) -> Result<RepairReport> {
        match self {
            Self::RandomWalk => RandomWalk.repair(view, target, params, rng),
            Self::StoredIntersection => StoredIntersection.repair(view, target, params, rng),
            Self::StoredGrouping => StoredGrouping.repair(view, target, params, rng),
        }
    }
}

impl fmt::Display for RepairAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RepairAlgorithm {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "random_participants" | "random_walk" | "random" | "1" => Ok(Self::RandomWalk),
            "stored_intersecting_participants" | "stored_intersection" | "intersecting" | "2" => {
                Ok(Self::StoredIntersection)
            }
            "stored_grouped_participants" | "stored_grouping" | "grouped" | "3" => {
                Ok(Self::StoredGrouping)
            }
            _ => Err(SimError::UnknownAlgorithm {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for RepairAlgorithm {
    type Error = SimError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RepairAlgorithm> for String {
    fn from(algorithm: RepairAlgorithm) -> String {
        algorithm.name().to_string()
    }
}

/// Result of offering one candidate a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    /// Fault draw failed
    Rejected,
    /// Peer usable; carries the recovered share if it had one still missing
    Accepted(Option<ShareId>),
}

/// Contact bookkeeping shared by the algorithms
struct ContactSession<'p> {
    params: &'p RepairParams,
    contacted: u64,
    contacts: Vec<Contact>,
}

impl<'p> ContactSession<'p> {
    fn new(params: &'p RepairParams) -> Self {
        Self {
            params,
            contacted: 0,
            contacts: Vec::new(),
        }
    }

    fn budget_spent(&self) -> bool {
        self.contacted >= self.params.max_contacts
    }

    /// Contact `peer`, apply the fault model, and recover at most one share.
    ///
    /// `wanted` restricts recovery to one share (stored grouping); otherwise the
    /// first missing share the peer holds is taken. A permanent failure marks
    /// the peer unavailable in `view`.
    fn contact<R: Rng + ?Sized>(
        &mut self,
        peer: ParticipantId,
        wanted: Option<ShareId>,
        view: &mut RegistryView<'_>,
        target: &mut RepairTarget,
        rng: &mut R,
    ) -> Attempt {
        debug_assert_ne!(peer, target.id(), "target contacted itself");
        self.contacted += 1;

        let attempt = match self.params.fault.contact(rng) {
            ContactDecision::Unavailable => {
                if self.params.fault.removes_on_failure() {
                    view.mark_unavailable(peer);
                }
                Attempt::Rejected
            }
            ContactDecision::Usable => {
                let recovered = view.participant(peer).and_then(|participant| match wanted {
                    Some(share) => participant.holds(share).then_some(share),
                    None => target.first_recoverable_from(participant),
                });
                if let Some(share) = recovered {
                    target.recover(share);
                }
                Attempt::Accepted(recovered)
            }
        };

        let (accepted, recovered) = match attempt {
            Attempt::Rejected => (false, None),
            Attempt::Accepted(share) => (true, share),
        };
        trace!(%peer, accepted, recovered = ?recovered, contacted = self.contacted, "contact");
        self.contacts.push(Contact {
            peer,
            accepted,
            recovered,
        });
        attempt
    }

    fn finish(self, outcome: RepairOutcome) -> RepairReport {
        RepairReport {
            outcome,
            contacted: self.contacted,
            contacts: self.contacts,
        }
    }
}

/// First missing share that none of `candidates` holds.
fn uncovered_share(
    candidates: &[ParticipantId],
    view: &RegistryView<'_>,
    target: &RepairTarget,
) -> Option<ShareId> {
    target.missing_shares().iter().copied().find(|share| {
        !candidates.iter().any(|candidate| {
            view.participant(*candidate)
                .is_some_and(|participant| participant.holds(*share))
        })
    })
}

/// Draw-with-replacement loop shared by algorithms 1 and 2.
///
/// `pool` is a trial-local candidate list; permanently failed peers are removed
/// from it as they are discovered.
fn walk<R: Rng + ?Sized>(
    mut pool: Vec<ParticipantId>,
    view: &mut RegistryView<'_>,
    target: &mut RepairTarget,
    params: &RepairParams,
    rng: &mut R,
) -> RepairReport {
    let mut session = ContactSession::new(params);

    if let Some(share) = uncovered_share(&pool, view, target) {
        return session.finish(RepairOutcome::Failed(FailureReason::Unrecoverable(share)));
    }

    loop {
        if target.is_repaired() {
            return session.finish(RepairOutcome::Repaired);
        }
        if pool.is_empty() {
            return session.finish(RepairOutcome::Failed(FailureReason::CandidatesExhausted));
        }
        if session.budget_spent() {
            return session.finish(RepairOutcome::Failed(FailureReason::SafetyBoundExceeded));
        }

        let index = rng.gen_range(0..pool.len());
        let peer = pool[index];

        if session.contact(peer, None, view, target, rng) == Attempt::Rejected
            && !view.is_available(peer)
        {
            pool.swap_remove(index);
            if uncovered_share(&pool, view, target).is_some() {
                return session.finish(RepairOutcome::Failed(FailureReason::CandidatesExhausted));
            }
        }
    }
}
