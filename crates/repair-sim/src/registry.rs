//! Participant registry and trial-local views
//!
//! The registry owns one immutable [`Participant`] per block together with the
//! two derived indices. Everything a repair attempt mutates lives in a
//! [`RegistryView`] or a [`RepairTarget`], both created fresh per trial, so the
//! canonical registry is only ever borrowed shared while trials run.

use crate::design::BlockDesign;
use crate::error::{Result, SimError};
use crate::ids::{ParticipantId, ShareId};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// A participant holding one block of shares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    id: ParticipantId,
    shares: Vec<ShareId>,
    intersecting_participants: Vec<ParticipantId>,
    grouped_participants: IndexMap<ShareId, Vec<ParticipantId>>,
}

impl Participant {
    fn new(id: ParticipantId, shares: Vec<ShareId>) -> Self {
        Self {
            id,
            shares,
            intersecting_participants: Vec::new(),
            grouped_participants: IndexMap::new(),
        }
    }

    /// Participant id
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Shares owned by this participant, in block order
    pub fn shares(&self) -> &[ShareId] {
        &self.shares
    }

    /// Whether this participant owns `share`
    pub fn holds(&self, share: ShareId) -> bool {
        self.shares.contains(&share)
    }

    /// Other participants whose blocks meet this one, ascending by id
    pub fn intersecting_participants(&self) -> &[ParticipantId] {
        &self.intersecting_participants
    }

    /// For each owned share, the other participants that also hold it
    pub fn grouped_participants(&self) -> &IndexMap<ShareId, Vec<ParticipantId>> {
        &self.grouped_participants
    }

    /// Other holders of `share`; empty if this participant does not own it
    pub fn holders_of(&self, share: ShareId) -> &[ParticipantId] {
        self.grouped_participants
            .get(&share)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// All participants of one design instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRegistry {
    name: Option<String>,
    participants: Vec<Participant>,
    indexed: bool,
}

impl ParticipantRegistry {
    /// Create one participant per block, numbered in block order.
    ///
    /// The derived indices are left empty until [`index`](Self::index) runs.
    pub fn build<I, B>(blocks: I) -> Result<Self>
    where
        I: IntoIterator<Item = B>,
        B: IntoIterator<Item = u32>,
    {
        Self::from_design(&BlockDesign::new(blocks))
    }

    /// Create the registry for a design
    pub fn from_design(design: &BlockDesign) -> Result<Self> {
        design.validate()?;

        let participants = design
            .blocks
            .iter()
            .enumerate()
            .map(|(index, block)| -> Result<Participant> {
                let id = u32::try_from(index).map_err(|_| {
                    SimError::config(format!("design has more than {} blocks", u32::MAX))
                })?;
                Ok(Participant::new(ParticipantId(id), block.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: design.name.clone(),
            participants,
            indexed: false,
        })
    }

    /// Build and index in one step
    pub fn indexed(design: &BlockDesign) -> Result<Self> {
        let mut registry = Self::from_design(design)?;
        registry.index();
        Ok(registry)
    }

    /// Compute `intersecting_participants` and `grouped_participants` for every
    /// participant. Recomputes from scratch; calling it twice yields the same
    /// indices.
    pub fn index(&mut self) {
        let mut holders: BTreeMap<ShareId, Vec<ParticipantId>> = BTreeMap::new();
        for participant in &self.participants {
            for share in &participant.shares {
                holders.entry(*share).or_default().push(participant.id);
            }
        }

        for participant in &mut self.participants {
            let id = participant.id;
            let mut grouped = IndexMap::with_capacity(participant.shares.len());
            let mut intersecting = BTreeSet::new();

            for share in &participant.shares {
                let others: Vec<ParticipantId> = holders
                    .get(share)
                    .into_iter()
                    .flatten()
                    .copied()
                    .filter(|other| *other != id)
                    .collect();
                intersecting.extend(others.iter().copied());
                grouped.insert(*share, others);
            }

            participant.grouped_participants = grouped;
            participant.intersecting_participants = intersecting.into_iter().collect();
        }

        self.indexed = true;
        debug!(
            participants = self.participants.len(),
            shares = holders.len(),
            "indexed participant registry"
        );
    }

    /// Whether [`index`](Self::index) has run
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Design name carried over from the input, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of participants
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Always false for a registry built from a valid design
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Look up a participant
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(id.index())
    }

    /// Iterate participants in id order
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    /// All participant ids in order
    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.participants.iter().map(Participant::id)
    }

    /// The block design this registry was built from
    pub fn design(&self) -> BlockDesign {
        BlockDesign {
            name: self.name.clone(),
            blocks: self
                .participants
                .iter()
                .map(|p| p.shares.clone())
                .collect(),
        }
    }

    /// Trial-local view of every participant except `id`.
    ///
    /// The view copies only the membership list; participants' share sets stay
    /// borrowed from the registry.
    pub fn view_excluding(&self, id: ParticipantId) -> Result<RegistryView<'_>> {
        if self.participant(id).is_none() {
            return Err(SimError::UnknownParticipant { id });
        }
        Ok(RegistryView {
            registry: self,
            excluded: id,
            members: self.ids().filter(|other| *other != id).collect(),
            unavailable: BTreeSet::new(),
        })
    }
}

/// The contactable pool for one repair trial
#[derive(Debug, Clone)]
pub struct RegistryView<'a> {
    registry: &'a ParticipantRegistry,
    excluded: ParticipantId,
    members: Vec<ParticipantId>,
    unavailable: BTreeSet<ParticipantId>,
}

impl<'a> RegistryView<'a> {
    /// The registry this view borrows from
    pub fn registry(&self) -> &'a ParticipantRegistry {
        self.registry
    }

    /// The participant left out of this view, i.e. the repair target
    pub fn excluded(&self) -> ParticipantId {
        self.excluded
    }

    /// Fresh working copy of the excluded participant's shares
    pub fn target(&self) -> RepairTarget {
        let shares = self
            .registry
            .participant(self.excluded)
            .map(|p| p.shares.clone())
            .unwrap_or_default();
        RepairTarget::new(self.excluded, shares)
    }

    /// Current contactable members
    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    /// Number of contactable members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nobody is left to contact
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `id` is still contactable
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.members.contains(&id)
    }

    /// Participant data for a member (or any registry participant)
    pub fn participant(&self, id: ParticipantId) -> Option<&'a Participant> {
        self.registry.participant(id)
    }

    /// Drop a member from this view; returns whether it was present
    pub fn remove(&mut self, id: ParticipantId) -> bool {
        match self.members.iter().position(|member| *member == id) {
            Some(position) => {
                self.members.swap_remove(position);
                true
            }
            None => false,
        }
    }

    /// Record that `id` failed its availability draw for the rest of this trial
    pub fn mark_unavailable(&mut self, id: ParticipantId) {
        self.unavailable.insert(id);
        self.remove(id);
    }

    /// False once `id` has been marked unavailable in this trial
    pub fn is_available(&self, id: ParticipantId) -> bool {
        !self.unavailable.contains(&id)
    }

    /// Peers marked unavailable so far
    pub fn unavailable(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.unavailable.iter().copied()
    }
}

/// Working state of the participant being repaired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairTarget {
    id: ParticipantId,
    shares: Vec<ShareId>,
    missing_shares: Vec<ShareId>,
}

impl RepairTarget {
    /// Seed `missing_shares` with a copy of `shares`
    pub fn new(id: ParticipantId, shares: Vec<ShareId>) -> Self {
        Self {
            id,
            missing_shares: shares.clone(),
            shares,
        }
    }

    /// Target participant id
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Every share the target owns
    pub fn shares(&self) -> &[ShareId] {
        &self.shares
    }

    /// Shares not yet recovered
    pub fn missing_shares(&self) -> &[ShareId] {
        &self.missing_shares
    }

    /// True once every share has been recovered
    pub fn is_repaired(&self) -> bool {
        self.missing_shares.is_empty()
    }

    /// First still-missing share that `peer` can supply
    pub fn first_recoverable_from(&self, peer: &Participant) -> Option<ShareId> {
        self.missing_shares
            .iter()
            .copied()
            .find(|share| peer.holds(*share))
    }

    /// Mark `share` recovered; returns false if it was not missing
    pub fn recover(&mut self, share: ShareId) -> bool {
        match self.missing_shares.iter().position(|missing| *missing == share) {
            Some(position) => {
                self.missing_shares.remove(position);
                true
            }
            None => false,
        }
    }
}
