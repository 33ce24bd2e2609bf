//! Standard assertion helpers for repair tests

use repair_sim::{ParticipantId, ParticipantRegistry, RepairReport, ShareId};
use std::collections::BTreeSet;

/// Assert that a repair report ended in success
#[macro_export]
macro_rules! assert_repaired {
    ($report:expr) => {
        assert!(
            $report.success(),
            "Expected a successful repair, got {:?} after {} contacts",
            $report.outcome,
            $report.contacted
        )
    };
}

/// Assert that a repair report failed for the given reason
#[macro_export]
macro_rules! assert_failed_with {
    ($report:expr, $reason:expr) => {
        assert_eq!(
            $report.failure(),
            Some($reason),
            "Unexpected outcome after {} contacts",
            $report.contacted
        )
    };
}

/// Assert that the target never appears in its own contact trace
pub fn assert_no_self_contact(report: &RepairReport, target: ParticipantId) {
    assert!(
        report.contacts.iter().all(|contact| contact.peer != target),
        "Participant {target} contacted itself"
    );
}

/// Assert the trace agrees with the counters and recovers no share twice
pub fn assert_trace_consistent(report: &RepairReport) {
    assert_eq!(report.contacted as usize, report.contacts.len());

    let mut recovered = BTreeSet::new();
    for contact in &report.contacts {
        if let Some(share) = contact.recovered {
            assert!(contact.accepted, "Share {share} recovered from a rejected contact");
            assert!(recovered.insert(share), "Share {share} recovered twice");
        }
    }
}

/// Assert that both derived indices match a brute-force recomputation
pub fn assert_index_matches_design(registry: &ParticipantRegistry) {
    assert!(registry.is_indexed(), "Registry has not been indexed");

    for participant in registry.iter() {
        let me = participant.id();
        let mine: BTreeSet<ShareId> = participant.shares().iter().copied().collect();

        let expected_intersecting: Vec<ParticipantId> = registry
            .iter()
            .filter(|other| other.id() != me)
            .filter(|other| other.shares().iter().any(|s| mine.contains(s)))
            .map(|other| other.id())
            .collect();
        assert_eq!(
            participant.intersecting_participants(),
            expected_intersecting.as_slice(),
            "Intersecting list of {me} is wrong"
        );

        let keys: Vec<ShareId> = participant.grouped_participants().keys().copied().collect();
        assert_eq!(keys, participant.shares(), "Grouped keys of {me} are out of order");

        for share in participant.shares() {
            let expected: Vec<ParticipantId> = registry
                .iter()
                .filter(|other| other.id() != me && other.holds(*share))
                .map(|other| other.id())
                .collect();
            assert_eq!(
                participant.holders_of(*share),
                expected.as_slice(),
                "Holders of share {share} seen from {me} are wrong"
            );
        }
    }
}
