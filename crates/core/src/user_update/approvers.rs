//! Approver set reconciliation.
//!
//! The requested approver set replaces the current one wholesale: when the
//! sets differ, the relation is cleared and every requested approver is
//! re-added individually, so the per-add group-membership validation runs
//! uniformly for all of them, including approvers that were already present.
//! This costs O(n) relation writes even for a one-element change, which is
//! acceptable because approver sets are small.

use std::collections::BTreeSet;

use uuid::Uuid;

/// A planned full rebuild of a user's approver relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproverRebuild {
    /// The approvers to add after clearing the relation, deduplicated and
    /// in request order.
    pub add: Vec<Uuid>,
}

impl ApproverRebuild {
    /// Compares the requested approver set against the current one.
    ///
    /// Returns `None` when the sets are equal (nothing to do, which makes
    /// reconciliation idempotent), otherwise the rebuild plan.
    #[must_use]
    pub fn plan(current: &BTreeSet<Uuid>, requested: &[Uuid]) -> Option<Self> {
        let mut seen = BTreeSet::new();
        let mut add = Vec::with_capacity(requested.len());
        for id in requested {
            if seen.insert(*id) {
                add.push(*id);
            }
        }

        if seen == *current {
            return None;
        }

        Some(Self { add })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[Uuid]) -> BTreeSet<Uuid> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_identical_sets_produce_no_plan() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let current = set(&[a, b]);

        // Order on the wire does not matter.
        assert_eq!(ApproverRebuild::plan(&current, &[b, a]), None);
        assert_eq!(ApproverRebuild::plan(&current, &[a, b]), None);
    }

    #[test]
    fn test_changed_set_rebuilds_fully() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let current = set(&[a, b]);

        let plan = ApproverRebuild::plan(&current, &[a, c]).unwrap();
        // Full rebuild: the surviving approver is re-added too.
        assert_eq!(plan.add, vec![a, c]);
    }

    #[test]
    fn test_clearing_all_approvers() {
        let current = set(&[Uuid::new_v4()]);
        let plan = ApproverRebuild::plan(&current, &[]).unwrap();
        assert!(plan.add.is_empty());
    }

    #[test]
    fn test_empty_to_empty_is_noop() {
        assert_eq!(ApproverRebuild::plan(&BTreeSet::new(), &[]), None);
    }

    #[test]
    fn test_duplicates_in_request_are_collapsed() {
        let a = Uuid::new_v4();
        let current = BTreeSet::new();

        let plan = ApproverRebuild::plan(&current, &[a, a, a]).unwrap();
        assert_eq!(plan.add, vec![a]);

        // A duplicated request for the current set is still a no-op.
        let current = set(&[a]);
        assert_eq!(ApproverRebuild::plan(&current, &[a, a]), None);
    }

    #[test]
    fn test_idempotent_application() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let requested = vec![a, b];

        let plan = ApproverRebuild::plan(&BTreeSet::new(), &requested).unwrap();
        let after: BTreeSet<Uuid> = plan.add.iter().copied().collect();

        // Applying the same request against the resulting state plans nothing.
        assert_eq!(ApproverRebuild::plan(&after, &requested), None);
    }
}
