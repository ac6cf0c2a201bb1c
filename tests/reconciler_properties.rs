//! Property-based tests for the reconciliation algorithm.
//!
//! Verified properties:
//! - Empty targets: every source produces exactly one created record
//! - Exact match: no record is created or removed and every record carries its source's fields
//! - Orphans: targets without a source are gone afterwards and handed back
//! - Idempotence: reconciling the same sources again changes nothing, unsaved lines included
//! - Membership: the result holds exactly one record per source

use std::collections::BTreeSet;

use cart_reconcile::reconciler::{CollectionReconciliation, DuplicatePolicy};
use proptest::prelude::*;

use crate::api::{line_reconciler, Line};

mod api;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

/// Lines with distinct keys drawn from `keys`, quantities never zero.
fn keyed_lines(keys: std::ops::Range<u32>, max: usize) -> impl Strategy<Value = Vec<Line>> {
    prop::collection::btree_map(keys, 1u32..100, 0..max).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(id, quantity)| Line {
                id: Some(id),
                sku: format!("sku-{id}"),
                quantity,
            })
            .collect()
    })
}

/// Lines without a key and with distinct skus.
fn distinct_new_lines(max: usize) -> impl Strategy<Value = Vec<Line>> {
    prop::collection::btree_map("[a-z]{1,4}", 1u32..100, 0..max).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(sku, quantity)| Line {
                id: None,
                sku,
                quantity,
            })
            .collect()
    })
}

/// Lines without a key.
fn new_lines(max: usize) -> impl Strategy<Value = Vec<Line>> {
    prop::collection::vec(("[a-z]{1,4}", 1u32..100), 0..max).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(sku, quantity)| Line {
                id: None,
                sku,
                quantity,
            })
            .collect()
    })
}

fn ids(lines: &[Line]) -> BTreeSet<u32> {
    lines.iter().filter_map(|line| line.id).collect()
}

proptest! {
    #[test]
    fn empty_targets_create_every_source(sources in keyed_lines(0..50, 10), fresh in new_lines(5)) {
        let sources: Vec<Line> = sources.into_iter().chain(fresh).collect();
        let mut targets = Vec::new();

        let outcome = line_reconciler().reconcile(&sources, &mut targets).unwrap();

        prop_assert_eq!(outcome.created, sources.len());
        prop_assert_eq!(outcome.updated, 0);
        prop_assert_eq!(&targets, &sources);
    }

    #[test]
    fn exact_match_updates_only(targets in keyed_lines(0..50, 12), bump in 1u32..10) {
        let sources: Vec<Line> = targets
            .iter()
            .map(|line| Line { quantity: line.quantity + bump, ..line.clone() })
            .collect();
        let mut reconciled = targets.clone();

        let outcome = line_reconciler().reconcile(&sources, &mut reconciled).unwrap();

        prop_assert_eq!(outcome.created, 0);
        prop_assert!(outcome.removed.is_empty());
        prop_assert_eq!(reconciled.len(), targets.len());
        prop_assert_eq!(&reconciled, &sources);
    }

    #[test]
    fn orphans_are_removed(sources in keyed_lines(0..30, 10), orphans in keyed_lines(100..130, 10)) {
        let mut targets: Vec<Line> = sources.iter().cloned().chain(orphans.iter().cloned()).collect();

        let outcome = line_reconciler().reconcile(&sources, &mut targets).unwrap();

        prop_assert!(ids(&targets).is_disjoint(&ids(&orphans)));
        prop_assert_eq!(&outcome.removed, &orphans);
    }

    #[test]
    fn second_run_is_a_fixed_point(
        sources in keyed_lines(0..40, 10),
        fresh in distinct_new_lines(6),
        targets in keyed_lines(0..40, 10),
        policy in prop_oneof![Just(DuplicatePolicy::FirstMatchWins), Just(DuplicatePolicy::OneToOne)],
    ) {
        let sources: Vec<Line> = sources.into_iter().chain(fresh).collect();
        let reconciler = line_reconciler().with_policy(policy);
        let mut targets = targets;

        reconciler.reconcile(&sources, &mut targets).unwrap();
        let first = targets.clone();
        let outcome = reconciler.reconcile(&sources, &mut targets).unwrap();

        prop_assert!(outcome.is_membership_unchanged());
        prop_assert_eq!(targets, first);
    }

    #[test]
    fn membership_is_the_image_of_sources(
        sources in keyed_lines(0..40, 10),
        fresh in new_lines(4),
        targets in keyed_lines(0..40, 10),
    ) {
        let sources: Vec<Line> = sources.into_iter().chain(fresh).collect();
        let mut reconciled = targets.clone();

        let outcome = line_reconciler().reconcile(&sources, &mut reconciled).unwrap();

        prop_assert_eq!(reconciled.len(), sources.len());
        prop_assert_eq!(ids(&reconciled), ids(&sources));
        prop_assert_eq!(outcome.created + outcome.updated, sources.len());
        prop_assert_eq!(targets.len(), outcome.updated + outcome.removed.len());
    }
}
