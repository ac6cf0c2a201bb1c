use cart_reconcile::comparer::{match_function, IdentityKeyComparer, KeyComparer};
use cart_reconcile::error::ReconcileError;
use cart_reconcile::reconciler::{
    reconcile, CollectionReconciliation, DuplicatePolicy, ReconcileOptions, Reconciler,
    Reconciliation,
};
use cart_reconcile::specification::ReconcilerTestSpecification;
use pretty_assertions::assert_eq;

use crate::api::{init_test_logging, line, line_reconciler, new_line, Line, LineError};

mod api;

#[test]
fn update_in_place_test() {
    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler())
        .given(vec![line(1, 1)])
        .when(vec![line(1, 2)])
        .then_outcome(
            vec![line(1, 2)],
            Reconciliation {
                created: 0,
                updated: 1,
                removed: vec![],
            },
        );
}

#[test]
fn create_missing_test() {
    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler())
        .given(vec![line(1, 1)])
        .when(vec![line(1, 1), line(2, 1)])
        .then_outcome(
            vec![line(1, 1), line(2, 1)],
            Reconciliation {
                created: 1,
                updated: 1,
                removed: vec![],
            },
        );
}

#[test]
fn remove_all_test() {
    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler())
        .given(vec![line(1, 1), line(2, 1)])
        .when(vec![])
        .then_outcome(
            vec![],
            Reconciliation {
                created: 0,
                updated: 0,
                removed: vec![line(1, 1), line(2, 1)],
            },
        );
}

#[test]
fn empty_targets_test() {
    let sources = vec![new_line("a", 1), new_line("b", 2), line(9, 3)];

    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler())
        .given(vec![])
        .when(sources.clone())
        .then_outcome(
            sources,
            Reconciliation {
                created: 3,
                updated: 0,
                removed: vec![],
            },
        );
}

#[test]
fn ordering_test() {
    // claimed targets keep their relative order, created ones are appended in source order
    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler())
        .given(vec![line(1, 1), line(2, 1), line(3, 1), line(4, 1)])
        .when(vec![new_line("x", 1), line(4, 5), line(2, 5), new_line("y", 1)])
        .then_outcome(
            vec![line(2, 5), line(4, 5), new_line("x", 1), new_line("y", 1)],
            Reconciliation {
                created: 2,
                updated: 2,
                removed: vec![line(1, 1), line(3, 1)],
            },
        );
}

#[test]
fn new_sources_never_match_created_records_test() {
    // two sources without a key both get their own record
    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler())
        .given(vec![])
        .when(vec![new_line("a", 1), new_line("a", 1)])
        .then(vec![new_line("a", 1), new_line("a", 1)]);
}

#[test]
fn unsaved_records_are_found_again_test() {
    let reconciler = line_reconciler();
    let sources = vec![new_line("a", 1), line(1, 2)];
    let mut targets = vec![line(1, 1)];

    let first = reconciler.reconcile(&sources, &mut targets).unwrap();
    let second = reconciler.reconcile(&sources, &mut targets).unwrap();

    assert_eq!(first.created, 1);
    assert!(second.is_membership_unchanged());
    assert_eq!(second.updated, 2);
    assert_eq!(targets, vec![line(1, 2), new_line("a", 1)]);
}

#[test]
fn keyed_records_never_fall_back_to_sku_test() {
    // both sides are saved, so differing keys mean different lines even with the same sku
    let renamed = Line {
        id: Some(2),
        sku: "sku-1".to_string(),
        quantity: 4,
    };

    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler())
        .given(vec![line(1, 1)])
        .when(vec![renamed.clone()])
        .then_outcome(
            vec![renamed],
            Reconciliation {
                created: 1,
                updated: 0,
                removed: vec![line(1, 1)],
            },
        );
}

#[test]
fn sources_are_not_mutated_test() {
    let sources = vec![line(1, 7), new_line("b", 2)];
    let snapshot = sources.clone();
    let mut targets = vec![line(1, 1), line(5, 1)];

    line_reconciler().reconcile(&sources, &mut targets).unwrap();

    assert_eq!(sources, snapshot);
}

#[test]
fn first_match_wins_test() {
    init_test_logging();
    // both duplicates update the same target; the later one wins
    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler())
        .given(vec![line(1, 1)])
        .when(vec![line(1, 2), line(1, 3)])
        .then_outcome(
            vec![line(1, 3)],
            Reconciliation {
                created: 0,
                updated: 2,
                removed: vec![],
            },
        );
}

#[test]
fn one_to_one_test() {
    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler().with_policy(DuplicatePolicy::OneToOne))
        .given(vec![line(1, 1)])
        .when(vec![line(1, 2), line(1, 3)])
        .then_outcome(
            vec![line(1, 2), line(1, 3)],
            Reconciliation {
                created: 1,
                updated: 1,
                removed: vec![],
            },
        );
}

#[test]
fn reject_duplicates_test() {
    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler().with_policy(DuplicatePolicy::Reject))
        .given(vec![line(1, 1), line(2, 1)])
        .when(vec![line(2, 9), new_line("x", 1), line(1, 2), line(1, 3)])
        .then_error(
            ReconcileError::InvalidArgument(
                "sources at positions 2 and 3 both match target at position 0".to_string(),
            ),
            vec![line(1, 1), line(2, 1)],
        );
}

#[test]
fn reject_allows_distinct_sources_test() {
    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler().with_options(&ReconcileOptions {
            duplicate_policy: DuplicatePolicy::Reject,
        }))
        .given(vec![line(1, 1), line(2, 1)])
        .when(vec![line(2, 9), line(3, 1)])
        .then(vec![line(2, 9), line(3, 1)]);
}

#[test]
fn failing_update_leaves_partial_state_test() {
    // the first update and the create happened, nothing was removed
    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler())
        .given(vec![line(1, 1), line(2, 1), line(3, 1)])
        .when(vec![line(1, 5), line(4, 2), line(2, 0), line(3, 3)])
        .then_error(
            ReconcileError::Callback(LineError::Quantity(0)),
            vec![line(1, 5), line(2, 1), line(3, 1), line(4, 2)],
        );
}

#[test]
fn failing_create_test() {
    ReconcilerTestSpecification::default()
        .for_reconciler(line_reconciler())
        .given(vec![line(1, 1)])
        .when(vec![new_line("a", 0)])
        .then_error(ReconcileError::Callback(LineError::Quantity(0)), vec![line(1, 1)]);
}

#[test]
fn reconcile_optional_test() {
    let reconciler = line_reconciler();
    let sources = vec![line(1, 2)];
    let mut targets = vec![line(1, 1)];

    let missing_sources = reconciler.reconcile_optional(None, Some(&mut targets));
    assert_eq!(
        missing_sources,
        Err(ReconcileError::InvalidArgument(
            "sources collection is absent".to_string()
        ))
    );
    assert!(missing_sources.unwrap_err().is_invalid_argument());

    let missing_targets = reconciler.reconcile_optional(Some(sources.as_slice()), None);
    assert_eq!(
        missing_targets,
        Err(ReconcileError::InvalidArgument(
            "targets collection is absent".to_string()
        ))
    );
    assert_eq!(targets, vec![line(1, 1)]);

    let outcome = reconciler
        .reconcile_optional(Some(sources.as_slice()), Some(&mut targets))
        .unwrap();
    assert!(outcome.is_membership_unchanged());
    assert_eq!(targets, vec![line(1, 2)]);
}

#[derive(Debug, Clone, PartialEq)]
struct Request {
    line_id: Option<u32>,
    sku: String,
    qty: u32,
}

#[test]
fn map_source_test() {
    let reconciler: Reconciler<Request, Line, LineError> =
        line_reconciler().map_source(|request: &Request| Line {
            id: request.line_id,
            sku: request.sku.to_owned(),
            quantity: request.qty,
        });

    ReconcilerTestSpecification::default()
        .for_reconciler(reconciler)
        .given(vec![line(1, 1), line(2, 2)])
        .when(vec![
            Request {
                line_id: Some(2),
                sku: "sku-2".to_string(),
                qty: 6,
            },
            Request {
                line_id: None,
                sku: "new".to_string(),
                qty: 1,
            },
        ])
        .then(vec![line(2, 6), new_line("new", 1)]);
}

#[test]
fn map_error_test() {
    let reconciler = line_reconciler().map_error(|error: &LineError| error.to_string());

    ReconcilerTestSpecification::default()
        .for_reconciler(reconciler)
        .given(vec![line(1, 1)])
        .when(vec![line(1, 0)])
        .then_error(
            ReconcileError::Callback("quantity 0 is not allowed".to_string()),
            vec![line(1, 1)],
        );
}

#[test]
fn comparer_reconciler_test() {
    // business key: lines are the same when their sku matches, whatever their keys
    let reconciler: Reconciler<Line, Line> = Reconciler {
        matches: match_function(KeyComparer::new(
            |source: &Line| source.sku.to_owned(),
            |target: &Line| target.sku.to_owned(),
        )),
        update: Box::new(|source, target| {
            target.quantity = source.quantity;
            Ok(())
        }),
        create: Box::new(|source| Ok(source.clone())),
        policy: DuplicatePolicy::default(),
    };

    ReconcilerTestSpecification::default()
        .for_reconciler(reconciler)
        .given(vec![line(1, 1), line(2, 1)])
        .when(vec![new_line("sku-2", 4)])
        .then(vec![line(2, 4)]);
}

#[test]
fn identity_key_comparer_test() {
    let reconciler: Reconciler<Line, Line> = Reconciler {
        matches: match_function(IdentityKeyComparer),
        update: Box::new(|source, target| {
            target.quantity = source.quantity;
            Ok(())
        }),
        create: Box::new(|source| Ok(source.clone())),
        policy: DuplicatePolicy::default(),
    };
    let mut targets = vec![new_line("a", 1), line(1, 1)];

    let outcome = reconciler
        .reconcile(&[new_line("a", 2), line(1, 3)], &mut targets)
        .unwrap();

    // a record without a key never matches, not even an identical one
    assert_eq!(targets, vec![line(1, 3), new_line("a", 2)]);
    assert_eq!(outcome.removed, vec![new_line("a", 1)]);
}

#[test]
fn free_function_test() {
    let sources = vec![(1_u32, 10_u32), (3, 30)];
    let mut targets = vec![(1_u32, 1_u32), (2, 2)];

    let outcome = reconcile::<_, _, ()>(
        &sources,
        &mut targets,
        DuplicatePolicy::default(),
        |source, target| source.0 == target.0,
        |source, target| {
            target.1 = source.1;
            Ok(())
        },
        |source| Ok(*source),
    )
    .unwrap();

    assert_eq!(targets, vec![(1, 10), (3, 30)]);
    assert_eq!(outcome.removed, vec![(2, 2)]);

    let ids = outcome.map_removed(|(id, _)| id);
    assert_eq!(ids.removed, vec![2]);
}

#[test]
fn options_from_config_test() {
    let options: ReconcileOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options.duplicate_policy, DuplicatePolicy::FirstMatchWins);

    let options: ReconcileOptions =
        serde_json::from_str(r#"{"duplicate_policy": "one_to_one"}"#).unwrap();
    assert_eq!(options.duplicate_policy, DuplicatePolicy::OneToOne);
}
