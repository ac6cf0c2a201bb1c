#[cfg(feature = "not-send-futures")]
use std::rc::Rc;
#[cfg(not(feature = "not-send-futures"))]
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ReconcileError, ReconcileResult};
use crate::{CreateFunction, MatchFunction, UpdateFunction};

/// How sources that resolve to the same pre-existing target are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Every source pairs with the first matching target, even one already claimed.
    /// The last source's `update` wins.
    #[default]
    FirstMatchWins,
    /// A claimed target is skipped; a duplicate source pairs with the next unclaimed match or is created.
    OneToOne,
    /// Two sources resolving to the same target fail with [ReconcileError::InvalidArgument] before any mutation.
    Reject,
}

/// Reconciliation settings, meant to be embedded in an application's configuration.
///
/// ```
/// use cart_reconcile::reconciler::{DuplicatePolicy, ReconcileOptions};
///
/// let options: ReconcileOptions = serde_json::from_str(r#"{"duplicate_policy": "reject"}"#).unwrap();
/// assert_eq!(options.duplicate_policy, DuplicatePolicy::Reject);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    /// Duplicate handling, see [DuplicatePolicy].
    pub duplicate_policy: DuplicatePolicy,
}

/// The result of a successful reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation<T> {
    /// Number of targets produced by `create` and appended.
    pub created: usize,
    /// Number of `update` calls. Can exceed the number of targets under [DuplicatePolicy::FirstMatchWins].
    pub updated: usize,
    /// Pre-existing targets that no source claimed, in their prior relative order.
    /// Ownership is released to the caller, which typically schedules their deletion.
    pub removed: Vec<T>,
}

impl<T> Default for Reconciliation<T> {
    fn default() -> Self {
        Self {
            created: 0,
            updated: 0,
            removed: Vec::new(),
        }
    }
}

impl<T> Reconciliation<T> {
    /// `true` when nothing was created and nothing was removed.
    pub fn is_membership_unchanged(&self) -> bool {
        self.created == 0 && self.removed.is_empty()
    }

    /// Maps the removed records into another type.
    pub fn map_removed<T2, F>(self, f: F) -> Reconciliation<T2>
    where
        F: FnMut(T) -> T2,
    {
        Reconciliation {
            created: self.created,
            updated: self.updated,
            removed: self.removed.into_iter().map(f).collect(),
        }
    }
}

/// Formalizes the `Collection Reconciliation` algorithm: bring a target collection in line with a source collection.
pub trait CollectionReconciliation<S, T, Error = ()> {
    /// Reconciles `targets` against `sources` in place.
    fn reconcile(
        &self,
        sources: &[S],
        targets: &mut Vec<T>,
    ) -> ReconcileResult<Reconciliation<T>, Error>;

    /// Reconciles possibly absent collections.
    /// An absent collection fails with [ReconcileError::InvalidArgument] and nothing is mutated.
    fn reconcile_optional(
        &self,
        sources: Option<&[S]>,
        targets: Option<&mut Vec<T>>,
    ) -> ReconcileResult<Reconciliation<T>, Error> {
        match (sources, targets) {
            (Some(sources), Some(targets)) => self.reconcile(sources, targets),
            (None, _) => Err(ReconcileError::InvalidArgument(
                "sources collection is absent".to_string(),
            )),
            (_, None) => Err(ReconcileError::InvalidArgument(
                "targets collection is absent".to_string(),
            )),
        }
    }
}

/// [Reconciler] bundles the three functions of the collection reconciliation algorithm.
/// It has three generic parameters `S`/`Source`, `T`/`Target`, `Error`, representing the source record, the persisted
/// record and the error the callbacks may produce.
/// `'a` is used as a lifetime parameter, indicating that all references contained within the struct (e.g., references within the function closures) must have a lifetime that is at least as long as 'a.
///
/// ## Example
/// ```
/// use cart_reconcile::reconciler::{CollectionReconciliation, DuplicatePolicy, Reconciler};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct ItemSource {
///     line_item_id: String,
///     quantity: u32,
/// }
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct ItemRecord {
///     id: Option<u64>,
///     line_item_id: String,
///     quantity: u32,
/// }
///
/// fn reconciler<'a>() -> Reconciler<'a, ItemSource, ItemRecord> {
///     Reconciler {
///         matches: Box::new(|source, target| source.line_item_id == target.line_item_id),
///         update: Box::new(|source, target| {
///             target.quantity = source.quantity;
///             Ok(())
///         }),
///         create: Box::new(|source| {
///             Ok(ItemRecord {
///                 id: None,
///                 line_item_id: source.line_item_id.to_owned(),
///                 quantity: source.quantity,
///             })
///         }),
///         policy: DuplicatePolicy::OneToOne,
///     }
/// }
///
/// let mut records = vec![ItemRecord { id: Some(7), line_item_id: "li-1".to_string(), quantity: 1 }];
/// let sources = vec![
///     ItemSource { line_item_id: "li-1".to_string(), quantity: 4 },
///     ItemSource { line_item_id: "li-2".to_string(), quantity: 1 },
/// ];
/// let outcome = reconciler().reconcile(&sources, &mut records).unwrap();
///
/// assert_eq!(outcome.created, 1);
/// assert_eq!(records[0], ItemRecord { id: Some(7), line_item_id: "li-1".to_string(), quantity: 4 });
/// assert_eq!(records[1].id, None);
/// ```
pub struct Reconciler<'a, S: 'a, T: 'a, Error: 'a = ()> {
    /// The `matches` function decides whether a source and a target are the same child. Must be pure.
    pub matches: MatchFunction<'a, S, T>,
    /// The `update` function copies a source's mutable fields onto its matched target. Must keep the target's identity.
    pub update: UpdateFunction<'a, S, T, Error>,
    /// The `create` function builds a new target for an unmatched source.
    pub create: CreateFunction<'a, S, T, Error>,
    /// Duplicate handling, see [DuplicatePolicy].
    pub policy: DuplicatePolicy,
}

impl<'a, S, T, Error> Reconciler<'a, S, T, Error> {
    /// Replaces the duplicate policy.
    pub fn with_policy(self, policy: DuplicatePolicy) -> Self {
        Reconciler { policy, ..self }
    }

    /// Applies the reconciliation options.
    pub fn with_options(self, options: &ReconcileOptions) -> Self {
        self.with_policy(options.duplicate_policy)
    }

    /// Maps the Reconciler over the S/Source type parameter.
    /// Creates a new instance of [Reconciler]`<S2, T, Error>`.
    #[cfg(not(feature = "not-send-futures"))]
    pub fn map_source<S2, F>(self, f: F) -> Reconciler<'a, S2, T, Error>
    where
        F: Fn(&S2) -> S + Send + Sync + 'a,
    {
        let f = Arc::new(f);

        let new_matches = {
            let f = Arc::clone(&f);
            Box::new(move |s2: &S2, t: &T| (self.matches)(&f(s2), t))
        };

        let new_update = {
            let f = Arc::clone(&f);
            Box::new(move |s2: &S2, t: &mut T| (self.update)(&f(s2), t))
        };

        let new_create = Box::new(move |s2: &S2| (self.create)(&f(s2)));

        Reconciler {
            matches: new_matches,
            update: new_update,
            create: new_create,
            policy: self.policy,
        }
    }

    /// Maps the Reconciler over the S/Source type parameter.
    /// Creates a new instance of [Reconciler]`<S2, T, Error>`.
    #[cfg(feature = "not-send-futures")]
    pub fn map_source<S2, F>(self, f: F) -> Reconciler<'a, S2, T, Error>
    where
        F: Fn(&S2) -> S + 'a,
    {
        let f = Rc::new(f);

        let new_matches = {
            let f = Rc::clone(&f);
            Box::new(move |s2: &S2, t: &T| (self.matches)(&f(s2), t))
        };

        let new_update = {
            let f = Rc::clone(&f);
            Box::new(move |s2: &S2, t: &mut T| (self.update)(&f(s2), t))
        };

        let new_create = Box::new(move |s2: &S2| (self.create)(&f(s2)));

        Reconciler {
            matches: new_matches,
            update: new_update,
            create: new_create,
            policy: self.policy,
        }
    }

    /// Maps the Reconciler over the Error type parameter.
    /// Creates a new instance of [Reconciler]`<S, T, Error2>`.
    #[cfg(not(feature = "not-send-futures"))]
    pub fn map_error<Error2, F>(self, f: F) -> Reconciler<'a, S, T, Error2>
    where
        F: Fn(&Error) -> Error2 + Send + Sync + 'a,
    {
        let f = Arc::new(f);

        let new_update = {
            let f = Arc::clone(&f);
            Box::new(move |s: &S, t: &mut T| (self.update)(s, t).map_err(|e| f(&e)))
        };

        let new_create = Box::new(move |s: &S| (self.create)(s).map_err(|e| f(&e)));

        Reconciler {
            matches: self.matches,
            update: new_update,
            create: new_create,
            policy: self.policy,
        }
    }

    /// Maps the Reconciler over the Error type parameter.
    /// Creates a new instance of [Reconciler]`<S, T, Error2>`.
    #[cfg(feature = "not-send-futures")]
    pub fn map_error<Error2, F>(self, f: F) -> Reconciler<'a, S, T, Error2>
    where
        F: Fn(&Error) -> Error2 + 'a,
    {
        let f = Rc::new(f);

        let new_update = {
            let f = Rc::clone(&f);
            Box::new(move |s: &S, t: &mut T| (self.update)(s, t).map_err(|e| f(&e)))
        };

        let new_create = Box::new(move |s: &S| (self.create)(s).map_err(|e| f(&e)));

        Reconciler {
            matches: self.matches,
            update: new_update,
            create: new_create,
            policy: self.policy,
        }
    }
}

impl<S, T, Error> CollectionReconciliation<S, T, Error> for Reconciler<'_, S, T, Error> {
    fn reconcile(
        &self,
        sources: &[S],
        targets: &mut Vec<T>,
    ) -> ReconcileResult<Reconciliation<T>, Error> {
        reconcile(
            sources,
            targets,
            self.policy,
            &self.matches,
            &self.update,
            &self.create,
        )
    }
}

/// Reconciles `targets` against `sources` in place.
///
/// Each source is paired with the first pre-existing target it `matches` (subject to `policy`); paired targets are
/// `update`d, unpaired sources are `create`d and appended. Pre-existing targets left unclaimed are removed and
/// returned in [Reconciliation::removed]. Claimed targets keep their relative order, created ones follow in source
/// order. Records created during this call are never matched by later sources.
///
/// A failing callback aborts the call. Updates and appends made up to that point stay in `targets`, nothing is
/// removed, and the error is returned as [ReconcileError::Callback].
pub fn reconcile<S, T, Error>(
    sources: &[S],
    targets: &mut Vec<T>,
    policy: DuplicatePolicy,
    matches: impl Fn(&S, &T) -> bool,
    update: impl Fn(&S, &mut T) -> Result<(), Error>,
    create: impl Fn(&S) -> Result<T, Error>,
) -> ReconcileResult<Reconciliation<T>, Error> {
    let existing = targets.len();
    let pairs = pair_sources::<S, T, Error, _>(sources, targets, policy, &matches)?;

    let mut created = 0;
    let mut updated = 0;
    for (source, pair) in sources.iter().zip(&pairs) {
        match pair {
            Some(index) => {
                update(source, &mut targets[*index]).map_err(ReconcileError::Callback)?;
                updated += 1;
            }
            None => {
                let target = create(source).map_err(ReconcileError::Callback)?;
                targets.push(target);
                created += 1;
            }
        }
    }

    let mut claimed = vec![false; existing];
    for index in pairs.iter().flatten() {
        claimed[*index] = true;
    }

    let appended = targets.split_off(existing);
    let mut removed = Vec::new();
    for (target, keep) in std::mem::take(targets).into_iter().zip(claimed) {
        if keep {
            targets.push(target);
        } else {
            removed.push(target);
        }
    }
    targets.extend(appended);

    debug!(
        created,
        updated,
        removed = removed.len(),
        "reconciled {} source(s) against {} target(s)",
        sources.len(),
        existing
    );

    Ok(Reconciliation {
        created,
        updated,
        removed,
    })
}

/// Resolves, for every source, the index of the pre-existing target it pairs with.
/// Runs before any mutation, so a rejected duplicate leaves the targets untouched.
fn pair_sources<S, T, Error, M>(
    sources: &[S],
    targets: &[T],
    policy: DuplicatePolicy,
    matches: &M,
) -> ReconcileResult<Vec<Option<usize>>, Error>
where
    M: Fn(&S, &T) -> bool,
{
    let mut claimed_by: Vec<Option<usize>> = vec![None; targets.len()];
    let mut pairs = Vec::with_capacity(sources.len());

    for (position, source) in sources.iter().enumerate() {
        let candidate = match policy {
            DuplicatePolicy::OneToOne => targets
                .iter()
                .enumerate()
                .find(|(index, target)| claimed_by[*index].is_none() && matches(source, target))
                .map(|(index, _)| index),
            DuplicatePolicy::FirstMatchWins | DuplicatePolicy::Reject => {
                targets.iter().position(|target| matches(source, target))
            }
        };

        if let Some(index) = candidate {
            if let Some(first) = claimed_by[index] {
                if policy == DuplicatePolicy::Reject {
                    return Err(ReconcileError::InvalidArgument(format!(
                        "sources at positions {first} and {position} both match target at position {index}"
                    )));
                }
                warn!(
                    first,
                    position, index, "duplicate source identity; the later update wins"
                );
            }
            claimed_by[index] = Some(position);
        }
        pairs.push(candidate);
    }

    Ok(pairs)
}
