use crate::{Identifier, MatchFunction};

/// Decides whether a source record and a target record represent the same child.
///
/// Implementations must be pure: the same pair always yields the same answer.
pub trait IdentityComparer<S, T> {
    /// `true` if `source` and `target` are the same child.
    fn matches(&self, source: &S, target: &T) -> bool;
}

/// The default identity rule: both records carry a persisted key and the keys are equal.
///
/// A record without a key never matches anything, so it is always created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityKeyComparer;

impl<S, T> IdentityComparer<S, T> for IdentityKeyComparer
where
    S: Identifier,
    T: Identifier<Id = S::Id>,
{
    fn matches(&self, source: &S, target: &T) -> bool {
        match (source.identifier(), target.identifier()) {
            (Some(source_id), Some(target_id)) => source_id == target_id,
            _ => false,
        }
    }
}

/// Compares records by a business key extracted from each side.
///
/// Useful when the persisted key of the source has not been assigned yet.
///
/// ```
/// use cart_reconcile::comparer::{IdentityComparer, KeyComparer};
///
/// struct Tax { name: String }
///
/// let by_name = KeyComparer::new(|s: &Tax| s.name.to_lowercase(), |t: &Tax| t.name.to_lowercase());
/// assert!(by_name.matches(&Tax { name: "VAT".into() }, &Tax { name: "vat".into() }));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KeyComparer<FS, FT> {
    source_key: FS,
    target_key: FT,
}

impl<FS, FT> KeyComparer<FS, FT> {
    /// Creates a comparer from the two key extractors.
    pub fn new(source_key: FS, target_key: FT) -> Self {
        KeyComparer {
            source_key,
            target_key,
        }
    }
}

impl<S, T, K, FS, FT> IdentityComparer<S, T> for KeyComparer<FS, FT>
where
    K: PartialEq,
    FS: Fn(&S) -> K,
    FT: Fn(&T) -> K,
{
    fn matches(&self, source: &S, target: &T) -> bool {
        (self.source_key)(source) == (self.target_key)(target)
    }
}

/// Compares by persisted key when both records carry one, by a business key otherwise.
///
/// A record created in an earlier pass has no key until it is saved; the business key lets the next pass find it
/// again instead of recreating it. A business key of `None` never matches.
///
/// ```
/// use cart_reconcile::comparer::{IdentityComparer, IdentityOrKeyComparer};
/// use cart_reconcile::Identifier;
///
/// struct Item { id: Option<u32>, sku: String }
///
/// impl Identifier for Item {
///     type Id = u32;
///     fn identifier(&self) -> Option<&u32> { self.id.as_ref() }
/// }
///
/// let comparer = IdentityOrKeyComparer::new(|i: &Item| Some(i.sku.clone()), |i: &Item| Some(i.sku.clone()));
/// let saved = Item { id: Some(1), sku: "a".into() };
/// let fresh = Item { id: None, sku: "a".into() };
///
/// assert!(comparer.matches(&fresh, &fresh));
/// assert!(comparer.matches(&fresh, &saved));
/// assert!(!comparer.matches(&Item { id: Some(2), sku: "a".into() }, &saved));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct IdentityOrKeyComparer<FS, FT> {
    source_key: FS,
    target_key: FT,
}

impl<FS, FT> IdentityOrKeyComparer<FS, FT> {
    /// Creates a comparer from the two business key extractors.
    pub fn new(source_key: FS, target_key: FT) -> Self {
        IdentityOrKeyComparer {
            source_key,
            target_key,
        }
    }
}

impl<S, T, K, FS, FT> IdentityComparer<S, T> for IdentityOrKeyComparer<FS, FT>
where
    S: Identifier,
    T: Identifier<Id = S::Id>,
    K: PartialEq,
    FS: Fn(&S) -> Option<K>,
    FT: Fn(&T) -> Option<K>,
{
    fn matches(&self, source: &S, target: &T) -> bool {
        if let (Some(source_id), Some(target_id)) = (source.identifier(), target.identifier()) {
            return source_id == target_id;
        }
        match ((self.source_key)(source), (self.target_key)(target)) {
            (Some(source_key), Some(target_key)) => source_key == target_key,
            _ => false,
        }
    }
}

/// Boxes a comparer into a [MatchFunction] usable as [crate::reconciler::Reconciler::matches].
#[cfg(not(feature = "not-send-futures"))]
pub fn match_function<'a, S, T, C>(comparer: C) -> MatchFunction<'a, S, T>
where
    C: IdentityComparer<S, T> + Send + Sync + 'a,
{
    Box::new(move |source: &S, target: &T| comparer.matches(source, target))
}

/// Boxes a comparer into a [MatchFunction] usable as [crate::reconciler::Reconciler::matches].
#[cfg(feature = "not-send-futures")]
pub fn match_function<'a, S, T, C>(comparer: C) -> MatchFunction<'a, S, T>
where
    C: IdentityComparer<S, T> + 'a,
{
    Box::new(move |source: &S, target: &T| comparer.matches(source, target))
}
