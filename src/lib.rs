#![deny(missing_docs)]
//! # Cart Reconcile
//!
//! A shopping-cart shipment is persisted as a parent record that owns several child collections: line items,
//! addresses, discounts and tax details. When a shipment arrives from the outside world (an API request, a
//! recalculated cart), the persisted record has to be brought in line with it. Children that still exist are
//! updated in place, children that are new are created, and children that disappeared are released so the
//! persistence layer can delete them.
//!
//! This crate provides that reconciliation as a small, pure component, plus the shipment records that use it.
//!
//! ## Reconciler
//!
//! `Reconciler` is a datatype/struct that represents the collection reconciliation algorithm. It belongs to the
//! Domain layer. It has three generic parameters `S`, `T`, `Error`, representing the source record, the target
//! (persisted) record and the error that the callbacks may produce.
//!
//! - `S` - Source record
//! - `T` - Target record
//! - `Error` - Callback error
//!
//! ```rust
//! pub type MatchFunction<'a, S, T> = Box<dyn Fn(&S, &T) -> bool + 'a + Send + Sync>;
//! pub type UpdateFunction<'a, S, T, Error> = Box<dyn Fn(&S, &mut T) -> Result<(), Error> + 'a + Send + Sync>;
//! pub type CreateFunction<'a, S, T, Error> = Box<dyn Fn(&S) -> Result<T, Error> + 'a + Send + Sync>;
//! ```
//!
//! The algorithm:
//!
//! 1. every source is paired with the first pre-existing target that `matches` it, and the pair is `update`d,
//! 2. a source without a pair is turned into a new target by `create`, which is appended,
//! 3. pre-existing targets that no source claimed are removed and handed back to the caller.
//!
//! ```rust
//! use cart_reconcile::reconciler::{reconcile, DuplicatePolicy};
//!
//! #[derive(Debug, PartialEq)]
//! struct Line {
//!     id: u32,
//!     quantity: u32,
//! }
//!
//! let sources = vec![Line { id: 1, quantity: 2 }, Line { id: 3, quantity: 1 }];
//! let mut targets = vec![Line { id: 1, quantity: 1 }, Line { id: 2, quantity: 5 }];
//!
//! let outcome = reconcile::<_, _, ()>(
//!     &sources,
//!     &mut targets,
//!     DuplicatePolicy::default(),
//!     |source, target| source.id == target.id,
//!     |source, target| {
//!         target.quantity = source.quantity;
//!         Ok(())
//!     },
//!     |source| Ok(Line { id: source.id, quantity: source.quantity }),
//! )
//! .unwrap();
//!
//! assert_eq!(targets, vec![Line { id: 1, quantity: 2 }, Line { id: 3, quantity: 1 }]);
//! assert_eq!(outcome.created, 1);
//! assert_eq!(outcome.updated, 1);
//! assert_eq!(outcome.removed, vec![Line { id: 2, quantity: 5 }]);
//! ```
//!
//! ## Shipment entities
//!
//! [shipment::ShipmentEntity] is the persisted shipment. `patch` copies every scalar field onto a target
//! shipment and reconciles each child collection with the appropriate identity rule. `to_model` / `from_model`
//! translate between the persisted record and the [shipment::Shipment] domain object.
//!
//! ## Shipment patcher
//!
//! [aggregate::ShipmentPatcher] belongs to the Application layer. It fetches the persisted shipment via
//! [aggregate::ShipmentRepository], patches it, and saves it together with the released children.

#[cfg(not(feature = "not-send-futures"))]
use std::sync::Arc;

/// Aggregate module - belongs to the `Application` layer - composes pure reconciliation and effects (fetching, storing)
pub mod aggregate;
/// Comparer module - identity rules used to pair source and target records
pub mod comparer;
/// Error module - errors raised by the reconciliation algorithm
pub mod error;
/// Factory module - registry of named constructors used instead of reflective instantiation
pub mod factory;
/// Notification module - cart notification payloads
pub mod notification;
/// Reconciler module - belongs to the `Domain` layer - pure collection reconciliation algorithm
pub mod reconciler;
/// Shipment module - persisted shipment records, their domain counterparts and conversions between them
pub mod shipment;
/// Specification module - a given/when/then test DSL for reconcilers
pub mod specification;

/// The [MatchFunction] function decides whether a source record and a target record represent the same child.
#[cfg(not(feature = "not-send-futures"))]
pub type MatchFunction<'a, S, T> = Box<dyn Fn(&S, &T) -> bool + 'a + Send + Sync>;
/// The [UpdateFunction] function copies the mutable fields of a source record onto its matched target record.
#[cfg(not(feature = "not-send-futures"))]
pub type UpdateFunction<'a, S, T, Error = ()> =
    Box<dyn Fn(&S, &mut T) -> Result<(), Error> + 'a + Send + Sync>;
/// The [CreateFunction] function builds a brand-new target record from an unmatched source record.
#[cfg(not(feature = "not-send-futures"))]
pub type CreateFunction<'a, S, T, Error = ()> =
    Box<dyn Fn(&S) -> Result<T, Error> + 'a + Send + Sync>;
/// The [ConstructorFunction] function builds a default instance of a registered type.
#[cfg(not(feature = "not-send-futures"))]
pub type ConstructorFunction<'a, T> = Arc<dyn Fn() -> T + 'a + Send + Sync>;

/// The [MatchFunction] function decides whether a source record and a target record represent the same child.
#[cfg(feature = "not-send-futures")]
pub type MatchFunction<'a, S, T> = Box<dyn Fn(&S, &T) -> bool + 'a>;
/// The [UpdateFunction] function copies the mutable fields of a source record onto its matched target record.
#[cfg(feature = "not-send-futures")]
pub type UpdateFunction<'a, S, T, Error = ()> = Box<dyn Fn(&S, &mut T) -> Result<(), Error> + 'a>;
/// The [CreateFunction] function builds a brand-new target record from an unmatched source record.
#[cfg(feature = "not-send-futures")]
pub type CreateFunction<'a, S, T, Error = ()> = Box<dyn Fn(&S) -> Result<T, Error> + 'a>;
/// The [ConstructorFunction] function builds a default instance of a registered type.
#[cfg(feature = "not-send-futures")]
pub type ConstructorFunction<'a, T> = std::rc::Rc<dyn Fn() -> T + 'a>;

/// Identifies a record by its persisted key.
///
/// `None` means the record has not been assigned a key yet (it was never stored).
pub trait Identifier {
    /// The key type.
    type Id: PartialEq;

    /// Returns the persisted key of this record, if any.
    fn identifier(&self) -> Option<&Self::Id>;
}
