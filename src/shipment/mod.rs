//! Shipment records of a shopping cart and their domain counterparts.
//!
//! - [ShipmentEntity] - the persisted shipment with its child collections, and `patch` to reconcile one onto another
//! - [Shipment] - the domain object the cart works with
//! - [ModelFactory] / [PrimaryKeyMap] - plumbing for `to_model` / `from_model`

use thiserror::Error;
use validator::ValidationErrors;

/// Conversions between records and domain objects.
pub mod convert;
/// Persisted records.
#[allow(missing_docs)]
pub mod entity;
/// Domain objects.
#[allow(missing_docs)]
pub mod model;

pub use convert::{KeyPair, ModelFactory, PrimaryKeyMap, RecordKind};
pub use entity::{
    AddressComparer, AddressEntity, DiscountComparer, DiscountEntity, PatchReport, RemovedChildren,
    ShipmentEntity, ShipmentItemComparer, ShipmentItemEntity, TaxDetailComparer, TaxDetailEntity,
};
pub use model::{Address, AddressType, Discount, Shipment, ShipmentItem, TaxDetail};

/// Errors raised while validating or patching shipments.
#[derive(Debug, Error)]
pub enum ShipmentError {
    /// A record breaks a storage limit.
    #[error("invalid {record}: {errors}")]
    Validation {
        /// The offending record or collection.
        record: &'static str,
        /// What is wrong with it.
        errors: ValidationErrors,
    },

    /// A child collection could not be reconciled.
    #[error("cannot reconcile {collection}: {message}")]
    Reconcile {
        /// The child collection.
        collection: &'static str,
        /// Why.
        message: String,
    },
}

impl ShipmentError {
    pub(crate) fn validation(record: &'static str, errors: ValidationErrors) -> Self {
        ShipmentError::Validation { record, errors }
    }
}
