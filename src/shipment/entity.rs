//! Persisted shipment records.
//!
//! String length limits mirror the storage columns and are enforced by [validator::Validate].

use std::convert::Infallible;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::comparer::{IdentityComparer, IdentityOrKeyComparer};
use crate::error::ReconcileError;
use crate::reconciler::{reconcile, DuplicatePolicy, ReconcileOptions, Reconciliation};
use crate::shipment::model::AddressType;
use crate::shipment::ShipmentError;
use crate::Identifier;

/// The persisted shipment of a shopping cart.
///
/// Child collections are `None` when they were not loaded or not supplied. A `None` collection on the source side
/// of [ShipmentEntity::patch] leaves the target's collection untouched; `Some(vec![])` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentEntity {
    pub id: Option<String>,
    #[validate(length(max = 64))]
    pub shipment_method_code: Option<String>,
    #[validate(length(max = 64))]
    pub shipment_method_option: Option<String>,
    #[validate(length(max = 64))]
    pub fulfilment_center_id: Option<String>,
    #[validate(length(max = 128))]
    pub fulfillment_center_name: Option<String>,
    #[validate(length(min = 1, max = 3))]
    pub currency: String,
    #[validate(length(max = 16))]
    pub weight_unit: Option<String>,
    pub weight_value: Option<Decimal>,
    pub volumetric_weight: Option<Decimal>,
    #[validate(length(max = 16))]
    pub dimension_unit: Option<String>,
    pub dimension_height: Option<Decimal>,
    pub dimension_length: Option<Decimal>,
    pub dimension_width: Option<Decimal>,
    pub tax_included: bool,
    pub price: Decimal,
    pub price_with_tax: Decimal,
    pub discount_amount: Decimal,
    pub discount_amount_with_tax: Decimal,
    pub tax_percent_rate: Decimal,
    pub tax_total: Decimal,
    pub total: Decimal,
    pub total_with_tax: Decimal,
    pub fee: Decimal,
    pub fee_with_tax: Decimal,
    #[validate(length(max = 64))]
    pub tax_type: Option<String>,
    pub shopping_cart_id: Option<String>,
    pub items: Option<Vec<ShipmentItemEntity>>,
    pub discounts: Option<Vec<DiscountEntity>>,
    pub addresses: Option<Vec<AddressEntity>>,
    pub tax_details: Option<Vec<TaxDetailEntity>>,
}

/// A shipment line, pointing at the cart line item it ships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentItemEntity {
    pub id: Option<String>,
    pub line_item_id: Option<String>,
    #[validate(length(max = 128))]
    pub bar_code: Option<String>,
    pub quantity: i32,
    pub shipment_id: Option<String>,
}

/// A persisted postal address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressEntity {
    pub id: Option<String>,
    pub address_type: AddressType,
    #[validate(length(max = 2048))]
    pub name: Option<String>,
    #[validate(length(max = 64))]
    pub organization: Option<String>,
    #[validate(length(max = 128))]
    pub first_name: Option<String>,
    #[validate(length(max = 128))]
    pub last_name: Option<String>,
    #[validate(length(max = 2048))]
    pub line1: Option<String>,
    #[validate(length(max = 2048))]
    pub line2: Option<String>,
    #[validate(length(max = 128))]
    pub city: Option<String>,
    #[validate(length(max = 128))]
    pub region_id: Option<String>,
    #[validate(length(max = 128))]
    pub region_name: Option<String>,
    #[validate(length(max = 32))]
    pub postal_code: Option<String>,
    #[validate(length(max = 3))]
    pub country_code: Option<String>,
    #[validate(length(max = 128))]
    pub country_name: Option<String>,
    #[validate(length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 64))]
    pub phone: Option<String>,
}

/// A persisted promotion reward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DiscountEntity {
    pub id: Option<String>,
    #[validate(length(max = 64))]
    pub promotion_id: Option<String>,
    #[validate(length(max = 1024))]
    pub promotion_description: Option<String>,
    #[validate(length(max = 64))]
    pub coupon_code: Option<String>,
    #[validate(length(min = 1, max = 3))]
    pub currency: String,
    pub discount_amount: Decimal,
    pub discount_amount_with_tax: Decimal,
}

/// A persisted tax line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaxDetailEntity {
    pub id: Option<String>,
    #[validate(length(max = 1024))]
    pub name: Option<String>,
    pub rate: Decimal,
    pub amount: Decimal,
}

macro_rules! impl_identifier {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl Identifier for $entity {
                type Id = String;

                fn identifier(&self) -> Option<&String> {
                    self.id.as_ref()
                }
            }
        )+
    };
}

impl_identifier!(
    ShipmentEntity,
    ShipmentItemEntity,
    AddressEntity,
    DiscountEntity,
    TaxDetailEntity,
);

/// Items are the same line when their keys are equal or, while either one is unsaved, when they ship the same cart
/// line item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShipmentItemComparer;

impl IdentityComparer<ShipmentItemEntity, ShipmentItemEntity> for ShipmentItemComparer {
    fn matches(&self, source: &ShipmentItemEntity, target: &ShipmentItemEntity) -> bool {
        IdentityOrKeyComparer::new(line_item_key, line_item_key).matches(source, target)
    }
}

/// Addresses are the same address when their keys are equal or, while either one is unsaved, when their type and
/// content are equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressComparer;

impl IdentityComparer<AddressEntity, AddressEntity> for AddressComparer {
    fn matches(&self, source: &AddressEntity, target: &AddressEntity) -> bool {
        IdentityOrKeyComparer::new(address_content, address_content).matches(source, target)
    }
}

fn line_item_key(item: &ShipmentItemEntity) -> Option<String> {
    item.line_item_id.clone()
}

fn address_content(address: &AddressEntity) -> Option<AddressEntity> {
    Some(AddressEntity {
        id: None,
        ..address.clone()
    })
}

/// Tax lines are the same line when their names are equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaxDetailComparer;

impl IdentityComparer<TaxDetailEntity, TaxDetailEntity> for TaxDetailComparer {
    fn matches(&self, source: &TaxDetailEntity, target: &TaxDetailEntity) -> bool {
        source.name == target.name
    }
}

/// Discounts are the same reward when they come from the same promotion with the same coupon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscountComparer;

impl IdentityComparer<DiscountEntity, DiscountEntity> for DiscountComparer {
    fn matches(&self, source: &DiscountEntity, target: &DiscountEntity) -> bool {
        source.promotion_id == target.promotion_id && source.coupon_code == target.coupon_code
    }
}

impl ShipmentItemEntity {
    /// Copies the mutable fields onto `target`.
    pub fn patch(&self, target: &mut ShipmentItemEntity) {
        target.line_item_id = self.line_item_id.clone();
        target.bar_code = self.bar_code.clone();
        target.quantity = self.quantity;
    }
}

impl AddressEntity {
    /// Copies the mutable fields onto `target`.
    pub fn patch(&self, target: &mut AddressEntity) {
        target.address_type = self.address_type;
        target.name = self.name.clone();
        target.organization = self.organization.clone();
        target.first_name = self.first_name.clone();
        target.last_name = self.last_name.clone();
        target.line1 = self.line1.clone();
        target.line2 = self.line2.clone();
        target.city = self.city.clone();
        target.region_id = self.region_id.clone();
        target.region_name = self.region_name.clone();
        target.postal_code = self.postal_code.clone();
        target.country_code = self.country_code.clone();
        target.country_name = self.country_name.clone();
        target.email = self.email.clone();
        target.phone = self.phone.clone();
    }
}

impl DiscountEntity {
    /// Copies the mutable fields onto `target`.
    pub fn patch(&self, target: &mut DiscountEntity) {
        target.promotion_description = self.promotion_description.clone();
        target.currency = self.currency.clone();
        target.discount_amount = self.discount_amount;
        target.discount_amount_with_tax = self.discount_amount_with_tax;
    }
}

impl TaxDetailEntity {
    /// Copies the mutable fields onto `target`.
    pub fn patch(&self, target: &mut TaxDetailEntity) {
        target.rate = self.rate;
        target.amount = self.amount;
    }
}

/// Per-collection results of [ShipmentEntity::patch].
///
/// A collection is `None` when the source did not supply it and the target's collection was left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchReport {
    pub addresses: Option<Reconciliation<AddressEntity>>,
    pub items: Option<Reconciliation<ShipmentItemEntity>>,
    pub tax_details: Option<Reconciliation<TaxDetailEntity>>,
    pub discounts: Option<Reconciliation<DiscountEntity>>,
}

/// Children released by a patch; the persistence layer deletes them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovedChildren {
    pub addresses: Vec<AddressEntity>,
    pub items: Vec<ShipmentItemEntity>,
    pub tax_details: Vec<TaxDetailEntity>,
    pub discounts: Vec<DiscountEntity>,
}

impl RemovedChildren {
    /// `true` when nothing has to be deleted.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
            && self.items.is_empty()
            && self.tax_details.is_empty()
            && self.discounts.is_empty()
    }

    /// Total number of released children.
    pub fn len(&self) -> usize {
        self.addresses.len() + self.items.len() + self.tax_details.len() + self.discounts.len()
    }
}

impl PatchReport {
    /// Total number of children created across all collections.
    pub fn created(&self) -> usize {
        self.addresses.as_ref().map_or(0, |r| r.created)
            + self.items.as_ref().map_or(0, |r| r.created)
            + self.tax_details.as_ref().map_or(0, |r| r.created)
            + self.discounts.as_ref().map_or(0, |r| r.created)
    }

    /// Total number of children updated across all collections.
    pub fn updated(&self) -> usize {
        self.addresses.as_ref().map_or(0, |r| r.updated)
            + self.items.as_ref().map_or(0, |r| r.updated)
            + self.tax_details.as_ref().map_or(0, |r| r.updated)
            + self.discounts.as_ref().map_or(0, |r| r.updated)
    }

    /// Takes the released children out of the report.
    pub fn into_removed(self) -> RemovedChildren {
        RemovedChildren {
            addresses: self.addresses.map(|r| r.removed).unwrap_or_default(),
            items: self.items.map(|r| r.removed).unwrap_or_default(),
            tax_details: self.tax_details.map(|r| r.removed).unwrap_or_default(),
            discounts: self.discounts.map(|r| r.removed).unwrap_or_default(),
        }
    }
}

impl ShipmentEntity {
    /// Copies the scalar fields onto `target` and reconciles the child collections, with the default options.
    pub fn patch(&self, target: &mut ShipmentEntity) -> Result<PatchReport, ShipmentError> {
        self.patch_with(target, &ReconcileOptions::default())
    }

    /// Copies the scalar fields onto `target` and reconciles the child collections.
    ///
    /// The target keeps its `id`, `shopping_cart_id` and `volumetric_weight`. Items are paired by
    /// [ShipmentItemComparer], addresses by [AddressComparer], tax details by [TaxDetailComparer], discounts by
    /// [DiscountComparer]. Child collections the source does not supply are left alone; a target collection that was
    /// never loaded is treated as empty.
    ///
    /// On error `target` is left exactly as it was.
    pub fn patch_with(
        &self,
        target: &mut ShipmentEntity,
        options: &ReconcileOptions,
    ) -> Result<PatchReport, ShipmentError> {
        let mut patched = target.clone();
        let report = self.patch_into(&mut patched, options)?;
        *target = patched;
        Ok(report)
    }

    fn patch_into(
        &self,
        target: &mut ShipmentEntity,
        options: &ReconcileOptions,
    ) -> Result<PatchReport, ShipmentError> {
        target.fee = self.fee;
        target.fee_with_tax = self.fee_with_tax;
        target.fulfilment_center_id = self.fulfilment_center_id.clone();
        target.fulfillment_center_name = self.fulfillment_center_name.clone();
        target.shipment_method_code = self.shipment_method_code.clone();
        target.total = self.total;
        target.total_with_tax = self.total_with_tax;
        target.tax_total = self.tax_total;
        target.price = self.price;
        target.price_with_tax = self.price_with_tax;
        target.discount_amount = self.discount_amount;
        target.discount_amount_with_tax = self.discount_amount_with_tax;
        target.tax_percent_rate = self.tax_percent_rate;
        target.tax_included = self.tax_included;
        target.currency = self.currency.clone();
        target.weight_unit = self.weight_unit.clone();
        target.weight_value = self.weight_value;
        target.dimension_height = self.dimension_height;
        target.dimension_length = self.dimension_length;
        target.dimension_unit = self.dimension_unit.clone();
        target.dimension_width = self.dimension_width;
        target.tax_type = self.tax_type.clone();
        target.shipment_method_option = self.shipment_method_option.clone();

        let policy = options.duplicate_policy;
        let mut report = PatchReport::default();

        if let Some(addresses) = &self.addresses {
            report.addresses = Some(patch_children(
                "addresses",
                addresses,
                &mut target.addresses,
                policy,
                AddressComparer,
                AddressEntity::patch,
            )?);
        }

        if let Some(items) = &self.items {
            report.items = Some(patch_children(
                "items",
                items,
                &mut target.items,
                policy,
                ShipmentItemComparer,
                ShipmentItemEntity::patch,
            )?);
        }

        if let Some(tax_details) = &self.tax_details {
            report.tax_details = Some(patch_children(
                "tax_details",
                tax_details,
                &mut target.tax_details,
                policy,
                TaxDetailComparer,
                TaxDetailEntity::patch,
            )?);
        }

        if let Some(discounts) = &self.discounts {
            report.discounts = Some(patch_children(
                "discounts",
                discounts,
                &mut target.discounts,
                policy,
                DiscountComparer,
                DiscountEntity::patch,
            )?);
        }

        Ok(report)
    }

    /// Validates the shipment and every loaded child against the storage limits.
    pub fn validate_aggregate(&self) -> Result<(), ShipmentError> {
        self.validate()
            .map_err(|errors| ShipmentError::validation("shipment", errors))?;
        validate_children("items", self.items.as_deref())?;
        validate_children("addresses", self.addresses.as_deref())?;
        validate_children("discounts", self.discounts.as_deref())?;
        validate_children("tax_details", self.tax_details.as_deref())?;
        Ok(())
    }
}

fn patch_children<E, C>(
    collection: &'static str,
    sources: &[E],
    targets: &mut Option<Vec<E>>,
    policy: DuplicatePolicy,
    comparer: C,
    patch: fn(&E, &mut E),
) -> Result<Reconciliation<E>, ShipmentError>
where
    E: Clone,
    C: IdentityComparer<E, E>,
{
    let targets = targets.get_or_insert_with(Vec::new);
    reconcile(
        sources,
        targets,
        policy,
        |source, target| comparer.matches(source, target),
        |source, target| -> Result<(), Infallible> {
            patch(source, target);
            Ok(())
        },
        |source| Ok(source.clone()),
    )
    .map_err(|error| collection_error(collection, error))
}

fn validate_children<T: Validate>(
    collection: &'static str,
    children: Option<&[T]>,
) -> Result<(), ShipmentError> {
    for child in children.unwrap_or_default() {
        child
            .validate()
            .map_err(|errors| ShipmentError::validation(collection, errors))?;
    }
    Ok(())
}

fn collection_error(collection: &'static str, error: ReconcileError<Infallible>) -> ShipmentError {
    match error {
        ReconcileError::InvalidArgument(message) => ShipmentError::Reconcile {
            collection,
            message,
        },
        ReconcileError::Callback(never) => match never {},
    }
}
