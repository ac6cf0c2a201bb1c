//! Conversions between persisted shipment records and domain shipments.

use tracing::debug;

use crate::factory::TypeRegistry;
use crate::shipment::entity::{
    AddressEntity, DiscountEntity, ShipmentEntity, ShipmentItemEntity, TaxDetailEntity,
};
use crate::shipment::model::{Address, Discount, Shipment, ShipmentItem, TaxDetail};

/// Constructors for the domain objects produced by `to_model`.
///
/// Replace a registry's default to have conversions produce derived kinds of shipments or children.
#[derive(Debug, Clone, Default)]
pub struct ModelFactory<'a> {
    /// Shipments.
    pub shipments: TypeRegistry<'a, Shipment>,
    /// Shipment items.
    pub items: TypeRegistry<'a, ShipmentItem>,
    /// Delivery addresses.
    pub addresses: TypeRegistry<'a, Address>,
    /// Discounts.
    pub discounts: TypeRegistry<'a, Discount>,
    /// Tax lines.
    pub tax_details: TypeRegistry<'a, TaxDetail>,
}

/// Which record a [KeyPair] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// The shipment itself.
    Shipment,
    /// The item at this position of the shipment's items.
    ShipmentItem(usize),
}

/// A domain object paired with the record built from it, so the key assigned on save can flow back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// The paired record.
    pub kind: RecordKind,
    /// The key the domain object carried when the pair was recorded.
    pub model_id: Option<String>,
}

/// Records which domain objects produced which records during `from_model`.
///
/// Once the records are saved and have keys, [PrimaryKeyMap::resolve_keys] copies the keys back onto the domain
/// objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimaryKeyMap {
    pairs: Vec<KeyPair>,
}

impl PrimaryKeyMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pair.
    pub fn add_pair(&mut self, kind: RecordKind, model_id: Option<String>) {
        self.pairs.push(KeyPair { kind, model_id });
    }

    /// The recorded pairs, in recording order.
    pub fn pairs(&self) -> &[KeyPair] {
        &self.pairs
    }

    /// Copies the keys of the saved `entity` back onto `shipment`. Returns how many keys changed.
    pub fn resolve_keys(&self, shipment: &mut Shipment, entity: &ShipmentEntity) -> usize {
        let mut resolved = 0;
        for pair in &self.pairs {
            let (model_id, entity_id) = match pair.kind {
                RecordKind::Shipment => (&mut shipment.id, entity.id.as_ref()),
                RecordKind::ShipmentItem(position) => {
                    let model = shipment.items.as_mut().and_then(|items| items.get_mut(position));
                    let record = entity.items.as_ref().and_then(|items| items.get(position));
                    match (model, record) {
                        (Some(model), Some(record)) => (&mut model.id, record.id.as_ref()),
                        _ => continue,
                    }
                }
            };
            if let Some(entity_id) = entity_id {
                if model_id.as_ref() != Some(entity_id) {
                    *model_id = Some(entity_id.clone());
                    resolved += 1;
                }
            }
        }
        debug!(resolved, pairs = self.pairs.len(), "resolved primary keys");
        resolved
    }
}

impl ShipmentEntity {
    /// Converts the record into a domain shipment using the default constructors.
    pub fn to_model(&self) -> Shipment {
        self.to_model_with(&ModelFactory::default())
    }

    /// Converts the record into a domain shipment, building every object through `factory`.
    ///
    /// The first address becomes the delivery address. Empty child collections leave the constructor's value in place.
    pub fn to_model_with(&self, factory: &ModelFactory<'_>) -> Shipment {
        let mut shipment = factory.shipments.create_default();

        shipment.id = self.id.clone();
        shipment.shipment_method_code = self.shipment_method_code.clone();
        shipment.shipment_method_option = self.shipment_method_option.clone();
        shipment.fulfillment_center_id = self.fulfilment_center_id.clone();
        shipment.fulfillment_center_name = self.fulfillment_center_name.clone();
        shipment.currency = self.currency.clone();
        shipment.weight_unit = self.weight_unit.clone();
        shipment.weight_value = self.weight_value;
        shipment.volumetric_weight = self.volumetric_weight;
        shipment.dimension_unit = self.dimension_unit.clone();
        shipment.dimension_height = self.dimension_height;
        shipment.dimension_length = self.dimension_length;
        shipment.dimension_width = self.dimension_width;
        shipment.tax_included = self.tax_included;
        shipment.price = self.price;
        shipment.price_with_tax = self.price_with_tax;
        shipment.discount_amount = self.discount_amount;
        shipment.discount_amount_with_tax = self.discount_amount_with_tax;
        shipment.tax_percent_rate = self.tax_percent_rate;
        shipment.tax_total = self.tax_total;
        shipment.total = self.total;
        shipment.total_with_tax = self.total_with_tax;
        shipment.fee = self.fee;
        shipment.fee_with_tax = self.fee_with_tax;
        shipment.tax_type = self.tax_type.clone();

        if let Some(address) = self.addresses.as_deref().and_then(|a| a.first()) {
            shipment.delivery_address = Some(address.to_model(factory.addresses.create_default()));
        }

        if let Some(discounts) = non_empty(&self.discounts) {
            shipment.discounts = Some(
                discounts
                    .iter()
                    .map(|d| d.to_model(factory.discounts.create_default()))
                    .collect(),
            );
        }

        if let Some(items) = non_empty(&self.items) {
            shipment.items = Some(
                items
                    .iter()
                    .map(|i| i.to_model(factory.items.create_default()))
                    .collect(),
            );
        }

        if let Some(tax_details) = non_empty(&self.tax_details) {
            shipment.tax_details = Some(
                tax_details
                    .iter()
                    .map(|t| t.to_model(factory.tax_details.create_default()))
                    .collect(),
            );
        }

        shipment
    }

    /// Builds a record from a domain shipment, recording the produced pairs in `keys`.
    ///
    /// The addresses collection is always supplied: it holds the delivery address, or nothing when there is none.
    /// Item, tax detail and discount collections are supplied only when the shipment carries them. Items are stamped
    /// with the shipment's key.
    pub fn from_model(shipment: &Shipment, keys: &mut PrimaryKeyMap) -> ShipmentEntity {
        keys.add_pair(RecordKind::Shipment, shipment.id.clone());

        let mut entity = ShipmentEntity {
            id: shipment.id.clone(),
            shipment_method_code: shipment.shipment_method_code.clone(),
            shipment_method_option: shipment.shipment_method_option.clone(),
            fulfilment_center_id: shipment.fulfillment_center_id.clone(),
            fulfillment_center_name: shipment.fulfillment_center_name.clone(),
            currency: shipment.currency.clone(),
            weight_unit: shipment.weight_unit.clone(),
            weight_value: shipment.weight_value,
            volumetric_weight: shipment.volumetric_weight,
            dimension_unit: shipment.dimension_unit.clone(),
            dimension_height: shipment.dimension_height,
            dimension_length: shipment.dimension_length,
            dimension_width: shipment.dimension_width,
            tax_included: shipment.tax_included,
            price: shipment.price,
            price_with_tax: shipment.price_with_tax,
            discount_amount: shipment.discount_amount,
            discount_amount_with_tax: shipment.discount_amount_with_tax,
            tax_percent_rate: shipment.tax_percent_rate,
            tax_total: shipment.tax_total,
            total: shipment.total,
            total_with_tax: shipment.total_with_tax,
            fee: shipment.fee,
            fee_with_tax: shipment.fee_with_tax,
            tax_type: shipment.tax_type.clone(),
            ..ShipmentEntity::default()
        };

        entity.addresses = Some(
            shipment
                .delivery_address
                .iter()
                .map(AddressEntity::from_model)
                .collect(),
        );

        if let Some(items) = &shipment.items {
            let records = items
                .iter()
                .enumerate()
                .map(|(position, item)| {
                    keys.add_pair(RecordKind::ShipmentItem(position), item.id.clone());
                    let mut record = ShipmentItemEntity::from_model(item);
                    record.shipment_id = entity.id.clone();
                    record
                })
                .collect();
            entity.items = Some(records);
        }

        if let Some(tax_details) = &shipment.tax_details {
            entity.tax_details = Some(tax_details.iter().map(TaxDetailEntity::from_model).collect());
        }

        if let Some(discounts) = &shipment.discounts {
            entity.discounts = Some(discounts.iter().map(DiscountEntity::from_model).collect());
        }

        entity
    }
}

impl ShipmentItemEntity {
    /// Fills `item` from this record.
    pub fn to_model(&self, mut item: ShipmentItem) -> ShipmentItem {
        item.id = self.id.clone();
        item.line_item_id = self.line_item_id.clone();
        item.bar_code = self.bar_code.clone();
        item.quantity = self.quantity;
        item
    }

    /// Builds a record from `item`. The shipment key is left for the caller.
    pub fn from_model(item: &ShipmentItem) -> Self {
        ShipmentItemEntity {
            id: item.id.clone(),
            line_item_id: item.line_item_id.clone(),
            bar_code: item.bar_code.clone(),
            quantity: item.quantity,
            shipment_id: None,
        }
    }
}

impl AddressEntity {
    /// Fills `address` from this record. The record key becomes the address key.
    pub fn to_model(&self, mut address: Address) -> Address {
        address.key = self.id.clone();
        address.address_type = self.address_type;
        address.name = self.name.clone();
        address.organization = self.organization.clone();
        address.first_name = self.first_name.clone();
        address.last_name = self.last_name.clone();
        address.line1 = self.line1.clone();
        address.line2 = self.line2.clone();
        address.city = self.city.clone();
        address.region_id = self.region_id.clone();
        address.region_name = self.region_name.clone();
        address.postal_code = self.postal_code.clone();
        address.country_code = self.country_code.clone();
        address.country_name = self.country_name.clone();
        address.email = self.email.clone();
        address.phone = self.phone.clone();
        address
    }

    /// Builds a record from `address`.
    pub fn from_model(address: &Address) -> Self {
        AddressEntity {
            id: address.key.clone(),
            address_type: address.address_type,
            name: address.name.clone(),
            organization: address.organization.clone(),
            first_name: address.first_name.clone(),
            last_name: address.last_name.clone(),
            line1: address.line1.clone(),
            line2: address.line2.clone(),
            city: address.city.clone(),
            region_id: address.region_id.clone(),
            region_name: address.region_name.clone(),
            postal_code: address.postal_code.clone(),
            country_code: address.country_code.clone(),
            country_name: address.country_name.clone(),
            email: address.email.clone(),
            phone: address.phone.clone(),
        }
    }
}

impl DiscountEntity {
    /// Fills `discount` from this record.
    pub fn to_model(&self, mut discount: Discount) -> Discount {
        discount.id = self.id.clone();
        discount.promotion_id = self.promotion_id.clone();
        discount.coupon = self.coupon_code.clone();
        discount.description = self.promotion_description.clone();
        discount.currency = self.currency.clone();
        discount.discount_amount = self.discount_amount;
        discount.discount_amount_with_tax = self.discount_amount_with_tax;
        discount
    }

    /// Builds a record from `discount`.
    pub fn from_model(discount: &Discount) -> Self {
        DiscountEntity {
            id: discount.id.clone(),
            promotion_id: discount.promotion_id.clone(),
            promotion_description: discount.description.clone(),
            coupon_code: discount.coupon.clone(),
            currency: discount.currency.clone(),
            discount_amount: discount.discount_amount,
            discount_amount_with_tax: discount.discount_amount_with_tax,
        }
    }
}

impl TaxDetailEntity {
    /// Fills `detail` from this record.
    pub fn to_model(&self, mut detail: TaxDetail) -> TaxDetail {
        detail.name = self.name.clone();
        detail.rate = self.rate;
        detail.amount = self.amount;
        detail
    }

    /// Builds a record from `detail`. Tax lines have no domain key, so the record starts without one.
    pub fn from_model(detail: &TaxDetail) -> Self {
        TaxDetailEntity {
            id: None,
            name: detail.name.clone(),
            rate: detail.rate,
            amount: detail.amount,
        }
    }
}

fn non_empty<T>(collection: &Option<Vec<T>>) -> Option<&[T]> {
    collection.as_deref().filter(|c| !c.is_empty())
}
