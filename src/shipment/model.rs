//! Domain-side shipment objects, as the cart works with them.
//!
//! Collections are `Option`s: `None` means the caller did not supply the collection, which is different from an
//! empty one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A cart shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: Option<String>,
    /// Type tag of the concrete shipment kind, set by the constructor that built the instance.
    pub object_type: String,
    pub shipment_method_code: Option<String>,
    pub shipment_method_option: Option<String>,
    pub fulfillment_center_id: Option<String>,
    pub fulfillment_center_name: Option<String>,
    pub currency: String,
    pub weight_unit: Option<String>,
    pub weight_value: Option<Decimal>,
    pub volumetric_weight: Option<Decimal>,
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
    pub tax_type: Option<String>,
    pub delivery_address: Option<Address>,
    pub items: Option<Vec<ShipmentItem>>,
    pub discounts: Option<Vec<Discount>>,
    pub tax_details: Option<Vec<TaxDetail>>,
}

impl Default for Shipment {
    fn default() -> Self {
        Shipment {
            id: None,
            object_type: "Shipment".to_string(),
            shipment_method_code: None,
            shipment_method_option: None,
            fulfillment_center_id: None,
            fulfillment_center_name: None,
            currency: String::new(),
            weight_unit: None,
            weight_value: None,
            volumetric_weight: None,
            dimension_unit: None,
            dimension_height: None,
            dimension_length: None,
            dimension_width: None,
            tax_included: false,
            price: Decimal::ZERO,
            price_with_tax: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            discount_amount_with_tax: Decimal::ZERO,
            tax_percent_rate: Decimal::ZERO,
            tax_total: Decimal::ZERO,
            total: Decimal::ZERO,
            total_with_tax: Decimal::ZERO,
            fee: Decimal::ZERO,
            fee_with_tax: Decimal::ZERO,
            tax_type: None,
            delivery_address: None,
            items: None,
            discounts: None,
            tax_details: None,
        }
    }
}

/// A cart line item (or part of it) packed into a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentItem {
    pub id: Option<String>,
    pub object_type: String,
    pub line_item_id: Option<String>,
    pub bar_code: Option<String>,
    pub quantity: i32,
}

impl Default for ShipmentItem {
    fn default() -> Self {
        ShipmentItem {
            id: None,
            object_type: "ShipmentItem".to_string(),
            line_item_id: None,
            bar_code: None,
            quantity: 0,
        }
    }
}

/// The kind of a postal address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddressType {
    Billing,
    #[default]
    Shipping,
    BillingAndShipping,
    Pickup,
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub key: Option<String>,
    pub object_type: String,
    pub address_type: AddressType,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub region_id: Option<String>,
    pub region_name: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Default for Address {
    fn default() -> Self {
        Address {
            key: None,
            object_type: "Address".to_string(),
            address_type: AddressType::default(),
            name: None,
            organization: None,
            first_name: None,
            last_name: None,
            line1: None,
            line2: None,
            city: None,
            region_id: None,
            region_name: None,
            postal_code: None,
            country_code: None,
            country_name: None,
            email: None,
            phone: None,
        }
    }
}

/// A promotion reward applied to the shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: Option<String>,
    pub object_type: String,
    pub promotion_id: Option<String>,
    pub coupon: Option<String>,
    pub description: Option<String>,
    pub currency: String,
    pub discount_amount: Decimal,
    pub discount_amount_with_tax: Decimal,
}

impl Default for Discount {
    fn default() -> Self {
        Discount {
            id: None,
            object_type: "Discount".to_string(),
            promotion_id: None,
            coupon: None,
            description: None,
            currency: String::new(),
            discount_amount: Decimal::ZERO,
            discount_amount_with_tax: Decimal::ZERO,
        }
    }
}

/// One tax line of the shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxDetail {
    pub object_type: String,
    pub name: Option<String>,
    pub rate: Decimal,
    pub amount: Decimal,
}

impl Default for TaxDetail {
    fn default() -> Self {
        TaxDetail {
            object_type: "TaxDetail".to_string(),
            name: None,
            rate: Decimal::ZERO,
            amount: Decimal::ZERO,
        }
    }
}
