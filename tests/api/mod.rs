use std::sync::Once;

use cart_reconcile::comparer::{match_function, IdentityOrKeyComparer};
use cart_reconcile::reconciler::{DuplicatePolicy, Reconciler};
use cart_reconcile::shipment::{
    AddressEntity, DiscountEntity, ShipmentEntity, ShipmentItemEntity, TaxDetailEntity,
};
use cart_reconcile::Identifier;
use derive_more::Display;
use rust_decimal::Decimal;

static INIT: Once = Once::new();

/// Installs a log subscriber once, when `RUST_LOG` is set
#[allow(dead_code)]
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

// ###################################################################
// ######################### Line records ############################
// ###################################################################

/// A child record, used both as source and as persisted target
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub id: Option<u32>,
    pub sku: String,
    pub quantity: u32,
}

impl Identifier for Line {
    type Id = u32;

    fn identifier(&self) -> Option<&u32> {
        self.id.as_ref()
    }
}

#[allow(dead_code)]
pub fn line(id: u32, quantity: u32) -> Line {
    Line {
        id: Some(id),
        sku: format!("sku-{id}"),
        quantity,
    }
}

#[allow(dead_code)]
pub fn new_line(sku: &str, quantity: u32) -> Line {
    Line {
        id: None,
        sku: sku.to_string(),
        quantity,
    }
}

fn sku(line: &Line) -> Option<String> {
    Some(line.sku.to_owned())
}

#[derive(Debug, Display, Clone, PartialEq)]
#[allow(dead_code)]
pub enum LineError {
    #[display("quantity {_0} is not allowed")]
    Quantity(u32),
}

/// Reconciler pairing lines by persisted key, or by sku while a line is unsaved; quantity 0 is refused by both
/// callbacks
#[allow(dead_code)]
pub fn line_reconciler<'a>() -> Reconciler<'a, Line, Line, LineError> {
    Reconciler {
        matches: match_function(IdentityOrKeyComparer::new(sku, sku)),
        update: Box::new(|source, target| {
            if source.quantity == 0 {
                return Err(LineError::Quantity(source.quantity));
            }
            target.sku = source.sku.to_owned();
            target.quantity = source.quantity;
            Ok(())
        }),
        create: Box::new(|source| {
            if source.quantity == 0 {
                return Err(LineError::Quantity(source.quantity));
            }
            Ok(source.clone())
        }),
        policy: DuplicatePolicy::FirstMatchWins,
    }
}

// ###################################################################
// ######################## Shipment records #########################
// ###################################################################

#[allow(dead_code)]
pub fn money(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

#[allow(dead_code)]
pub fn item(id: Option<&str>, line_item_id: &str, quantity: i32) -> ShipmentItemEntity {
    ShipmentItemEntity {
        id: id.map(str::to_string),
        line_item_id: Some(line_item_id.to_string()),
        bar_code: None,
        quantity,
        shipment_id: None,
    }
}

#[allow(dead_code)]
pub fn address(id: Option<&str>, city: &str) -> AddressEntity {
    AddressEntity {
        id: id.map(str::to_string),
        city: Some(city.to_string()),
        country_code: Some("USA".to_string()),
        ..AddressEntity::default()
    }
}

#[allow(dead_code)]
pub fn tax_detail(id: Option<&str>, name: &str, amount: i64) -> TaxDetailEntity {
    TaxDetailEntity {
        id: id.map(str::to_string),
        name: Some(name.to_string()),
        rate: money(10),
        amount: money(amount),
    }
}

#[allow(dead_code)]
pub fn discount(id: Option<&str>, promotion_id: &str, coupon: Option<&str>, amount: i64) -> DiscountEntity {
    DiscountEntity {
        id: id.map(str::to_string),
        promotion_id: Some(promotion_id.to_string()),
        promotion_description: None,
        coupon_code: coupon.map(str::to_string),
        currency: "USD".to_string(),
        discount_amount: money(amount),
        discount_amount_with_tax: money(amount),
    }
}

/// A persisted shipment with one of every child
#[allow(dead_code)]
pub fn persisted_shipment() -> ShipmentEntity {
    ShipmentEntity {
        id: Some("shp-1".to_string()),
        shopping_cart_id: Some("cart-1".to_string()),
        shipment_method_code: Some("FixedRate".to_string()),
        shipment_method_option: Some("Ground".to_string()),
        currency: "USD".to_string(),
        price: money(1000),
        price_with_tax: money(1100),
        total: money(1000),
        total_with_tax: money(1100),
        items: Some(vec![
            item(Some("itm-1"), "li-1", 1),
            item(Some("itm-2"), "li-2", 3),
        ]),
        addresses: Some(vec![address(Some("adr-1"), "Los Angeles")]),
        tax_details: Some(vec![tax_detail(Some("tax-1"), "State", 100)]),
        discounts: Some(vec![discount(Some("dsc-1"), "promo-1", None, 50)]),
        ..ShipmentEntity::default()
    }
}
