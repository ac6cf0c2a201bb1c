use serde::{Deserialize, Serialize};

/// Payload of the email sent to a customer who left a cart behind.
///
/// Delivery is up to the notification system; this is only the data it renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAbandonNotification {
    /// Link that brings the customer back to the cart.
    pub cart_reference_uri: Option<String>,
    /// Coupon offered to win the customer back.
    pub coupon_code: Option<String>,
}

impl CartAbandonNotification {
    /// The notification type name the templates are registered under.
    pub const NOTIFICATION_TYPE: &'static str = "CartAbandonNotification";

    /// Creates a payload pointing at the abandoned cart.
    pub fn new(cart_reference_uri: impl Into<String>) -> Self {
        CartAbandonNotification {
            cart_reference_uri: Some(cart_reference_uri.into()),
            coupon_code: None,
        }
    }

    /// Attaches a coupon.
    pub fn with_coupon(self, coupon_code: impl Into<String>) -> Self {
        CartAbandonNotification {
            coupon_code: Some(coupon_code.into()),
            ..self
        }
    }

    /// The notification type name the templates are registered under.
    pub fn notification_type(&self) -> &'static str {
        Self::NOTIFICATION_TYPE
    }
}
