//! Order Aggregate
//!
//! Orders come from the storefront backend; this side only reads them to
//! decide whether the customer may leave product reviews.

use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Price;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub review: Option<Review>,
}

fn one() -> u32 { 1 }

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub status: Option<ReviewStatus>,
}

/// Declares a status enum parsed case-insensitively from its wire string,
/// keeping unknown values instead of rejecting the whole order.
macro_rules! status_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                $(if raw.eq_ignore_ascii_case($wire) { return Self::$variant; })+
                Self::Other(raw)
            }
        }

        impl From<$name> for String {
            fn from(status: $name) -> Self {
                match status {
                    $($name::$variant => $wire.to_string(),)+
                    $name::Other(raw) => raw,
                }
            }
        }
    };
}

status_enum!(OrderStatus {
    Pending => "PENDING",
    Approved => "APPROVED",
    Processing => "PROCESSING",
    Shipped => "SHIPPED",
    Delivered => "DELIVERED",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

status_enum!(PaymentStatus {
    Pending => "PENDING",
    Paid => "PAID",
    Received => "RECEIVED",
    Completed => "COMPLETED",
    Failed => "FAILED",
    Refunded => "REFUNDED",
});

status_enum!(ReviewStatus {
    Pending => "PENDING",
    Approved => "APPROVED",
    Rejected => "REJECTED",
});

impl OrderItem {
    /// True unless the item carries an approved review. A review without a
    /// status is still awaiting moderation.
    pub fn awaits_review(&self) -> bool {
        !matches!(&self.review, Some(Review { status: Some(ReviewStatus::Approved), .. }))
    }
}

impl Order {
    /// Items still lacking an approved review, or `None` for an order with no
    /// items at all.
    pub fn pending_review_count(&self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.items.iter().filter(|i| i.awaits_review()).count())
    }

    /// Whether the customer may review items on this order.
    ///
    /// Requires a delivered/completed order or a settled payment, and at least
    /// one item awaiting review. Either status may be missing. An order without items has no pending count
    /// and is treated as eligible whenever its status is.
    pub fn is_review_eligible(&self) -> bool {
        let status_ok = matches!(self.status, Some(OrderStatus::Delivered | OrderStatus::Completed));
        let payment_ok = matches!(
            self.payment_status,
            Some(PaymentStatus::Completed | PaymentStatus::Paid | PaymentStatus::Received)
        );
        (status_ok || payment_ok) && self.pending_review_count().map_or(true, |n| n > 0)
    }

    /// Sum of line totals, as printed on the invoice.
    pub fn subtotal(&self) -> Price {
        self.items.iter().fold(Price::ZERO, |acc, i| acc.plus(i.price.times(i.quantity)))
    }
}
