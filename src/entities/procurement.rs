use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{Fulfillment, FulfillmentTarget, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Ordered,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReceiptStatus {
    Pending,
    Completed,
    Rejected,
}

/// A purchase order: the target side of the procurement reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub order_id: String,
    pub supplier_id: String,
    pub supplier_name: String,
    pub product_code: String,
    pub product_name: String,
    pub order_quantity: i64,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub order_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    pub status: PurchaseStatus,
    pub priority: Priority,
    pub purchaser: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A goods receipt against one purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_id: String,
    /// Purchase order this receipt fulfills.
    pub ordering_id: String,
    pub supplier_id: String,
    pub supplier_name: String,
    pub product_code: String,
    pub product_name: String,
    pub ordered_quantity: i64,
    pub received_quantity: i64,
    pub delivery_date: NaiveDate,
    pub received_date: Option<NaiveDate>,
    pub warehouse_location: String,
    pub status: ReceiptStatus,
    pub manager: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FulfillmentTarget for Purchase {
    fn target_id(&self) -> &str {
        &self.order_id
    }

    fn target_quantity(&self) -> i64 {
        self.order_quantity
    }

    fn product_code(&self) -> &str {
        &self.product_code
    }

    fn group_key(&self) -> &str {
        &self.supplier_id
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn window_date(&self) -> NaiveDate {
        self.order_date
    }

    fn expected_date(&self) -> Option<NaiveDate> {
        self.expected_delivery_date
    }

    fn is_closed(&self) -> bool {
        matches!(
            self.status,
            PurchaseStatus::Completed | PurchaseStatus::Cancelled
        )
    }
}

impl Fulfillment for Receipt {
    fn target_id(&self) -> Option<&str> {
        Some(&self.ordering_id)
    }

    fn quantity(&self) -> i64 {
        self.received_quantity
    }

    fn is_completed(&self) -> bool {
        self.status == ReceiptStatus::Completed
    }

    /// Receipts only distinguish pending from completed, so pending counts
    /// as in progress for the rollup.
    fn is_in_progress(&self) -> bool {
        self.status == ReceiptStatus::Pending
    }
}
