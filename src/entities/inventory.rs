use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Derived health status of a ledger record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InventoryStatus {
    Sufficient,
    Low,
    OutOfStock,
    Excess,
}

impl InventoryStatus {
    /// The status derivation rule. Fixed precedence, first match wins.
    ///
    /// Every write path (register, update, adjust) derives status through
    /// this one function; nothing re-derives inline.
    pub fn derive(current_stock: i64, min_stock: i64, max_stock: i64, _reorder_point: i64) -> Self {
        if current_stock == 0 {
            InventoryStatus::OutOfStock
        } else if current_stock <= min_stock {
            InventoryStatus::Low
        } else if max_stock > 0 && current_stock > max_stock {
            InventoryStatus::Excess
        } else {
            InventoryStatus::Sufficient
        }
    }
}

/// A single stock-changing event type.
///
/// `In` and `Return` add, `Out` and `Transfer` subtract, `Adjustment` sets the
/// absolute level. Parsing happens at the DTO boundary, so an unrecognized
/// token is rejected as a validation error before it reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
    Transfer,
    Return,
}

/// One ledger record per product code.
///
/// Invariants, enforced by the service layer on every successful write:
/// `current_stock >= 0`, `total_value == current_stock * unit_cost`, and
/// `status == InventoryStatus::derive(..)` unless an explicit override was
/// requested on a full-field update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub product_code: String,
    pub product_name: String,
    pub category: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    pub reorder_point: i64,
    pub status: InventoryStatus,
    pub unit_cost: Decimal,
    pub total_value: Decimal,
    pub location: String,
    pub supplier: String,
    pub notes: Option<String>,
    /// Single-slot record of the most recent movement only.
    pub last_movement_date: Option<DateTime<Utc>>,
    pub movement_type: Option<MovementType>,
    pub movement_quantity: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every successful write; detects lost updates.
    pub version: u64,
}

impl InventoryRecord {
    /// Recomputes the valuation from the current stock level.
    pub fn revalue(&mut self) {
        self.total_value = Decimal::from(self.current_stock) * self.unit_cost;
    }

    /// Re-derives the health status from the current thresholds.
    pub fn rederive_status(&mut self) {
        self.status = InventoryStatus::derive(
            self.current_stock,
            self.min_stock,
            self.max_stock,
            self.reorder_point,
        );
    }

    pub fn needs_reorder(&self) -> bool {
        self.current_stock <= self.reorder_point
    }

    /// Quantity to order to refill up to `max_stock`.
    pub fn recommended_order_quantity(&self) -> i64 {
        if self.needs_reorder() {
            (self.max_stock - self.current_stock).max(0)
        } else {
            0
        }
    }
}
