pub mod inventory;
pub mod procurement;
pub mod production;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Scheduling priority shared by plans, work orders and purchases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// A record whose fulfillment is reconciled: a production plan or a purchase.
///
/// The reconciler only sees targets through this trait; the dimension
/// accessors back the filtered rollups (by product, by group, by date range,
/// by priority).
pub trait FulfillmentTarget: Clone + Send + Sync + 'static {
    /// Natural id the fulfillment records reference.
    fn target_id(&self) -> &str;
    fn target_quantity(&self) -> i64;
    fn product_code(&self) -> &str;
    /// Second filter dimension: work center for plans, supplier for purchases.
    fn group_key(&self) -> &str;
    fn priority(&self) -> Priority;
    /// Date the record is filed under for range queries.
    fn window_date(&self) -> NaiveDate;
    /// Deadline used by the delayed view, when one exists.
    fn expected_date(&self) -> Option<NaiveDate>;
    /// Whether the target itself is already closed out (completed/cancelled).
    fn is_closed(&self) -> bool;
}

/// A record contributing quantity toward one target: a work order or receipt.
pub trait Fulfillment: Clone + Send + Sync + 'static {
    /// Foreign key to the target; may be unassigned.
    fn target_id(&self) -> Option<&str>;
    fn quantity(&self) -> i64;
    fn is_completed(&self) -> bool;
    fn is_in_progress(&self) -> bool;
}
