use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{Fulfillment, FulfillmentTarget, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlanStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WorkOrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// A production plan: the target side of the production reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionPlan {
    pub plan_id: String,
    pub product_code: String,
    pub product_name: String,
    pub plan_quantity: i64,
    pub planned_start_date: NaiveDate,
    pub planned_end_date: NaiveDate,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub status: PlanStatus,
    pub priority: Priority,
    pub work_center: String,
    pub responsible_person: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A work order contributing quantity toward one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub order_id: String,
    /// Plan this order fulfills; orders can exist unassigned.
    pub plan_id: Option<String>,
    pub product_code: String,
    pub product_name: String,
    pub order_quantity: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: WorkOrderStatus,
    pub priority: Priority,
    pub work_center: String,
    pub supervisor: String,
    pub operator: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FulfillmentTarget for ProductionPlan {
    fn target_id(&self) -> &str {
        &self.plan_id
    }

    fn target_quantity(&self) -> i64 {
        self.plan_quantity
    }

    fn product_code(&self) -> &str {
        &self.product_code
    }

    fn group_key(&self) -> &str {
        &self.work_center
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn window_date(&self) -> NaiveDate {
        self.planned_start_date
    }

    fn expected_date(&self) -> Option<NaiveDate> {
        Some(self.planned_end_date)
    }

    fn is_closed(&self) -> bool {
        matches!(self.status, PlanStatus::Completed | PlanStatus::Cancelled)
    }
}

impl Fulfillment for WorkOrder {
    fn target_id(&self) -> Option<&str> {
        self.plan_id.as_deref()
    }

    fn quantity(&self) -> i64 {
        self.order_quantity
    }

    fn is_completed(&self) -> bool {
        self.status == WorkOrderStatus::Completed
    }

    fn is_in_progress(&self) -> bool {
        self.status == WorkOrderStatus::InProgress
    }
}
