use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use super::reconciliation::{
    DelayedTarget, FulfillmentReconciler, ReconciliationRollup, TargetFilter, TargetReconciliation,
};
use crate::entities::production::{ProductionPlan, WorkOrder};
use crate::entities::Priority;
use crate::errors::ServiceError;
use crate::store::{FulfillmentStore, TargetStore};

pub type PlanReconciliation = TargetReconciliation<ProductionPlan, WorkOrder>;
pub type ProductionRollup = ReconciliationRollup<ProductionPlan, WorkOrder>;
pub type DelayedPlan = DelayedTarget<ProductionPlan>;

/// Production achievement views: plans reconciled against their work orders.
#[derive(Clone)]
pub struct ProductionStatusService {
    reconciler: FulfillmentReconciler<ProductionPlan, WorkOrder>,
}

impl ProductionStatusService {
    pub fn new(
        plans: Arc<dyn TargetStore<ProductionPlan>>,
        work_orders: Arc<dyn FulfillmentStore<WorkOrder>>,
    ) -> Self {
        Self {
            reconciler: FulfillmentReconciler::new(plans, work_orders),
        }
    }

    /// Achievement detail for one plan.
    pub async fn plan_status(&self, plan_id: &str) -> Result<PlanReconciliation, ServiceError> {
        self.reconciler.reconcile(plan_id).await
    }

    pub async fn all_status(&self) -> Result<ProductionRollup, ServiceError> {
        self.reconciler.reconcile_filtered(&TargetFilter::All).await
    }

    pub async fn by_product(&self, product_code: &str) -> Result<ProductionRollup, ServiceError> {
        self.reconciler
            .reconcile_filtered(&TargetFilter::Product(product_code.to_string()))
            .await
    }

    pub async fn by_work_center(&self, work_center: &str) -> Result<ProductionRollup, ServiceError> {
        self.reconciler
            .reconcile_filtered(&TargetFilter::Group(work_center.to_string()))
            .await
    }

    pub async fn by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ProductionRollup, ServiceError> {
        self.reconciler
            .reconcile_filtered(&TargetFilter::DateRange { start, end })
            .await
    }

    pub async fn by_priority(&self, priority: Priority) -> Result<ProductionRollup, ServiceError> {
        self.reconciler
            .reconcile_filtered(&TargetFilter::Priority(priority))
            .await
    }

    /// Plans with achievement below 100%.
    pub async fn pending(&self) -> Result<Vec<PlanReconciliation>, ServiceError> {
        self.reconciler.pending().await
    }

    /// Plans fully achieved.
    pub async fn completed(&self) -> Result<Vec<PlanReconciliation>, ServiceError> {
        self.reconciler.completed().await
    }

    /// Open plans past their planned end date and not fully achieved.
    pub async fn delayed(&self) -> Result<Vec<DelayedPlan>, ServiceError> {
        self.reconciler.delayed(Utc::now().date_naive()).await
    }
}
