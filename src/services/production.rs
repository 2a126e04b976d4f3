use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, instrument};
use validator::Validate;

use crate::entities::production::{PlanStatus, ProductionPlan, WorkOrder, WorkOrderStatus};
use crate::entities::Priority;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::store::{FulfillmentStore, IdSequence, TargetStore};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePlanInput {
    #[validate(length(min = 1))]
    pub product_code: String,
    #[validate(length(min = 1))]
    pub product_name: String,
    #[validate(range(min = 0))]
    pub plan_quantity: i64,
    pub planned_start_date: NaiveDate,
    pub planned_end_date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
    pub work_center: String,
    pub responsible_person: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkOrderInput {
    /// Plan the order fulfills; must exist when given.
    pub plan_id: Option<String>,
    #[validate(length(min = 1))]
    pub product_code: String,
    #[validate(length(min = 1))]
    pub product_name: String,
    #[validate(range(min = 1))]
    pub order_quantity: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: Option<WorkOrderStatus>,
    #[serde(default)]
    pub priority: Priority,
    pub work_center: String,
    pub supervisor: String,
    pub operator: String,
    pub notes: Option<String>,
}

/// Registration and listing for plans and work orders, so the reconciliation
/// views have live records behind them.
#[derive(Clone)]
pub struct ProductionService {
    plans: Arc<dyn TargetStore<ProductionPlan>>,
    work_orders: Arc<dyn FulfillmentStore<WorkOrder>>,
    plan_ids: Arc<IdSequence>,
    order_ids: Arc<IdSequence>,
    events: EventSender,
}

impl ProductionService {
    pub fn new(
        plans: Arc<dyn TargetStore<ProductionPlan>>,
        work_orders: Arc<dyn FulfillmentStore<WorkOrder>>,
        plan_ids: Arc<IdSequence>,
        order_ids: Arc<IdSequence>,
        events: EventSender,
    ) -> Self {
        Self {
            plans,
            work_orders,
            plan_ids,
            order_ids,
            events,
        }
    }

    #[instrument(skip(self, input), fields(product_code = %input.product_code))]
    pub async fn create_plan(&self, input: CreatePlanInput) -> Result<ProductionPlan, ServiceError> {
        input.validate()?;
        if input.planned_start_date > input.planned_end_date {
            return Err(ServiceError::ValidationError(
                "planned_start_date is after planned_end_date".to_string(),
            ));
        }

        let now = Utc::now();
        let plan = ProductionPlan {
            plan_id: self.plan_ids.next_id(),
            product_code: input.product_code,
            product_name: input.product_name,
            plan_quantity: input.plan_quantity,
            planned_start_date: input.planned_start_date,
            planned_end_date: input.planned_end_date,
            actual_start_date: None,
            actual_end_date: None,
            status: PlanStatus::Pending,
            priority: input.priority,
            work_center: input.work_center,
            responsible_person: input.responsible_person,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        let created = self.plans.insert(plan).await?;
        info!(plan_id = %created.plan_id, "production plan created");
        self.events.send_or_log(Event::ProductionPlanCreated {
            plan_id: created.plan_id.clone(),
        });
        Ok(created)
    }

    pub async fn get_plan(&self, plan_id: &str) -> Result<ProductionPlan, ServiceError> {
        self.plans
            .get(plan_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("production plan {} not found", plan_id)))
    }

    /// All plans, newest first.
    pub async fn list_plans(&self) -> Result<Vec<ProductionPlan>, ServiceError> {
        let mut plans = self.plans.list().await?;
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    pub async fn remove_plan(&self, plan_id: &str) -> Result<(), ServiceError> {
        if !self.plans.remove(plan_id).await? {
            return Err(ServiceError::NotFound(format!(
                "production plan {} not found",
                plan_id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, input), fields(product_code = %input.product_code))]
    pub async fn create_work_order(
        &self,
        input: CreateWorkOrderInput,
    ) -> Result<WorkOrder, ServiceError> {
        input.validate()?;
        if input.start_date > input.end_date {
            return Err(ServiceError::ValidationError(
                "start_date is after end_date".to_string(),
            ));
        }
        if let Some(plan_id) = &input.plan_id {
            self.get_plan(plan_id).await?;
        }

        let now = Utc::now();
        let order = WorkOrder {
            order_id: self.order_ids.next_id(),
            plan_id: input.plan_id,
            product_code: input.product_code,
            product_name: input.product_name,
            order_quantity: input.order_quantity,
            start_date: input.start_date,
            end_date: input.end_date,
            status: input.status.unwrap_or(WorkOrderStatus::Pending),
            priority: input.priority,
            work_center: input.work_center,
            supervisor: input.supervisor,
            operator: input.operator,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        let created = self.work_orders.insert(order).await?;
        info!(order_id = %created.order_id, "work order created");
        self.events.send_or_log(Event::WorkOrderCreated {
            order_id: created.order_id.clone(),
            plan_id: created.plan_id.clone(),
        });
        Ok(created)
    }

    pub async fn get_work_order(&self, order_id: &str) -> Result<WorkOrder, ServiceError> {
        self.work_orders
            .get(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("work order {} not found", order_id)))
    }

    pub async fn list_work_orders(&self) -> Result<Vec<WorkOrder>, ServiceError> {
        let mut orders = self.work_orders.list().await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    pub async fn list_work_orders_for_plan(
        &self,
        plan_id: &str,
    ) -> Result<Vec<WorkOrder>, ServiceError> {
        self.work_orders.for_target(plan_id).await
    }
}
