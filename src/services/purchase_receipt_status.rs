use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use super::reconciliation::{
    DelayedTarget, FulfillmentReconciler, ReconciliationRollup, TargetFilter, TargetReconciliation,
};
use crate::entities::procurement::{Purchase, Receipt};
use crate::entities::Priority;
use crate::errors::ServiceError;
use crate::store::{FulfillmentStore, TargetStore};

pub type PurchaseReconciliation = TargetReconciliation<Purchase, Receipt>;
pub type ProcurementRollup = ReconciliationRollup<Purchase, Receipt>;
pub type DelayedPurchase = DelayedTarget<Purchase>;

/// Receipt-rate views: purchases reconciled against their goods receipts.
#[derive(Clone)]
pub struct PurchaseReceiptStatusService {
    reconciler: FulfillmentReconciler<Purchase, Receipt>,
}

impl PurchaseReceiptStatusService {
    pub fn new(
        purchases: Arc<dyn TargetStore<Purchase>>,
        receipts: Arc<dyn FulfillmentStore<Receipt>>,
    ) -> Self {
        Self {
            reconciler: FulfillmentReconciler::new(purchases, receipts),
        }
    }

    /// Receipt detail for one purchase order.
    pub async fn purchase_status(
        &self,
        order_id: &str,
    ) -> Result<PurchaseReconciliation, ServiceError> {
        self.reconciler.reconcile(order_id).await
    }

    pub async fn all_status(&self) -> Result<ProcurementRollup, ServiceError> {
        self.reconciler.reconcile_filtered(&TargetFilter::All).await
    }

    pub async fn by_product(&self, product_code: &str) -> Result<ProcurementRollup, ServiceError> {
        self.reconciler
            .reconcile_filtered(&TargetFilter::Product(product_code.to_string()))
            .await
    }

    pub async fn by_supplier(&self, supplier_id: &str) -> Result<ProcurementRollup, ServiceError> {
        self.reconciler
            .reconcile_filtered(&TargetFilter::Group(supplier_id.to_string()))
            .await
    }

    pub async fn by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ProcurementRollup, ServiceError> {
        self.reconciler
            .reconcile_filtered(&TargetFilter::DateRange { start, end })
            .await
    }

    pub async fn by_priority(&self, priority: Priority) -> Result<ProcurementRollup, ServiceError> {
        self.reconciler
            .reconcile_filtered(&TargetFilter::Priority(priority))
            .await
    }

    /// Purchases received below 100%.
    pub async fn pending(&self) -> Result<Vec<PurchaseReconciliation>, ServiceError> {
        self.reconciler.pending().await
    }

    /// Purchases fully received.
    pub async fn completed(&self) -> Result<Vec<PurchaseReconciliation>, ServiceError> {
        self.reconciler.completed().await
    }

    /// Open purchases past their expected delivery date and not fully
    /// received.
    pub async fn delayed(&self) -> Result<Vec<DelayedPurchase>, ServiceError> {
        self.reconciler.delayed(Utc::now().date_naive()).await
    }
}
