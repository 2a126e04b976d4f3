use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument};
use validator::Validate;

use crate::entities::procurement::{Purchase, PurchaseStatus, Receipt, ReceiptStatus};
use crate::entities::Priority;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::store::{FulfillmentStore, IdSequence, TargetStore};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePurchaseInput {
    #[validate(length(min = 1))]
    pub supplier_id: String,
    pub supplier_name: String,
    #[validate(length(min = 1))]
    pub product_code: String,
    pub product_name: String,
    #[validate(range(min = 0))]
    pub order_quantity: i64,
    pub unit_price: Decimal,
    pub order_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    pub purchaser: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReceiptInput {
    /// Purchase order being received against; must exist.
    #[validate(length(min = 1))]
    pub ordering_id: String,
    #[validate(range(min = 1))]
    pub received_quantity: i64,
    pub delivery_date: NaiveDate,
    pub received_date: Option<NaiveDate>,
    pub warehouse_location: String,
    pub status: Option<ReceiptStatus>,
    pub manager: String,
    pub notes: Option<String>,
}

/// Registration and listing for purchases and receipts.
#[derive(Clone)]
pub struct ProcurementService {
    purchases: Arc<dyn TargetStore<Purchase>>,
    receipts: Arc<dyn FulfillmentStore<Receipt>>,
    purchase_ids: Arc<IdSequence>,
    receipt_ids: Arc<IdSequence>,
    events: EventSender,
}

impl ProcurementService {
    pub fn new(
        purchases: Arc<dyn TargetStore<Purchase>>,
        receipts: Arc<dyn FulfillmentStore<Receipt>>,
        purchase_ids: Arc<IdSequence>,
        receipt_ids: Arc<IdSequence>,
        events: EventSender,
    ) -> Self {
        Self {
            purchases,
            receipts,
            purchase_ids,
            receipt_ids,
            events,
        }
    }

    #[instrument(skip(self, input), fields(supplier_id = %input.supplier_id))]
    pub async fn create_purchase(
        &self,
        input: CreatePurchaseInput,
    ) -> Result<Purchase, ServiceError> {
        input.validate()?;
        if input.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "unit_price must be non-negative".to_string(),
            ));
        }

        let now = Utc::now();
        let purchase = Purchase {
            order_id: self.purchase_ids.next_id(),
            total_amount: input.unit_price * Decimal::from(input.order_quantity),
            supplier_id: input.supplier_id,
            supplier_name: input.supplier_name,
            product_code: input.product_code,
            product_name: input.product_name,
            order_quantity: input.order_quantity,
            unit_price: input.unit_price,
            order_date: input.order_date,
            expected_delivery_date: input.expected_delivery_date,
            status: PurchaseStatus::Pending,
            priority: input.priority,
            purchaser: input.purchaser,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        let created = self.purchases.insert(purchase).await?;
        info!(order_id = %created.order_id, "purchase created");
        self.events.send_or_log(Event::PurchaseCreated {
            order_id: created.order_id.clone(),
        });
        Ok(created)
    }

    pub async fn get_purchase(&self, order_id: &str) -> Result<Purchase, ServiceError> {
        self.purchases
            .get(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("purchase {} not found", order_id)))
    }

    /// All purchases, newest first.
    pub async fn list_purchases(&self) -> Result<Vec<Purchase>, ServiceError> {
        let mut purchases = self.purchases.list().await?;
        purchases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(purchases)
    }

    pub async fn remove_purchase(&self, order_id: &str) -> Result<(), ServiceError> {
        if !self.purchases.remove(order_id).await? {
            return Err(ServiceError::NotFound(format!(
                "purchase {} not found",
                order_id
            )));
        }
        Ok(())
    }

    /// Registers a goods receipt against an existing purchase. Supplier and
    /// product fields are carried over from the purchase.
    #[instrument(skip(self, input), fields(ordering_id = %input.ordering_id))]
    pub async fn create_receipt(&self, input: CreateReceiptInput) -> Result<Receipt, ServiceError> {
        input.validate()?;
        let purchase = self.get_purchase(&input.ordering_id).await?;

        let now = Utc::now();
        let receipt = Receipt {
            receipt_id: self.receipt_ids.next_id(),
            ordering_id: input.ordering_id,
            supplier_id: purchase.supplier_id,
            supplier_name: purchase.supplier_name,
            product_code: purchase.product_code,
            product_name: purchase.product_name,
            ordered_quantity: purchase.order_quantity,
            received_quantity: input.received_quantity,
            delivery_date: input.delivery_date,
            received_date: input.received_date,
            warehouse_location: input.warehouse_location,
            status: input.status.unwrap_or(ReceiptStatus::Pending),
            manager: input.manager,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        let created = self.receipts.insert(receipt).await?;
        info!(receipt_id = %created.receipt_id, "receipt created");
        self.events.send_or_log(Event::ReceiptCreated {
            receipt_id: created.receipt_id.clone(),
            ordering_id: created.ordering_id.clone(),
        });
        Ok(created)
    }

    pub async fn get_receipt(&self, receipt_id: &str) -> Result<Receipt, ServiceError> {
        self.receipts
            .get(receipt_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("receipt {} not found", receipt_id)))
    }

    pub async fn list_receipts(&self) -> Result<Vec<Receipt>, ServiceError> {
        let mut receipts = self.receipts.list().await?;
        receipts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(receipts)
    }

    pub async fn list_receipts_for_purchase(
        &self,
        order_id: &str,
    ) -> Result<Vec<Receipt>, ServiceError> {
        self.receipts.for_target(order_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use tokio::sync::mpsc;

    fn service() -> ProcurementService {
        let (tx, _rx) = mpsc::channel(64);
        ProcurementService::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryStore::new()),
            Arc::new(IdSequence::new("PO")),
            Arc::new(IdSequence::new("RCP")),
            EventSender::new(tx),
        )
    }

    fn purchase_input(qty: i64) -> CreatePurchaseInput {
        CreatePurchaseInput {
            supplier_id: "SUP-1".to_string(),
            supplier_name: "ACME".to_string(),
            product_code: "P-100".to_string(),
            product_name: "Gear Assembly".to_string(),
            order_quantity: qty,
            unit_price: dec!(3.50),
            order_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            expected_delivery_date: None,
            priority: Priority::Normal,
            purchaser: "kim".to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn purchase_total_amount_is_computed() {
        let svc = service();
        let purchase = svc.create_purchase(purchase_input(100)).await.unwrap();
        assert_eq!(purchase.order_id, "PO-00001");
        assert_eq!(purchase.total_amount, dec!(350.00));
        assert_eq!(purchase.status, PurchaseStatus::Pending);
    }

    #[tokio::test]
    async fn receipt_inherits_purchase_identity() {
        let svc = service();
        let purchase = svc.create_purchase(purchase_input(100)).await.unwrap();
        let receipt = svc
            .create_receipt(CreateReceiptInput {
                ordering_id: purchase.order_id.clone(),
                received_quantity: 40,
                delivery_date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
                received_date: None,
                warehouse_location: "WH-1".to_string(),
                status: None,
                manager: "lee".to_string(),
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(receipt.receipt_id, "RCP-00001");
        assert_eq!(receipt.supplier_id, "SUP-1");
        assert_eq!(receipt.ordered_quantity, 100);
        assert_eq!(receipt.status, ReceiptStatus::Pending);
    }

    #[tokio::test]
    async fn receipt_against_unknown_purchase_is_not_found() {
        let svc = service();
        let err = svc
            .create_receipt(CreateReceiptInput {
                ordering_id: "PO-404".to_string(),
                received_quantity: 40,
                delivery_date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
                received_date: None,
                warehouse_location: "WH-1".to_string(),
                status: None,
                manager: "lee".to_string(),
                notes: None,
            })
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::NotFound(_));
    }
}
