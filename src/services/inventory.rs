use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use super::round2;
use crate::entities::inventory::{InventoryRecord, InventoryStatus, MovementType};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::store::InventoryStore;

/// Input for registering a new ledger record.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInventoryInput {
    #[validate(length(min = 1))]
    pub product_code: String,
    #[validate(length(min = 1))]
    pub product_name: String,
    pub category: String,
    /// Defaults to zero when absent; status is derived accordingly.
    #[validate(range(min = 0))]
    pub current_stock: Option<i64>,
    #[validate(range(min = 0))]
    pub min_stock: Option<i64>,
    #[validate(range(min = 0))]
    pub max_stock: Option<i64>,
    #[validate(range(min = 0))]
    pub reorder_point: Option<i64>,
    pub unit_cost: Option<Decimal>,
    pub location: String,
    pub supplier: String,
    pub notes: Option<String>,
}

/// Input for a full-field update.
///
/// Absent fields keep their current values. `status_override` is the explicit
/// escape hatch: when present it is persisted verbatim, when absent the
/// status is re-derived by the single rule. Valuation is always recomputed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateInventoryInput {
    pub product_name: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0))]
    pub current_stock: Option<i64>,
    #[validate(range(min = 0))]
    pub min_stock: Option<i64>,
    #[validate(range(min = 0))]
    pub max_stock: Option<i64>,
    #[validate(range(min = 0))]
    pub reorder_point: Option<i64>,
    pub unit_cost: Option<Decimal>,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub status_override: Option<InventoryStatus>,
}

/// Input for a stock movement.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdjustStockInput {
    #[validate(range(min = 1))]
    pub quantity: i64,
    pub movement_type: MovementType,
    pub notes: Option<String>,
}

/// Per-product health detail.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryStatusReport {
    pub product_code: String,
    pub product_name: String,
    pub current_stock: i64,
    pub status: InventoryStatus,
    /// current / max stock as a percentage; zero when no max is set.
    pub stock_health_pct: f64,
    pub min_stock: i64,
    pub max_stock: i64,
    pub reorder_point: i64,
    pub unit_cost: Decimal,
    pub total_value: Decimal,
    pub needs_reorder: bool,
    pub recommended_order_quantity: i64,
    pub last_movement_date: Option<DateTime<Utc>>,
    pub movement_type: Option<MovementType>,
    pub movement_quantity: Option<i64>,
}

/// Counts of records per derived status.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusCounts {
    pub sufficient: usize,
    pub low: usize,
    pub out_of_stock: usize,
    pub excess: usize,
}

impl StatusCounts {
    fn tally(records: &[InventoryRecord]) -> Self {
        let mut counts = StatusCounts::default();
        for rec in records {
            match rec.status {
                InventoryStatus::Sufficient => counts.sufficient += 1,
                InventoryStatus::Low => counts.low += 1,
                InventoryStatus::OutOfStock => counts.out_of_stock += 1,
                InventoryStatus::Excess => counts.excess += 1,
            }
        }
        counts
    }
}

/// Fleet-level rollup across all ledger records.
#[derive(Debug, Clone, Serialize)]
pub struct InventorySummary {
    pub total_items: usize,
    pub total_stock: i64,
    pub total_value: Decimal,
    pub status_counts: StatusCounts,
}

/// One line of the low-stock (reorder) report.
#[derive(Debug, Clone, Serialize)]
pub struct LowStockItem {
    pub product_code: String,
    pub product_name: String,
    pub current_stock: i64,
    pub min_stock: i64,
    pub reorder_point: i64,
    pub max_stock: i64,
    pub reorder_quantity: i64,
    pub estimated_cost: Decimal,
    pub supplier: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LowStockReport {
    pub total_low_stock_items: usize,
    pub estimated_reorder_value: Decimal,
    pub items: Vec<LowStockItem>,
}

/// One line of the fleet-wide recent-movements view: the single last-movement
/// slot of a record, echoed for records that have moved at all.
#[derive(Debug, Clone, Serialize)]
pub struct RecentMovement {
    pub product_code: String,
    pub product_name: String,
    pub current_stock: i64,
    pub movement_type: MovementType,
    pub movement_quantity: i64,
    pub last_movement_date: DateTime<Utc>,
    pub location: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopValueItem {
    pub product_code: String,
    pub product_name: String,
    pub category: String,
    pub current_stock: i64,
    pub unit_cost: Decimal,
    pub total_value: Decimal,
    pub location: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopValueReport {
    pub top_items: Vec<TopValueItem>,
    /// Combined value of the selected items only.
    pub total_value: Decimal,
}

/// Status rollup over one dimension value (category, supplier or location).
#[derive(Debug, Clone, Serialize)]
pub struct InventoryGroupReport {
    pub group: String,
    pub total_items: usize,
    pub total_stock: i64,
    pub total_value: Decimal,
    pub status_counts: StatusCounts,
    pub records: Vec<InventoryRecord>,
}

/// Stock ledger service: record lifecycle plus the adjustment engine.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    events: EventSender,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>, events: EventSender) -> Self {
        Self { store, events }
    }

    /// Registers a new product in the ledger.
    #[instrument(skip(self, input), fields(product_code = %input.product_code))]
    pub async fn register(
        &self,
        input: RegisterInventoryInput,
    ) -> Result<InventoryRecord, ServiceError> {
        input.validate()?;
        let unit_cost = input.unit_cost.unwrap_or(Decimal::ZERO);
        if unit_cost < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "unit_cost must be non-negative".to_string(),
            ));
        }

        let now = Utc::now();
        let mut record = InventoryRecord {
            product_code: input.product_code,
            product_name: input.product_name,
            category: input.category,
            current_stock: input.current_stock.unwrap_or(0),
            min_stock: input.min_stock.unwrap_or(0),
            max_stock: input.max_stock.unwrap_or(0),
            reorder_point: input.reorder_point.unwrap_or(0),
            status: InventoryStatus::OutOfStock,
            unit_cost,
            total_value: Decimal::ZERO,
            location: input.location,
            supplier: input.supplier,
            notes: input.notes,
            last_movement_date: None,
            movement_type: None,
            movement_quantity: None,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        record.revalue();
        record.rederive_status();

        let created = self.store.insert(record).await?;
        info!(status = %created.status, "inventory registered");
        self.events.send_or_log(Event::InventoryRegistered {
            product_code: created.product_code.clone(),
        });
        Ok(created)
    }

    pub async fn get(&self, product_code: &str) -> Result<InventoryRecord, ServiceError> {
        self.store.get(product_code).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("inventory record {} not found", product_code))
        })
    }

    /// All records, most recently updated first.
    pub async fn list(&self) -> Result<Vec<InventoryRecord>, ServiceError> {
        let mut records = self.store.list().await?;
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    /// Full-field update. Valuation is always recomputed; status follows the
    /// derivation rule unless `status_override` is present.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        product_code: &str,
        input: UpdateInventoryInput,
    ) -> Result<InventoryRecord, ServiceError> {
        input.validate()?;
        if matches!(input.unit_cost, Some(c) if c < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "unit_cost must be non-negative".to_string(),
            ));
        }

        self.store
            .update_with(
                product_code,
                Box::new(move |rec| {
                    if let Some(name) = input.product_name {
                        rec.product_name = name;
                    }
                    if let Some(category) = input.category {
                        rec.category = category;
                    }
                    if let Some(stock) = input.current_stock {
                        rec.current_stock = stock;
                    }
                    if let Some(min) = input.min_stock {
                        rec.min_stock = min;
                    }
                    if let Some(max) = input.max_stock {
                        rec.max_stock = max;
                    }
                    if let Some(reorder) = input.reorder_point {
                        rec.reorder_point = reorder;
                    }
                    if let Some(cost) = input.unit_cost {
                        rec.unit_cost = cost;
                    }
                    if let Some(location) = input.location {
                        rec.location = location;
                    }
                    if let Some(supplier) = input.supplier {
                        rec.supplier = supplier;
                    }
                    if let Some(notes) = input.notes {
                        rec.notes = Some(notes);
                    }

                    rec.revalue();
                    match input.status_override {
                        Some(status) => rec.status = status,
                        None => rec.rederive_status(),
                    }
                    Ok(())
                }),
            )
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, product_code: &str) -> Result<(), ServiceError> {
        if !self.store.remove(product_code).await? {
            return Err(ServiceError::NotFound(format!(
                "inventory record {} not found",
                product_code
            )));
        }
        self.events.send_or_log(Event::InventoryRemoved {
            product_code: product_code.to_string(),
        });
        Ok(())
    }

    /// Applies one stock movement. All-or-nothing: a movement that would
    /// drive stock negative fails with `InsufficientStock` and the record
    /// stays byte-for-byte as it was.
    #[instrument(skip(self, input), fields(movement = %input.movement_type, quantity = input.quantity))]
    pub async fn adjust(
        &self,
        product_code: &str,
        input: AdjustStockInput,
    ) -> Result<InventoryRecord, ServiceError> {
        input.validate()?;
        let quantity = input.quantity;
        let movement_type = input.movement_type;
        let notes = input.notes;

        let updated = self
            .store
            .update_with(
                product_code,
                Box::new(move |rec| {
                    let new_stock = match movement_type {
                        MovementType::In | MovementType::Return => rec.current_stock + quantity,
                        MovementType::Out | MovementType::Transfer => {
                            let remaining = rec.current_stock - quantity;
                            if remaining < 0 {
                                return Err(ServiceError::InsufficientStock(format!(
                                    "cannot move {} out of {}: only {} on hand",
                                    quantity, rec.product_code, rec.current_stock
                                )));
                            }
                            remaining
                        }
                        // absolute set, not a delta
                        MovementType::Adjustment => quantity,
                    };

                    rec.current_stock = new_stock;
                    rec.revalue();
                    rec.rederive_status();
                    rec.last_movement_date = Some(Utc::now());
                    rec.movement_type = Some(movement_type);
                    rec.movement_quantity = Some(quantity);
                    if let Some(notes) = notes {
                        rec.notes = Some(notes);
                    }
                    Ok(())
                }),
            )
            .await?;

        info!(new_stock = updated.current_stock, status = %updated.status, "stock adjusted");
        self.events.send_or_log(Event::StockAdjusted {
            product_code: updated.product_code.clone(),
            movement_type,
            quantity,
            new_stock: updated.current_stock,
            status: updated.status,
        });
        Ok(updated)
    }

    /// Health detail for one product.
    pub async fn status_report(
        &self,
        product_code: &str,
    ) -> Result<InventoryStatusReport, ServiceError> {
        let rec = self.get(product_code).await?;
        let stock_health_pct = if rec.max_stock > 0 {
            round2(rec.current_stock as f64 / rec.max_stock as f64 * 100.0)
        } else {
            0.0
        };
        Ok(InventoryStatusReport {
            stock_health_pct,
            needs_reorder: rec.needs_reorder(),
            recommended_order_quantity: rec.recommended_order_quantity(),
            product_code: rec.product_code,
            product_name: rec.product_name,
            current_stock: rec.current_stock,
            status: rec.status,
            min_stock: rec.min_stock,
            max_stock: rec.max_stock,
            reorder_point: rec.reorder_point,
            unit_cost: rec.unit_cost,
            total_value: rec.total_value,
            last_movement_date: rec.last_movement_date,
            movement_type: rec.movement_type,
            movement_quantity: rec.movement_quantity,
        })
    }

    /// Fleet rollup: totals and per-status counts.
    pub async fn summary(&self) -> Result<InventorySummary, ServiceError> {
        let records = self.store.list().await?;
        Ok(InventorySummary {
            total_items: records.len(),
            total_stock: records.iter().map(|r| r.current_stock).sum(),
            total_value: records.iter().map(|r| r.total_value).sum(),
            status_counts: StatusCounts::tally(&records),
        })
    }

    /// Records at or below their reorder point, lowest stock first, with the
    /// estimated cost of refilling each to its max.
    pub async fn list_low_stock(&self) -> Result<LowStockReport, ServiceError> {
        let mut low: Vec<InventoryRecord> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|rec| rec.needs_reorder())
            .collect();
        low.sort_by_key(|rec| rec.current_stock);

        let items: Vec<LowStockItem> = low
            .into_iter()
            .map(|rec| {
                let reorder_quantity = (rec.max_stock - rec.current_stock).max(0);
                LowStockItem {
                    estimated_cost: Decimal::from(reorder_quantity) * rec.unit_cost,
                    reorder_quantity,
                    product_code: rec.product_code,
                    product_name: rec.product_name,
                    current_stock: rec.current_stock,
                    min_stock: rec.min_stock,
                    reorder_point: rec.reorder_point,
                    max_stock: rec.max_stock,
                    supplier: rec.supplier,
                    location: rec.location,
                }
            })
            .collect();

        Ok(LowStockReport {
            total_low_stock_items: items.len(),
            estimated_reorder_value: items.iter().map(|i| i.estimated_cost).sum(),
            items,
        })
    }

    pub async fn list_out_of_stock(&self) -> Result<Vec<InventoryRecord>, ServiceError> {
        let mut records: Vec<InventoryRecord> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|rec| rec.status == InventoryStatus::OutOfStock)
            .collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }

    pub async fn list_excess(&self) -> Result<Vec<InventoryRecord>, ServiceError> {
        let mut records: Vec<InventoryRecord> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|rec| rec.status == InventoryStatus::Excess)
            .collect();
        records.sort_by(|a, b| b.current_stock.cmp(&a.current_stock));
        Ok(records)
    }

    /// Most recent movements across the fleet, newest first. Records that
    /// have never moved are skipped.
    pub async fn recent_movements(&self, limit: usize) -> Result<Vec<RecentMovement>, ServiceError> {
        let mut movements: Vec<RecentMovement> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter_map(|rec| {
                let last_movement_date = rec.last_movement_date?;
                let movement_type = rec.movement_type?;
                let movement_quantity = rec.movement_quantity?;
                Some(RecentMovement {
                    product_code: rec.product_code,
                    product_name: rec.product_name,
                    current_stock: rec.current_stock,
                    movement_type,
                    movement_quantity,
                    last_movement_date,
                    location: rec.location,
                    notes: rec.notes,
                })
            })
            .collect();
        movements.sort_by(|a, b| b.last_movement_date.cmp(&a.last_movement_date));
        movements.truncate(limit);
        Ok(movements)
    }

    /// The top `limit` records by total value, highest first.
    pub async fn top_value_items(&self, limit: usize) -> Result<TopValueReport, ServiceError> {
        let mut records = self.store.list().await?;
        records.sort_by(|a, b| b.total_value.cmp(&a.total_value));
        records.truncate(limit);

        let top_items: Vec<TopValueItem> = records
            .into_iter()
            .map(|rec| TopValueItem {
                product_code: rec.product_code,
                product_name: rec.product_name,
                category: rec.category,
                current_stock: rec.current_stock,
                unit_cost: rec.unit_cost,
                total_value: rec.total_value,
                location: rec.location,
            })
            .collect();

        Ok(TopValueReport {
            total_value: top_items.iter().map(|i| i.total_value).sum(),
            top_items,
        })
    }

    pub async fn status_by_category(&self, category: &str) -> Result<InventoryGroupReport, ServiceError> {
        self.group_report(category, |rec| rec.category == category).await
    }

    pub async fn status_by_supplier(&self, supplier: &str) -> Result<InventoryGroupReport, ServiceError> {
        self.group_report(supplier, |rec| rec.supplier == supplier).await
    }

    pub async fn status_by_location(&self, location: &str) -> Result<InventoryGroupReport, ServiceError> {
        self.group_report(location, |rec| rec.location == location).await
    }

    /// Rollup over one dimension value. An absent value yields an empty
    /// report, not an error.
    async fn group_report(
        &self,
        group: &str,
        filter: impl Fn(&InventoryRecord) -> bool,
    ) -> Result<InventoryGroupReport, ServiceError> {
        let mut records: Vec<InventoryRecord> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|rec| filter(rec))
            .collect();
        records.sort_by(|a, b| a.product_name.cmp(&b.product_name));

        Ok(InventoryGroupReport {
            group: group.to_string(),
            total_items: records.len(),
            total_stock: records.iter().map(|r| r.current_stock).sum(),
            total_value: records.iter().map(|r| r.total_value).sum(),
            status_counts: StatusCounts::tally(&records),
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use tokio::sync::mpsc;

    fn service() -> InventoryService {
        let (tx, _rx) = mpsc::channel(64);
        InventoryService::new(Arc::new(InMemoryStore::new()), EventSender::new(tx))
    }

    fn register_input(code: &str, stock: i64, min: i64, max: i64) -> RegisterInventoryInput {
        RegisterInventoryInput {
            product_code: code.to_string(),
            product_name: "Gear Assembly".to_string(),
            category: "mechanical".to_string(),
            current_stock: Some(stock),
            min_stock: Some(min),
            max_stock: Some(max),
            reorder_point: Some(min),
            unit_cost: Some(dec!(4.00)),
            location: "A-01".to_string(),
            supplier: "SUP-1".to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn register_derives_status_and_valuation() {
        let svc = service();
        let rec = svc
            .register(register_input("P-100", 150, 20, 200))
            .await
            .unwrap();
        assert_eq!(rec.status, InventoryStatus::Sufficient);
        assert_eq!(rec.total_value, dec!(600.00));
    }

    #[tokio::test]
    async fn register_defaults_missing_stock_to_zero() {
        let svc = service();
        let mut input = register_input("P-100", 0, 20, 200);
        input.current_stock = None;
        let rec = svc.register(input).await.unwrap();
        assert_eq!(rec.current_stock, 0);
        assert_eq!(rec.status, InventoryStatus::OutOfStock);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let svc = service();
        svc.register(register_input("P-100", 10, 2, 50))
            .await
            .unwrap();
        let err = svc
            .register(register_input("P-100", 10, 2, 50))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::Conflict(_));
    }

    #[tokio::test]
    async fn inbound_movement_can_push_into_excess() {
        // 150/20/200 sufficient, +60 in -> 210 excess
        let svc = service();
        svc.register(register_input("P-100", 150, 20, 200))
            .await
            .unwrap();
        let rec = svc
            .adjust(
                "P-100",
                AdjustStockInput {
                    quantity: 60,
                    movement_type: MovementType::In,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(rec.current_stock, 210);
        assert_eq!(rec.status, InventoryStatus::Excess);
        assert_eq!(rec.total_value, dec!(840.00));
        assert_eq!(rec.movement_type, Some(MovementType::In));
        assert_eq!(rec.movement_quantity, Some(60));
        assert!(rec.last_movement_date.is_some());
    }

    #[tokio::test]
    async fn stock_at_min_boundary_is_low() {
        let svc = service();
        let rec = svc
            .register(register_input("P-100", 20, 20, 0))
            .await
            .unwrap();
        assert_eq!(rec.status, InventoryStatus::Low);
    }

    #[tokio::test]
    async fn overdraw_fails_and_leaves_record_unchanged() {
        let svc = service();
        svc.register(register_input("P-100", 50, 10, 200))
            .await
            .unwrap();
        let before = svc.get("P-100").await.unwrap();

        let err = svc
            .adjust(
                "P-100",
                AdjustStockInput {
                    quantity: 100,
                    movement_type: MovementType::Out,
                    notes: Some("should not stick".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::InsufficientStock(_));

        let after = svc.get("P-100").await.unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn outbound_to_exactly_zero_is_allowed() {
        let svc = service();
        svc.register(register_input("P-100", 50, 10, 200))
            .await
            .unwrap();
        let rec = svc
            .adjust(
                "P-100",
                AdjustStockInput {
                    quantity: 50,
                    movement_type: MovementType::Transfer,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(rec.current_stock, 0);
        assert_eq!(rec.status, InventoryStatus::OutOfStock);
        assert_eq!(rec.total_value, Decimal::ZERO);
    }

    #[tokio::test]
    async fn adjustment_sets_absolute_level() {
        let svc = service();
        svc.register(register_input("P-100", 150, 20, 200))
            .await
            .unwrap();
        let rec = svc
            .adjust(
                "P-100",
                AdjustStockInput {
                    quantity: 30,
                    movement_type: MovementType::Adjustment,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(rec.current_stock, 30);
        assert_eq!(rec.total_value, dec!(120.00));
    }

    #[tokio::test]
    async fn return_movement_adds_like_inbound() {
        let svc = service();
        svc.register(register_input("P-100", 10, 2, 200))
            .await
            .unwrap();
        let rec = svc
            .adjust(
                "P-100",
                AdjustStockInput {
                    quantity: 5,
                    movement_type: MovementType::Return,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(rec.current_stock, 15);
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected_before_the_engine() {
        let svc = service();
        svc.register(register_input("P-100", 10, 2, 200))
            .await
            .unwrap();
        let err = svc
            .adjust(
                "P-100",
                AdjustStockInput {
                    quantity: 0,
                    movement_type: MovementType::In,
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    #[tokio::test]
    async fn notes_survive_unless_resupplied() {
        let svc = service();
        let mut input = register_input("P-100", 10, 2, 200);
        input.notes = Some("initial".to_string());
        svc.register(input).await.unwrap();

        let rec = svc
            .adjust(
                "P-100",
                AdjustStockInput {
                    quantity: 1,
                    movement_type: MovementType::In,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(rec.notes.as_deref(), Some("initial"));

        let rec = svc
            .adjust(
                "P-100",
                AdjustStockInput {
                    quantity: 1,
                    movement_type: MovementType::In,
                    notes: Some("cycle count".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(rec.notes.as_deref(), Some("cycle count"));
    }

    #[tokio::test]
    async fn update_rederives_unless_overridden() {
        let svc = service();
        svc.register(register_input("P-100", 150, 20, 200))
            .await
            .unwrap();

        let rec = svc
            .update(
                "P-100",
                UpdateInventoryInput {
                    current_stock: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(rec.status, InventoryStatus::Low);
        assert_eq!(rec.total_value, dec!(40.00));

        let rec = svc
            .update(
                "P-100",
                UpdateInventoryInput {
                    status_override: Some(InventoryStatus::Sufficient),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(rec.status, InventoryStatus::Sufficient);
    }

    #[tokio::test]
    async fn status_report_includes_health_and_reorder_advice() {
        let svc = service();
        svc.register(register_input("P-100", 30, 10, 200))
            .await
            .unwrap();
        svc.update(
            "P-100",
            UpdateInventoryInput {
                reorder_point: Some(40),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let report = svc.status_report("P-100").await.unwrap();
        assert_eq!(report.stock_health_pct, 15.0);
        assert!(report.needs_reorder);
        assert_eq!(report.recommended_order_quantity, 170);
    }

    #[tokio::test]
    async fn low_stock_report_prices_the_refill() {
        let svc = service();
        svc.register(register_input("P-1", 5, 10, 50)).await.unwrap();
        svc.register(register_input("P-2", 100, 10, 200))
            .await
            .unwrap();

        let report = svc.list_low_stock().await.unwrap();
        assert_eq!(report.total_low_stock_items, 1);
        assert_eq!(report.items[0].reorder_quantity, 45);
        assert_eq!(report.estimated_reorder_value, dec!(180.00));
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let svc = service();
        let err = svc.get("MISSING").await.unwrap_err();
        assert_matches!(err, ServiceError::NotFound(_));

        let err = svc
            .adjust(
                "MISSING",
                AdjustStockInput {
                    quantity: 1,
                    movement_type: MovementType::In,
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::NotFound(_));
    }

    #[tokio::test]
    async fn recent_movements_are_newest_first_and_skip_unmoved_records() {
        let svc = service();
        svc.register(register_input("P-1", 50, 10, 200)).await.unwrap();
        svc.register(register_input("P-2", 50, 10, 200)).await.unwrap();
        svc.register(register_input("P-3", 50, 10, 200)).await.unwrap();

        svc.adjust(
            "P-1",
            AdjustStockInput {
                quantity: 5,
                movement_type: MovementType::In,
                notes: None,
            },
        )
        .await
        .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        svc.adjust(
            "P-2",
            AdjustStockInput {
                quantity: 3,
                movement_type: MovementType::Out,
                notes: None,
            },
        )
        .await
        .unwrap();

        let movements = svc.recent_movements(10).await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].product_code, "P-2");
        assert_eq!(movements[0].movement_type, MovementType::Out);
        assert_eq!(movements[0].movement_quantity, 3);
        assert_eq!(movements[1].product_code, "P-1");

        let truncated = svc.recent_movements(1).await.unwrap();
        assert_eq!(truncated.len(), 1);
        assert_eq!(truncated[0].product_code, "P-2");
    }

    #[tokio::test]
    async fn top_value_report_ranks_by_total_value() {
        let svc = service();
        svc.register(register_input("P-1", 10, 2, 500)).await.unwrap();
        svc.register(register_input("P-2", 100, 2, 500)).await.unwrap();
        svc.register(register_input("P-3", 50, 2, 500)).await.unwrap();

        let report = svc.top_value_items(2).await.unwrap();
        assert_eq!(report.top_items.len(), 2);
        assert_eq!(report.top_items[0].product_code, "P-2");
        assert_eq!(report.top_items[1].product_code, "P-3");
        // unit cost 4.00: 100 + 50 units selected
        assert_eq!(report.total_value, dec!(600.00));
    }

    #[tokio::test]
    async fn group_report_rolls_up_one_dimension_value() {
        let svc = service();
        let mut a = register_input("P-1", 50, 10, 200);
        a.category = "mechanical".to_string();
        let mut b = register_input("P-2", 0, 10, 200);
        b.category = "mechanical".to_string();
        let mut c = register_input("P-3", 50, 10, 200);
        c.category = "electrical".to_string();
        svc.register(a).await.unwrap();
        svc.register(b).await.unwrap();
        svc.register(c).await.unwrap();

        let report = svc.status_by_category("mechanical").await.unwrap();
        assert_eq!(report.group, "mechanical");
        assert_eq!(report.total_items, 2);
        assert_eq!(report.total_stock, 50);
        assert_eq!(report.status_counts.sufficient, 1);
        assert_eq!(report.status_counts.out_of_stock, 1);

        // absent value: empty report, not an error
        let empty = svc.status_by_supplier("SUP-404").await.unwrap();
        assert_eq!(empty.total_items, 0);
        assert_eq!(empty.total_value, Decimal::ZERO);
    }

    #[tokio::test]
    async fn summary_counts_by_status() {
        let svc = service();
        svc.register(register_input("P-1", 150, 20, 200))
            .await
            .unwrap();
        svc.register(register_input("P-2", 0, 20, 200)).await.unwrap();
        svc.register(register_input("P-3", 300, 20, 200))
            .await
            .unwrap();

        let summary = svc.summary().await.unwrap();
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_stock, 450);
        assert_eq!(summary.status_counts.sufficient, 1);
        assert_eq!(summary.status_counts.out_of_stock, 1);
        assert_eq!(summary.status_counts.excess, 1);
    }
}
