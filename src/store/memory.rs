use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{FulfillmentStore, InventoryStore, Keyed, StockMutation, TargetStore};
use crate::entities::inventory::InventoryRecord;
use crate::entities::Fulfillment;
use crate::errors::ServiceError;

/// DashMap-backed keyed store.
///
/// The map's shard lock gives atomic per-key mutation, which is what the
/// ledger's `update_with` contract requires.
#[derive(Debug)]
pub struct InMemoryStore<T> {
    records: DashMap<String, T>,
}

impl<T: Clone> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }
}

impl<T: Clone> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed + Clone> InMemoryStore<T> {
    fn insert_new(&self, record: T) -> Result<T, ServiceError> {
        match self.records.entry(record.key().to_string()) {
            Entry::Occupied(e) => Err(ServiceError::Conflict(format!(
                "record {} already exists",
                e.key()
            ))),
            Entry::Vacant(v) => {
                v.insert(record.clone());
                Ok(record)
            }
        }
    }

    fn get_cloned(&self, id: &str) -> Option<T> {
        self.records.get(id).map(|r| r.value().clone())
    }

    fn list_cloned(&self) -> Vec<T> {
        self.records.iter().map(|r| r.value().clone()).collect()
    }

    fn remove_key(&self, id: &str) -> bool {
        self.records.remove(id).is_some()
    }
}

#[async_trait]
impl InventoryStore for InMemoryStore<InventoryRecord> {
    async fn insert(&self, record: InventoryRecord) -> Result<InventoryRecord, ServiceError> {
        self.insert_new(record)
    }

    async fn get(&self, product_code: &str) -> Result<Option<InventoryRecord>, ServiceError> {
        Ok(self.get_cloned(product_code))
    }

    async fn list(&self) -> Result<Vec<InventoryRecord>, ServiceError> {
        Ok(self.list_cloned())
    }

    async fn update_with(
        &self,
        product_code: &str,
        mutation: StockMutation,
    ) -> Result<InventoryRecord, ServiceError> {
        let mut entry = self.records.get_mut(product_code).ok_or_else(|| {
            ServiceError::NotFound(format!("inventory record {} not found", product_code))
        })?;

        // Mutate a draft so a failed mutation leaves the record untouched.
        let mut draft = entry.clone();
        mutation(&mut draft)?;
        draft.version = entry.version + 1;
        draft.updated_at = Utc::now();
        *entry = draft.clone();
        Ok(draft)
    }

    async fn remove(&self, product_code: &str) -> Result<bool, ServiceError> {
        Ok(self.remove_key(product_code))
    }
}

#[async_trait]
impl<T> TargetStore<T> for InMemoryStore<T>
where
    T: Keyed + Clone + Send + Sync + 'static,
{
    async fn insert(&self, record: T) -> Result<T, ServiceError> {
        self.insert_new(record)
    }

    async fn get(&self, id: &str) -> Result<Option<T>, ServiceError> {
        Ok(self.get_cloned(id))
    }

    async fn list(&self) -> Result<Vec<T>, ServiceError> {
        Ok(self.list_cloned())
    }

    async fn remove(&self, id: &str) -> Result<bool, ServiceError> {
        Ok(self.remove_key(id))
    }
}

#[async_trait]
impl<F> FulfillmentStore<F> for InMemoryStore<F>
where
    F: Fulfillment + Keyed,
{
    async fn insert(&self, record: F) -> Result<F, ServiceError> {
        self.insert_new(record)
    }

    async fn get(&self, id: &str) -> Result<Option<F>, ServiceError> {
        Ok(self.get_cloned(id))
    }

    async fn list(&self) -> Result<Vec<F>, ServiceError> {
        Ok(self.list_cloned())
    }

    async fn for_target(&self, target_id: &str) -> Result<Vec<F>, ServiceError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.target_id() == Some(target_id))
            .map(|r| r.value().clone())
            .collect())
    }

    async fn for_targets(
        &self,
        target_ids: &[String],
    ) -> Result<HashMap<String, Vec<F>>, ServiceError> {
        let wanted: HashSet<&str> = target_ids.iter().map(String::as_str).collect();
        let mut grouped: HashMap<String, Vec<F>> = HashMap::new();
        for record in self.records.iter() {
            if let Some(tid) = record.target_id() {
                if wanted.contains(tid) {
                    grouped
                        .entry(tid.to_string())
                        .or_default()
                        .push(record.value().clone());
                }
            }
        }
        Ok(grouped)
    }

    async fn remove(&self, id: &str) -> Result<bool, ServiceError> {
        Ok(self.remove_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::inventory::{InventoryStatus, MovementType};
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn record(code: &str, stock: i64) -> InventoryRecord {
        let now = Utc::now();
        InventoryRecord {
            product_code: code.to_string(),
            product_name: "Widget".to_string(),
            category: "parts".to_string(),
            current_stock: stock,
            min_stock: 10,
            max_stock: 100,
            reorder_point: 20,
            status: InventoryStatus::derive(stock, 10, 100, 20),
            unit_cost: dec!(2.50),
            total_value: dec!(2.50) * rust_decimal::Decimal::from(stock),
            location: "A-1".to_string(),
            supplier: "ACME".to_string(),
            notes: None,
            last_movement_date: None,
            movement_type: None,
            movement_quantity: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    // InMemoryStore<InventoryRecord> also satisfies the generic store
    // traits, so the calls below are fully qualified.
    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let store = InMemoryStore::new();
        InventoryStore::insert(&store, record("P-1", 50)).await.unwrap();
        let err = InventoryStore::insert(&store, record("P-1", 10))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::Conflict(_));
    }

    #[tokio::test]
    async fn failed_mutation_leaves_record_untouched() {
        let store = InMemoryStore::new();
        InventoryStore::insert(&store, record("P-1", 50)).await.unwrap();

        let err = store
            .update_with(
                "P-1",
                Box::new(|rec| {
                    rec.current_stock = 0;
                    Err(ServiceError::InsufficientStock("nope".into()))
                }),
            )
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::InsufficientStock(_));

        let rec = InventoryStore::get(&store, "P-1").await.unwrap().unwrap();
        assert_eq!(rec.current_stock, 50);
        assert_eq!(rec.version, 0);
    }

    #[tokio::test]
    async fn successful_mutation_bumps_version() {
        let store = InMemoryStore::new();
        InventoryStore::insert(&store, record("P-1", 50)).await.unwrap();

        let updated = store
            .update_with(
                "P-1",
                Box::new(|rec| {
                    rec.current_stock += 5;
                    rec.movement_type = Some(MovementType::In);
                    Ok(())
                }),
            )
            .await
            .unwrap();
        assert_eq!(updated.current_stock, 55);
        assert_eq!(updated.version, 1);
    }

    #[tokio::test]
    async fn concurrent_adjusts_on_one_key_are_not_lost() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryStore::new());
        InventoryStore::insert(&*store, record("P-1", 0)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update_with(
                        "P-1",
                        Box::new(|rec| {
                            rec.current_stock += 1;
                            Ok(())
                        }),
                    )
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let rec = InventoryStore::get(&*store, "P-1").await.unwrap().unwrap();
        assert_eq!(rec.current_stock, 50);
        assert_eq!(rec.version, 50);
    }
}
