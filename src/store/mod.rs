//! Keyed record stores.
//!
//! Durable persistence is an external collaborator; the core works against
//! these traits and ships DashMap-backed implementations for serving and
//! tests.

pub mod memory;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::entities::inventory::InventoryRecord;
use crate::entities::procurement::{Purchase, Receipt};
use crate::entities::production::{ProductionPlan, WorkOrder};
use crate::entities::Fulfillment;
use crate::errors::ServiceError;

/// A record addressable by its natural key.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for InventoryRecord {
    fn key(&self) -> &str {
        &self.product_code
    }
}

impl Keyed for ProductionPlan {
    fn key(&self) -> &str {
        &self.plan_id
    }
}

impl Keyed for WorkOrder {
    fn key(&self) -> &str {
        &self.order_id
    }
}

impl Keyed for Purchase {
    fn key(&self) -> &str {
        &self.order_id
    }
}

impl Keyed for Receipt {
    fn key(&self) -> &str {
        &self.receipt_id
    }
}

/// Mutation applied to one ledger record under the key's write lock.
pub type StockMutation =
    Box<dyn FnOnce(&mut InventoryRecord) -> Result<(), ServiceError> + Send>;

/// Store for the stock ledger.
///
/// `update_with` must apply the mutation atomically per key: concurrent calls
/// on one product code serialize, and a mutation that errors leaves the
/// record untouched. Implementations bump `version` and stamp `updated_at`
/// after a successful mutation.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Inserts a new record; a duplicate product code is a `Conflict`.
    async fn insert(&self, record: InventoryRecord) -> Result<InventoryRecord, ServiceError>;

    async fn get(&self, product_code: &str) -> Result<Option<InventoryRecord>, ServiceError>;

    async fn list(&self) -> Result<Vec<InventoryRecord>, ServiceError>;

    /// Applies `mutation` to the record under the key's lock and returns the
    /// updated record. Unknown key is `NotFound`.
    async fn update_with(
        &self,
        product_code: &str,
        mutation: StockMutation,
    ) -> Result<InventoryRecord, ServiceError>;

    /// Removes the record; returns whether it existed.
    async fn remove(&self, product_code: &str) -> Result<bool, ServiceError>;
}

/// Read/write access to target records (plans, purchases).
#[async_trait]
pub trait TargetStore<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    /// Inserts a new record; a duplicate key is a `Conflict`.
    async fn insert(&self, record: T) -> Result<T, ServiceError>;

    async fn get(&self, id: &str) -> Result<Option<T>, ServiceError>;

    async fn list(&self) -> Result<Vec<T>, ServiceError>;

    async fn remove(&self, id: &str) -> Result<bool, ServiceError>;
}

/// Read/write access to fulfillment records (work orders, receipts).
#[async_trait]
pub trait FulfillmentStore<F>: Send + Sync
where
    F: Fulfillment,
{
    /// Inserts a new record; a duplicate key is a `Conflict`.
    async fn insert(&self, record: F) -> Result<F, ServiceError>;

    async fn get(&self, id: &str) -> Result<Option<F>, ServiceError>;

    async fn list(&self) -> Result<Vec<F>, ServiceError>;

    /// All fulfillments referencing one target.
    async fn for_target(&self, target_id: &str) -> Result<Vec<F>, ServiceError>;

    /// All fulfillments for a set of targets in one call, grouped by foreign
    /// key. Rollups over filtered target sets go through here so that the
    /// reconciler never fetches per target in a loop.
    async fn for_targets(
        &self,
        target_ids: &[String],
    ) -> Result<HashMap<String, Vec<F>>, ServiceError>;

    async fn remove(&self, id: &str) -> Result<bool, ServiceError>;
}

/// Monotonic id generator producing `PREFIX-NNNNN` identifiers.
///
/// Injected into the create paths so ids never derive from row counts.
#[derive(Debug)]
pub struct IdSequence {
    prefix: String,
    counter: AtomicU64,
}

impl IdSequence {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{:05}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_sequence_is_monotonic_and_formatted() {
        let seq = IdSequence::new("WO");
        assert_eq!(seq.next_id(), "WO-00001");
        assert_eq!(seq.next_id(), "WO-00002");
    }

    #[test]
    fn id_sequence_is_race_free() {
        use std::sync::Arc;

        let seq = Arc::new(IdSequence::new("PO"));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let seq = seq.clone();
            handles.push(std::thread::spawn(move || {
                (0..100).map(|_| seq.next_id()).collect::<Vec<_>>()
            }));
        }

        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 800);
    }
}
