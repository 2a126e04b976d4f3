//! Generic fulfillment reconciliation.
//!
//! One algorithm computes how completely a target record (production plan,
//! purchase order) has been fulfilled by its dependent records (work orders,
//! receipts). Rollups are always recomputed from live fulfillment records and
//! never persisted.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

use super::round2;
use crate::entities::{Fulfillment, FulfillmentTarget, Priority};
use crate::errors::ServiceError;
use crate::store::{FulfillmentStore, TargetStore};

/// Dimension a rollup is filtered by.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetFilter {
    All,
    Product(String),
    /// Work center (production) or supplier (procurement).
    Group(String),
    DateRange {
        start: NaiveDate,
        end: NaiveDate,
    },
    Priority(Priority),
}

impl TargetFilter {
    fn matches<T: FulfillmentTarget>(&self, target: &T) -> bool {
        match self {
            TargetFilter::All => true,
            TargetFilter::Product(code) => target.product_code() == code,
            TargetFilter::Group(key) => target.group_key() == key,
            TargetFilter::DateRange { start, end } => {
                let date = target.window_date();
                date >= *start && date <= *end
            }
            TargetFilter::Priority(priority) => target.priority() == *priority,
        }
    }
}

/// Quantity statistics for one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FulfillmentSummary {
    pub target_quantity: i64,
    /// Sum over all fulfillments regardless of status.
    pub total_contributed: i64,
    pub completed_quantity: i64,
    pub in_progress_quantity: i64,
    /// Target minus completed; may exceed the target when nothing completed.
    pub remaining_quantity: i64,
    /// completed / target as a percentage, two decimals; zero for a zero
    /// target.
    pub rate: f64,
    pub fulfillment_count: usize,
    pub completed_count: usize,
    pub in_progress_count: usize,
}

impl FulfillmentSummary {
    fn compute<F: Fulfillment>(target_quantity: i64, fulfillments: &[F]) -> Self {
        let mut total_contributed = 0;
        let mut completed_quantity = 0;
        let mut in_progress_quantity = 0;
        let mut completed_count = 0;
        let mut in_progress_count = 0;

        for f in fulfillments {
            total_contributed += f.quantity();
            if f.is_completed() {
                completed_quantity += f.quantity();
                completed_count += 1;
            } else if f.is_in_progress() {
                in_progress_quantity += f.quantity();
                in_progress_count += 1;
            }
        }

        let rate = if target_quantity > 0 {
            round2(completed_quantity as f64 / target_quantity as f64 * 100.0)
        } else {
            0.0
        };

        Self {
            target_quantity,
            total_contributed,
            completed_quantity,
            in_progress_quantity,
            remaining_quantity: target_quantity - completed_quantity,
            rate,
            fulfillment_count: fulfillments.len(),
            completed_count,
            in_progress_count,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.rate >= 100.0
    }
}

/// One target joined with its fulfillments and computed statistics.
#[derive(Debug, Clone, Serialize)]
pub struct TargetReconciliation<T, F> {
    pub target: T,
    pub summary: FulfillmentSummary,
    pub fulfillments: Vec<F>,
}

/// Aggregation across a filtered set of targets.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationRollup<T, F> {
    pub total_target_quantity: i64,
    pub total_completed_quantity: i64,
    /// total completed / total target as a percentage, two decimals.
    pub overall_rate: f64,
    pub target_count: usize,
    pub targets: Vec<TargetReconciliation<T, F>>,
}

/// An incomplete target whose expected date has passed.
#[derive(Debug, Clone, Serialize)]
pub struct DelayedTarget<T> {
    pub target: T,
    pub summary: FulfillmentSummary,
    pub expected_date: NaiveDate,
    pub delay_days: i64,
}

/// The join-and-rollup engine, generic over one target/fulfillment pair.
pub struct FulfillmentReconciler<T, F> {
    targets: Arc<dyn TargetStore<T>>,
    fulfillments: Arc<dyn FulfillmentStore<F>>,
}

impl<T, F> Clone for FulfillmentReconciler<T, F> {
    fn clone(&self) -> Self {
        Self {
            targets: self.targets.clone(),
            fulfillments: self.fulfillments.clone(),
        }
    }
}

impl<T, F> FulfillmentReconciler<T, F>
where
    T: FulfillmentTarget,
    F: Fulfillment,
{
    pub fn new(targets: Arc<dyn TargetStore<T>>, fulfillments: Arc<dyn FulfillmentStore<F>>) -> Self {
        Self {
            targets,
            fulfillments,
        }
    }

    /// Reconciles one target. A target with no fulfillments is a valid
    /// zero-rate result; only a missing target errors.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, target_id: &str) -> Result<TargetReconciliation<T, F>, ServiceError> {
        let target = self
            .targets
            .get(target_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("target {} not found", target_id)))?;
        let fulfillments = self.fulfillments.for_target(target_id).await?;
        let summary = FulfillmentSummary::compute(target.target_quantity(), &fulfillments);
        Ok(TargetReconciliation {
            target,
            summary,
            fulfillments,
        })
    }

    /// Reconciles every target matching `filter` and rolls the results up.
    ///
    /// Fulfillments for the whole set come from one bulk fetch grouped by
    /// foreign key; there is no per-target lookup loop.
    #[instrument(skip(self))]
    pub async fn reconcile_filtered(
        &self,
        filter: &TargetFilter,
    ) -> Result<ReconciliationRollup<T, F>, ServiceError> {
        if let TargetFilter::DateRange { start, end } = filter {
            if start > end {
                return Err(ServiceError::ValidationError(format!(
                    "invalid date range: {} > {}",
                    start, end
                )));
            }
        }

        let mut targets: Vec<T> = self
            .targets
            .list()
            .await?
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();
        targets.sort_by_key(|t| t.window_date());

        let ids: Vec<String> = targets.iter().map(|t| t.target_id().to_string()).collect();
        let mut grouped = self.fulfillments.for_targets(&ids).await?;

        let mut total_target_quantity = 0;
        let mut total_completed_quantity = 0;
        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            let fulfillments = grouped.remove(target.target_id()).unwrap_or_default();
            let summary = FulfillmentSummary::compute(target.target_quantity(), &fulfillments);
            total_target_quantity += summary.target_quantity;
            total_completed_quantity += summary.completed_quantity;
            results.push(TargetReconciliation {
                target,
                summary,
                fulfillments,
            });
        }

        let overall_rate = if total_target_quantity > 0 {
            round2(total_completed_quantity as f64 / total_target_quantity as f64 * 100.0)
        } else {
            0.0
        };

        Ok(ReconciliationRollup {
            total_target_quantity,
            total_completed_quantity,
            overall_rate,
            target_count: results.len(),
            targets: results,
        })
    }

    /// Targets whose completion rate is below 100%, earliest first.
    pub async fn pending(&self) -> Result<Vec<TargetReconciliation<T, F>>, ServiceError> {
        let rollup = self.reconcile_filtered(&TargetFilter::All).await?;
        Ok(rollup
            .targets
            .into_iter()
            .filter(|r| !r.summary.is_complete())
            .collect())
    }

    /// Targets fully (or over-) fulfilled, most recent first.
    pub async fn completed(&self) -> Result<Vec<TargetReconciliation<T, F>>, ServiceError> {
        let rollup = self.reconcile_filtered(&TargetFilter::All).await?;
        let mut done: Vec<TargetReconciliation<T, F>> = rollup
            .targets
            .into_iter()
            .filter(|r| r.summary.is_complete())
            .collect();
        done.sort_by(|a, b| b.target.window_date().cmp(&a.target.window_date()));
        Ok(done)
    }

    /// Open targets past their expected date with an incomplete rate, most
    /// overdue first.
    pub async fn delayed(&self, today: NaiveDate) -> Result<Vec<DelayedTarget<T>>, ServiceError> {
        let rollup = self.reconcile_filtered(&TargetFilter::All).await?;
        let mut delayed = Vec::new();
        for rec in rollup.targets {
            if rec.target.is_closed() || rec.summary.is_complete() {
                continue;
            }
            let Some(expected) = rec.target.expected_date() else {
                continue;
            };
            if today <= expected {
                continue;
            }
            delayed.push(DelayedTarget {
                delay_days: (today - expected).num_days(),
                expected_date: expected,
                target: rec.target,
                summary: rec.summary,
            });
        }
        delayed.sort_by_key(|d| d.expected_date);
        Ok(delayed)
    }
}
