pub mod inventory;
pub mod procurement;
pub mod production;
pub mod production_status;
pub mod purchase_receipt_status;
pub mod reconciliation;

/// Rounds a percentage to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
