pub mod inventory;
pub mod procurement;
pub mod production;
pub mod production_status;
pub mod purchase_receipt_status;

use axum::Router;

use crate::AppState;

/// Composes every module router under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/inventory", inventory::router())
        .nest("/production-plans", production::plans_router())
        .nest("/work-orders", production::work_orders_router())
        .nest("/purchases", procurement::purchases_router())
        .nest("/receipts", procurement::receipts_router())
        .nest("/production-status", production_status::router())
        .nest("/purchase-receipt-status", purchase_receipt_status::router())
}
