pub mod config;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::inventory::InventoryService;
use crate::services::procurement::ProcurementService;
use crate::services::production::ProductionService;
use crate::services::production_status::ProductionStatusService;
use crate::services::purchase_receipt_status::PurchaseReceiptStatusService;
use crate::store::memory::InMemoryStore;
use crate::store::IdSequence;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub inventory: InventoryService,
    pub production: ProductionService,
    pub procurement: ProcurementService,
    pub production_status: ProductionStatusService,
    pub purchase_receipt_status: PurchaseReceiptStatusService,
    pub event_sender: EventSender,
}

impl AppState {
    /// Wires up in-memory stores and the service layer. The plan and
    /// purchase stores are shared between the registration services and
    /// the status views so both see the same records.
    pub fn new(config: AppConfig, event_sender: EventSender) -> Self {
        let inventory_store = Arc::new(InMemoryStore::new());
        let plan_store = Arc::new(InMemoryStore::new());
        let work_order_store = Arc::new(InMemoryStore::new());
        let purchase_store = Arc::new(InMemoryStore::new());
        let receipt_store = Arc::new(InMemoryStore::new());

        let inventory = InventoryService::new(inventory_store, event_sender.clone());
        let production = ProductionService::new(
            plan_store.clone(),
            work_order_store.clone(),
            Arc::new(IdSequence::new("PLAN")),
            Arc::new(IdSequence::new("WO")),
            event_sender.clone(),
        );
        let procurement = ProcurementService::new(
            purchase_store.clone(),
            receipt_store.clone(),
            Arc::new(IdSequence::new("PO")),
            Arc::new(IdSequence::new("RCP")),
            event_sender.clone(),
        );
        let production_status = ProductionStatusService::new(plan_store, work_order_store);
        let purchase_receipt_status =
            PurchaseReceiptStatusService::new(purchase_store, receipt_store);

        Self {
            config,
            inventory,
            production,
            procurement,
            production_status,
            purchase_receipt_status,
            event_sender,
        }
    }
}

/// Builds the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", handlers::api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "mes-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
