use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::production_status::DateRangeQuery;
use crate::entities::Priority;
use crate::errors::ServiceError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(all_status))
        .route("/purchase/:order_id", get(purchase_status))
        .route("/product/:product_code", get(by_product))
        .route("/supplier/:supplier_id", get(by_supplier))
        .route("/date-range", get(by_date_range))
        .route("/priority/:priority", get(by_priority))
        .route("/pending", get(pending))
        .route("/completed", get(completed))
        .route("/delayed", get(delayed))
}

async fn all_status(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.purchase_receipt_status.all_status().await?))
}

async fn purchase_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .purchase_receipt_status
            .purchase_status(&order_id)
            .await?,
    ))
}

async fn by_product(
    State(state): State<AppState>,
    Path(product_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .purchase_receipt_status
            .by_product(&product_code)
            .await?,
    ))
}

async fn by_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .purchase_receipt_status
            .by_supplier(&supplier_id)
            .await?,
    ))
}

async fn by_date_range(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .purchase_receipt_status
            .by_date_range(range.start_date, range.end_date)
            .await?,
    ))
}

async fn by_priority(
    State(state): State<AppState>,
    Path(priority): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let priority = Priority::from_str(&priority)
        .map_err(|_| ServiceError::ValidationError(format!("unknown priority '{}'", priority)))?;
    Ok(Json(
        state.purchase_receipt_status.by_priority(priority).await?,
    ))
}

async fn pending(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.purchase_receipt_status.pending().await?))
}

async fn completed(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.purchase_receipt_status.completed().await?))
}

async fn delayed(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.purchase_receipt_status.delayed().await?))
}
