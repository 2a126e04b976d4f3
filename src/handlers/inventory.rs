use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::errors::ServiceError;
use crate::services::inventory::{AdjustStockInput, RegisterInventoryInput, UpdateInventoryInput};
use crate::AppState;

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_inventory).get(list_inventory))
        .route("/summary", get(inventory_summary))
        .route("/low-stock", get(low_stock))
        .route("/out-of-stock", get(out_of_stock))
        .route("/excess", get(excess))
        .route("/recent-movements", get(recent_movements))
        .route("/top-value", get(top_value))
        .route("/category/:category", get(status_by_category))
        .route("/supplier/:supplier", get(status_by_supplier))
        .route("/location/:location", get(status_by_location))
        .route(
            "/:product_code",
            get(get_inventory).put(update_inventory).delete(delete_inventory),
        )
        .route("/:product_code/adjust", post(adjust_stock))
        .route("/:product_code/status", get(inventory_status))
}

async fn register_inventory(
    State(state): State<AppState>,
    Json(input): Json<RegisterInventoryInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.inventory.register(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_inventory(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.inventory.list().await?))
}

async fn get_inventory(
    State(state): State<AppState>,
    Path(product_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.inventory.get(&product_code).await?))
}

async fn update_inventory(
    State(state): State<AppState>,
    Path(product_code): Path<String>,
    Json(input): Json<UpdateInventoryInput>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.inventory.update(&product_code, input).await?))
}

async fn delete_inventory(
    State(state): State<AppState>,
    Path(product_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.inventory.remove(&product_code).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn adjust_stock(
    State(state): State<AppState>,
    Path(product_code): Path<String>,
    Json(input): Json<AdjustStockInput>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.inventory.adjust(&product_code, input).await?))
}

async fn inventory_status(
    State(state): State<AppState>,
    Path(product_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.inventory.status_report(&product_code).await?))
}

async fn inventory_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.inventory.summary().await?))
}

async fn low_stock(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.inventory.list_low_stock().await?))
}

async fn out_of_stock(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.inventory.list_out_of_stock().await?))
}

async fn excess(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.inventory.list_excess().await?))
}

async fn recent_movements(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .inventory
            .recent_movements(query.limit.unwrap_or(20))
            .await?,
    ))
}

async fn top_value(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .inventory
            .top_value_items(query.limit.unwrap_or(10))
            .await?,
    ))
}

async fn status_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.inventory.status_by_category(&category).await?))
}

async fn status_by_supplier(
    State(state): State<AppState>,
    Path(supplier): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.inventory.status_by_supplier(&supplier).await?))
}

async fn status_by_location(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.inventory.status_by_location(&location).await?))
}
