use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::errors::ServiceError;
use crate::services::procurement::{CreatePurchaseInput, CreateReceiptInput};
use crate::AppState;

pub fn purchases_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase).get(list_purchases))
        .route("/:order_id", get(get_purchase).delete(delete_purchase))
        .route("/:order_id/receipts", get(list_purchase_receipts))
}

pub fn receipts_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_receipt).get(list_receipts))
        .route("/:receipt_id", get(get_receipt))
}

async fn create_purchase(
    State(state): State<AppState>,
    Json(input): Json<CreatePurchaseInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let purchase = state.procurement.create_purchase(input).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

async fn list_purchases(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.procurement.list_purchases().await?))
}

async fn get_purchase(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.procurement.get_purchase(&order_id).await?))
}

async fn delete_purchase(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.procurement.remove_purchase(&order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_purchase_receipts(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.procurement.get_purchase(&order_id).await?;
    Ok(Json(
        state
            .procurement
            .list_receipts_for_purchase(&order_id)
            .await?,
    ))
}

async fn create_receipt(
    State(state): State<AppState>,
    Json(input): Json<CreateReceiptInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let receipt = state.procurement.create_receipt(input).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn list_receipts(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.procurement.list_receipts().await?))
}

async fn get_receipt(
    State(state): State<AppState>,
    Path(receipt_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.procurement.get_receipt(&receipt_id).await?))
}
