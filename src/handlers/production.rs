use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::errors::ServiceError;
use crate::services::production::{CreatePlanInput, CreateWorkOrderInput};
use crate::AppState;

pub fn plans_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_plan).get(list_plans))
        .route("/:plan_id", get(get_plan).delete(delete_plan))
        .route("/:plan_id/work-orders", get(list_plan_work_orders))
}

pub fn work_orders_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_work_order).get(list_work_orders))
        .route("/:order_id", get(get_work_order))
}

async fn create_plan(
    State(state): State<AppState>,
    Json(input): Json<CreatePlanInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let plan = state.production.create_plan(input).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn list_plans(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.production.list_plans().await?))
}

async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.production.get_plan(&plan_id).await?))
}

async fn delete_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.production.remove_plan(&plan_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_plan_work_orders(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    // surfacing NotFound for an unknown plan, not an empty list
    state.production.get_plan(&plan_id).await?;
    Ok(Json(
        state.production.list_work_orders_for_plan(&plan_id).await?,
    ))
}

async fn create_work_order(
    State(state): State<AppState>,
    Json(input): Json<CreateWorkOrderInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.production.create_work_order(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_work_orders(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.production.list_work_orders().await?))
}

async fn get_work_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.production.get_work_order(&order_id).await?))
}
