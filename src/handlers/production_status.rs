use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::entities::Priority;
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(all_status))
        .route("/plan/:plan_id", get(plan_status))
        .route("/product/:product_code", get(by_product))
        .route("/work-center/:work_center", get(by_work_center))
        .route("/date-range", get(by_date_range))
        .route("/priority/:priority", get(by_priority))
        .route("/pending", get(pending))
        .route("/completed", get(completed))
        .route("/delayed", get(delayed))
}

async fn all_status(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.production_status.all_status().await?))
}

async fn plan_status(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.production_status.plan_status(&plan_id).await?))
}

async fn by_product(
    State(state): State<AppState>,
    Path(product_code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state.production_status.by_product(&product_code).await?,
    ))
}

async fn by_work_center(
    State(state): State<AppState>,
    Path(work_center): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state.production_status.by_work_center(&work_center).await?,
    ))
}

async fn by_date_range(
    State(state): State<AppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .production_status
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
    Ok(Json(state.production_status.by_priority(priority).await?))
}

async fn pending(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.production_status.pending().await?))
}

async fn completed(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.production_status.completed().await?))
}

async fn delayed(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.production_status.delayed().await?))
}
