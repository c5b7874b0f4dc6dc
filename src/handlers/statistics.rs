use super::common::success_response;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::{records::RecordFilter, statistics::RecordStatistics};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};

pub fn statistics_routes() -> Router<AppState> {
    Router::new().route("/", get(get_statistics))
}

/// Totals and average rates over the filtered records
#[utoipa::path(
    get,
    path = "/api/v1/statistics",
    params(RecordFilter),
    responses(
        (status = 200, description = "Aggregates", body = crate::ApiResponse<RecordStatistics>)
    ),
    tag = "Records"
)]
pub async fn get_statistics(
    State(state): State<AppState>,
    Query(filter): Query<RecordFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let stats = state.services.statistics.get_statistics(&filter).await?;
    Ok(success_response(stats))
}
