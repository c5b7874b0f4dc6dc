use super::common::{no_content_response, success_response, validate_input};
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::plans::{CompletionReport, PlanInput, PlanView};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompletionQuery {
    /// Product whose plan is reported
    #[serde(default)]
    pub product: String,
}

pub fn plans_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans).post(save_plan))
        .route("/:id", delete(delete_plan))
}

pub fn completion_routes() -> Router<AppState> {
    Router::new().route("/", get(get_completion))
}

/// List plans with their completion
#[utoipa::path(
    get,
    path = "/api/v1/production-plans",
    responses(
        (status = 200, description = "Plans ordered by product, each with its completion report", body = crate::ApiResponse<Vec<PlanView>>)
    ),
    tag = "Production Plans"
)]
pub async fn list_plans(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let plans = state.services.plans.list_plans().await?;
    Ok(success_response(plans))
}

/// Create or replace the plan of a product
#[utoipa::path(
    post,
    path = "/api/v1/production-plans",
    request_body = PlanInput,
    responses(
        (status = 200, description = "Plan stored", body = crate::ApiResponse<PlanView>),
        (status = 400, description = "Invalid slots", body = crate::errors::ErrorResponse)
    ),
    tag = "Production Plans"
)]
pub async fn save_plan(
    State(state): State<AppState>,
    Json(payload): Json<PlanInput>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let plan = state.services.plans.save_plan(payload).await?;
    Ok(success_response(plan))
}

/// Delete a plan
#[utoipa::path(
    delete,
    path = "/api/v1/production-plans/{id}",
    params(("id" = i32, Path, description = "Plan id")),
    responses(
        (status = 204, description = "Plan deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Production Plans"
)]
pub async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.plans.delete_plan(id).await?;
    Ok(no_content_response())
}

/// Completion of a single product
#[utoipa::path(
    get,
    path = "/api/v1/completion",
    params(CompletionQuery),
    responses(
        (status = 200, description = "Completion report; `configured` is false without a plan", body = crate::ApiResponse<CompletionReport>),
        (status = 400, description = "Missing product", body = crate::errors::ErrorResponse)
    ),
    tag = "Production Plans"
)]
pub async fn get_completion(
    State(state): State<AppState>,
    Query(query): Query<CompletionQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.plans.get_completion(&query.product).await?;
    Ok(success_response(report))
}
