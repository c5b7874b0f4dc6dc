use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::entities::production_record;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::{
    comments::{parse_column, CommentBody},
    records::{RecordFilter, RecordInput, RecordPatch},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Body of a process transition
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProcessTransition {
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "pack")]
    pub process: String,
}

pub fn records_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route(
            "/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
        .route("/:id/process", put(update_record_process))
        .route(
            "/:id/comments/:column",
            get(get_record_comment).put(save_record_comment),
        )
}

/// Comment routes keyed by record id, for clients that address comments directly
pub fn comments_routes() -> Router<AppState> {
    Router::new().route(
        "/:record_id/:column",
        get(get_record_comment)
            .post(save_record_comment)
            .put(save_record_comment),
    )
}

/// List production records
#[utoipa::path(
    get,
    path = "/api/v1/records",
    params(RecordFilter),
    responses(
        (status = 200, description = "Matching records, newest first", body = crate::ApiResponse<Vec<production_record::Model>>),
        (status = 400, description = "Malformed filter", body = crate::errors::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn list_records(
    State(state): State<AppState>,
    Query(filter): Query<RecordFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let records = state.services.records.list_records(&filter).await?;
    Ok(success_response(records))
}

/// Get a production record
#[utoipa::path(
    get,
    path = "/api/v1/records/{id}",
    params(("id" = i32, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record", body = crate::ApiResponse<production_record::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.services.records.get_record(id).await?;
    Ok(success_response(record))
}

/// Create a production record
#[utoipa::path(
    post,
    path = "/api/v1/records",
    request_body = RecordInput,
    responses(
        (status = 201, description = "Record created with derived columns", body = crate::ApiResponse<production_record::Model>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn create_record(
    State(state): State<AppState>,
    Json(payload): Json<RecordInput>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let record = state.services.records.create_record(payload).await?;
    Ok(created_response(record))
}

/// Update a production record
#[utoipa::path(
    put,
    path = "/api/v1/records/{id}",
    params(("id" = i32, Path, description = "Record id")),
    request_body = RecordPatch,
    responses(
        (status = 200, description = "Record updated", body = crate::ApiResponse<production_record::Model>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<RecordPatch>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let record = state.services.records.update_record(id, payload).await?;
    Ok(success_response(record))
}

/// Move a record to another process
#[utoipa::path(
    put,
    path = "/api/v1/records/{id}/process",
    params(("id" = i32, Path, description = "Record id")),
    request_body = ProcessTransition,
    responses(
        (status = 200, description = "Record moved", body = crate::ApiResponse<production_record::Model>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn update_record_process(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProcessTransition>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let record = state
        .services
        .records
        .update_record_process(id, &payload.process)
        .await?;
    Ok(success_response(record))
}

/// Delete a record and its comments
#[utoipa::path(
    delete,
    path = "/api/v1/records/{id}",
    params(("id" = i32, Path, description = "Record id")),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.records.delete_record(id).await?;
    Ok(no_content_response())
}

/// Read the comment on a record cell
#[utoipa::path(
    get,
    path = "/api/v1/records/{id}/comments/{column}",
    params(
        ("id" = i32, Path, description = "Record id"),
        ("column" = String, Path, description = "downtime_duration or adjustment_time")
    ),
    responses(
        (status = 200, description = "Comment text, empty when none", body = crate::ApiResponse<CommentBody>),
        (status = 400, description = "Column does not take comments", body = crate::errors::ErrorResponse),
        (status = 404, description = "Record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn get_record_comment(
    State(state): State<AppState>,
    Path((id, column)): Path<(i32, String)>,
) -> Result<impl IntoResponse, ServiceError> {
    let column = parse_column(&column)?;
    let comment = state.services.comments.get_comment(id, column).await?;
    Ok(success_response(comment))
}

/// Set or clear the comment on a record cell
#[utoipa::path(
    put,
    path = "/api/v1/records/{id}/comments/{column}",
    params(
        ("id" = i32, Path, description = "Record id"),
        ("column" = String, Path, description = "downtime_duration or adjustment_time")
    ),
    request_body = CommentBody,
    responses(
        (status = 200, description = "Stored comment; empty text removes it", body = crate::ApiResponse<CommentBody>),
        (status = 400, description = "Column does not take comments", body = crate::errors::ErrorResponse),
        (status = 404, description = "Record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Records"
)]
pub async fn save_record_comment(
    State(state): State<AppState>,
    Path((id, column)): Path<(i32, String)>,
    Json(payload): Json<CommentBody>,
) -> Result<impl IntoResponse, ServiceError> {
    let column = parse_column(&column)?;
    let comment = state
        .services
        .comments
        .save_comment(id, column, &payload.comment)
        .await?;
    Ok(success_response(comment))
}
