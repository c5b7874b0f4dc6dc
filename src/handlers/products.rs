use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::entities::product;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::catalog::CatalogEntryInput;
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get},
    Router,
};

pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", delete(delete_product))
}

/// List products by name
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "All products", body = crate::ApiResponse<Vec<product::Model>>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.products.list_products().await?;
    Ok(success_response(products))
}

/// Add a product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CatalogEntryInput,
    responses(
        (status = 201, description = "Product created", body = crate::ApiResponse<product::Model>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already taken", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CatalogEntryInput>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let product = state.services.products.create_product(payload).await?;
    Ok(created_response(product))
}

/// Remove a product no record or plan uses
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Used by records or plans", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete_product(id).await?;
    Ok(no_content_response())
}
