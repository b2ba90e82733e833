use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::access::Identity;
use crate::error::{ApiError, ValidJson};
use crate::products::dto::{PatchProductRequest, ProductRequest};
use crate::products::repo_types::Product;
use crate::products::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/product", post(create_product))
        .route(
            "/product/:id",
            get(get_product)
                .put(replace_product)
                .patch(patch_product)
                .delete(delete_product),
        )
}

#[instrument(skip(state, identity, payload), fields(requested_by = %identity.0.id))]
async fn create_product(
    State(state): State<AppState>,
    identity: Identity,
    ValidJson(payload): ValidJson<ProductRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Product>), ApiError> {
    let product = services::create(&state, &identity.0, payload).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        format!("/product/{}", product.id).parse().unwrap(),
    );
    Ok((StatusCode::CREATED, headers, Json(product)))
}

#[instrument(skip(state))]
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = services::get(&state, id).await?;
    Ok(Json(product))
}

#[instrument(skip(state, identity, payload), fields(requested_by = %identity.0.id))]
async fn replace_product(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<ProductRequest>,
) -> Result<StatusCode, ApiError> {
    services::replace(&state, &identity.0, id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, identity, payload), fields(requested_by = %identity.0.id))]
async fn patch_product(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<PatchProductRequest>,
) -> Result<StatusCode, ApiError> {
    services::patch(&state, &identity.0, id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, identity), fields(requested_by = %identity.0.id))]
async fn delete_product(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    services::delete(&state, &identity.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
