use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::instrument;
use uuid::Uuid;

use crate::access::Identity;
use crate::error::ApiError;
use crate::images::repo_types::Image;
use crate::images::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/product/:product_id/image",
            post(upload_image).get(list_images),
        )
        .route(
            "/product/:product_id/image/:image_id",
            get(get_image).delete(delete_image),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

/// Pulls the `file` part out of the multipart body.
async fn file_field(mut multipart: Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            return Ok((file_name, data));
        }
    }
    Err(ApiError::Validation(
        "multipart field 'file' is required".into(),
    ))
}

#[instrument(skip(state, identity, multipart), fields(requested_by = %identity.0.id))]
async fn upload_image(
    State(state): State<AppState>,
    identity: Identity,
    Path(product_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, HeaderMap, Json<Image>), ApiError> {
    let (file_name, data) = file_field(multipart).await?;
    let image = services::upload(&state, &identity.0, product_id, &file_name, data).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        format!("/product/{}/image/{}", product_id, image.id)
            .parse()
            .unwrap(),
    );
    Ok((StatusCode::CREATED, headers, Json(image)))
}

#[instrument(skip(state))]
async fn list_images(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Vec<Image>>, ApiError> {
    let images = services::list(&state, product_id).await?;
    Ok(Json(images))
}

#[instrument(skip(state))]
async fn get_image(
    State(state): State<AppState>,
    Path((product_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Image>, ApiError> {
    let image = services::get(&state, product_id, image_id).await?;
    Ok(Json(image))
}

#[instrument(skip(state, identity), fields(requested_by = %identity.0.id))]
async fn delete_image(
    State(state): State<AppState>,
    identity: Identity,
    Path((product_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    services::delete(&state, &identity.0, product_id, image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
