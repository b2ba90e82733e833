use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::access::Identity;
use crate::error::{ApiError, ValidJson};
use crate::state::AppState;
use crate::users::dto::{RegisterRequest, UpdateAccountRequest, VerifyParams};
use crate::users::repo_types::Account;
use crate::users::services;
use crate::verification;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user", post(register))
        .route("/user/verify", get(verify_email))
        .route("/user/:id", get(get_account).put(update_account))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Account>), ApiError> {
    let account = services::register(&state, payload).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::LOCATION,
        format!("/user/{}", account.id).parse().unwrap(),
    );
    Ok((StatusCode::CREATED, headers, Json(account)))
}

#[instrument(skip(state, params), fields(email = %params.email))]
async fn verify_email(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Result<StatusCode, ApiError> {
    verification::verify(&state, &params.email, &params.token).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state, identity), fields(requested_by = %identity.0.id))]
async fn get_account(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, ApiError> {
    let account = services::get_account(&state, &identity.0, id).await?;
    Ok(Json(account))
}

#[instrument(skip(state, identity, payload), fields(requested_by = %identity.0.id))]
async fn update_account(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<UpdateAccountRequest>,
) -> Result<StatusCode, ApiError> {
    services::update_account(&state, &identity.0, id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}
