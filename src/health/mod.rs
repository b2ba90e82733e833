use axum::{
    async_trait,
    extract::{RawQuery, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::state::AppState;
use crate::store::StoreError;

/// Liveness recording: the probe is a round trip through the database,
/// not just a process-up answer.
#[async_trait]
pub trait HealthStore: Send + Sync {
    async fn record(&self) -> Result<(), StoreError>;
}

pub struct PgHealthStore {
    db: PgPool,
}

impl PgHealthStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HealthStore for PgHealthStore {
    async fn record(&self) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO health_checks (checked_at) VALUES ($1)")
            .bind(OffsetDateTime::now_utc())
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

pub fn router() -> Router<AppState> {
    // The gate lets any method through here; the guard answers 405 itself.
    Router::new()
        .route("/healthz", any(healthz))
        .route("/healthz/", any(healthz))
}

/// Request-shape check, separated from the probe so it stays a pure
/// function: GET only, no query string, no body.
fn guard(method: &Method, query: Option<&str>, headers: &HeaderMap) -> Option<StatusCode> {
    if method != Method::GET {
        return Some(StatusCode::METHOD_NOT_ALLOWED);
    }
    if query.is_some() {
        return Some(StatusCode::BAD_REQUEST);
    }
    let has_body = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .is_some_and(|len| len > 0)
        || headers.contains_key(header::TRANSFER_ENCODING);
    if has_body {
        return Some(StatusCode::BAD_REQUEST);
    }
    None
}

fn respond(status: StatusCode) -> Response {
    let mut res = status.into_response();
    let headers = res.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    if status == StatusCode::METHOD_NOT_ALLOWED {
        headers.insert(header::ALLOW, HeaderValue::from_static("GET"));
    }
    res
}

#[instrument(skip(state, headers))]
pub async fn healthz(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    if let Some(status) = guard(&method, query.as_deref(), &headers) {
        warn!(%method, %status, "health check rejected");
        return respond(status);
    }

    match state.health.record().await {
        Ok(()) => {
            info!("health check passed");
            respond(StatusCode::OK)
        }
        Err(e) => {
            error!(error = %e, "health check failed: database not accessible");
            respond(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
