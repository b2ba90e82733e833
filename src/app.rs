use std::net::SocketAddr;

use axum::{
    extract::Request,
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::access::{self, Principal};
use crate::error::ApiError;
use crate::state::AppState;
use crate::{health, images, products, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(users::router())
        .merge(products::router())
        .merge(images::router())
        .merge(health::router())
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            access::enforce,
        ))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let request_id = Uuid::new_v4().simple().to_string()[..8].to_string();
                    tracing::info_span!("http_request", %method, uri = %uri, %request_id)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

/// The gate fails unmatched routes closed before they get here, but the
/// router's own misses (method mismatches on known paths) answer the
/// same way: 403 when authenticated, 401 challenge when not.
async fn fallback(req: Request) -> Response {
    if req.extensions().get::<Principal>().is_some() {
        ApiError::Forbidden("forbidden".into()).into_response()
    } else {
        ApiError::Unauthenticated("authentication required".into()).into_response()
    }
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
