use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::error::ApiError;
use crate::users::repo_types::Account;

/// The authenticated account the gate resolved for this request,
/// carried as a request extension. Absent on anonymous requests.
#[derive(Debug, Clone)]
pub struct Principal(pub Account);

/// Handler-side extractor for the principal. Routes behind the gate's
/// protected surface always have one; the rejection only fires if a
/// handler is wired onto a public route by mistake.
pub struct Identity(pub Account);

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(|p| Identity(p.0))
            .ok_or_else(|| ApiError::Unauthenticated("authentication required".into()))
    }
}
