use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::access::{basic, extractors::Principal, password::verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::StoreError;
use crate::users::repo_types::Account;

/// Whether a route needs an authenticated, verified principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Protected,
}

/// What the gate knows about the requester once credentials are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalState {
    Anonymous,
    Unverified,
    Verified,
}

/// Outcome of the gate decision. `Challenge` answers 401 with a Basic
/// challenge, `DenyUnverified` and `DenyClosed` both answer 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Challenge,
    DenyUnverified,
    DenyClosed,
}

struct Rule {
    /// Empty slice means any method.
    methods: &'static [Method],
    pattern: &'static str,
    access: Access,
}

/// The whole security surface as data. First match wins, so the public
/// rows that overlap a wildcard (`/user/verify` vs `/user/{id}`) come
/// first. Anything the table does not name fails closed.
static RULES: &[Rule] = &[
    Rule {
        methods: &[Method::POST],
        pattern: "/user",
        access: Access::Public,
    },
    Rule {
        methods: &[Method::GET],
        pattern: "/user/verify",
        access: Access::Public,
    },
    // The handler owns the 405 for non-GET probes.
    Rule {
        methods: &[],
        pattern: "/healthz",
        access: Access::Public,
    },
    Rule {
        methods: &[Method::GET],
        pattern: "/product/{id}",
        access: Access::Public,
    },
    Rule {
        methods: &[Method::GET],
        pattern: "/product/{id}/image",
        access: Access::Public,
    },
    Rule {
        methods: &[Method::GET],
        pattern: "/product/{id}/image/{image_id}",
        access: Access::Public,
    },
    Rule {
        methods: &[Method::GET, Method::PUT],
        pattern: "/user/{id}",
        access: Access::Protected,
    },
    Rule {
        methods: &[Method::POST],
        pattern: "/product",
        access: Access::Protected,
    },
    Rule {
        methods: &[Method::PUT, Method::PATCH, Method::DELETE],
        pattern: "/product/{id}",
        access: Access::Protected,
    },
    Rule {
        methods: &[Method::POST],
        pattern: "/product/{id}/image",
        access: Access::Protected,
    },
    Rule {
        methods: &[Method::DELETE],
        pattern: "/product/{id}/image/{image_id}",
        access: Access::Protected,
    },
];

impl Rule {
    fn matches(&self, method: &Method, path: &str) -> bool {
        (self.methods.is_empty() || self.methods.contains(method))
            && pattern_matches(self.pattern, path)
    }
}

/// Segment-wise match; `{...}` segments match any single non-empty segment.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut want = pattern.split('/').filter(|s| !s.is_empty());
    let mut have = path.split('/').filter(|s| !s.is_empty());
    loop {
        match (want.next(), have.next()) {
            (None, None) => return true,
            (Some(w), Some(h)) => {
                if !(w.starts_with('{') && w.ends_with('}')) && w != h {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

/// One trailing slash is equivalent to none.
fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Pure gate decision over (method, path, principal state). No I/O, no
/// mutation; the middleware below feeds it and translates the outcome.
pub fn decide(method: &Method, path: &str, principal: PrincipalState) -> Decision {
    let path = normalize(path);
    for rule in RULES {
        if rule.matches(method, path) {
            return match rule.access {
                Access::Public => Decision::Allow,
                Access::Protected => match principal {
                    PrincipalState::Anonymous => Decision::Challenge,
                    PrincipalState::Unverified => Decision::DenyUnverified,
                    PrincipalState::Verified => Decision::Allow,
                },
            };
        }
    }
    // Fail closed on unmatched routes: no 404s that confirm route existence.
    match principal {
        PrincipalState::Anonymous => Decision::Challenge,
        _ => Decision::DenyClosed,
    }
}

/// Resolves the Basic credentials against the account store. A store
/// outage is a distinct 503, never a silent deny.
async fn resolve(state: &AppState, header: &str) -> Result<Account, ApiError> {
    let Some((email, secret)) = basic::parse(header) else {
        return Err(ApiError::Unauthenticated("invalid authorization header".into()));
    };
    let account = state
        .accounts
        .find_by_email(&email.trim().to_lowercase())
        .await
        .map_err(|e| match e {
            StoreError::Unavailable(_) => {
                ApiError::Unavailable("account store unavailable".into())
            }
            other => ApiError::Internal(other.into()),
        })?
        .ok_or_else(|| ApiError::Unauthenticated("invalid credentials".into()))?;
    if !verify_password(&secret, &account.password_hash)? {
        warn!(email = %account.email, "failed credential check");
        return Err(ApiError::Unauthenticated("invalid credentials".into()));
    }
    Ok(account)
}

/// Per-request enforcement: authenticate, decide, and either reject or
/// attach the principal to the request for handlers to extract.
pub async fn enforce(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let credentials = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let principal = match credentials {
        None => None,
        Some(header) => match resolve(&state, &header).await {
            Ok(account) => Some(account),
            Err(e) => return e.into_response(),
        },
    };

    let principal_state = match &principal {
        None => PrincipalState::Anonymous,
        Some(a) if a.email_verified => PrincipalState::Verified,
        Some(_) => PrincipalState::Unverified,
    };

    match decide(req.method(), req.uri().path(), principal_state) {
        Decision::Allow => {
            if let Some(account) = principal {
                req.extensions_mut().insert(Principal(account));
            }
            next.run(req).await
        }
        Decision::Challenge => {
            ApiError::Unauthenticated("authentication required".into()).into_response()
        }
        Decision::DenyUnverified => {
            warn!(path = %req.uri().path(), "request blocked: email not verified");
            ApiError::Unverified("email not verified".into()).into_response()
        }
        Decision::DenyClosed => ApiError::Forbidden("forbidden".into()).into_response(),
    }
}
