use std::fmt;

use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::verification::repo_types::VerificationToken;

/// Creates and records a fresh token for `email`. The caller has already
/// refused re-issuance while an unconsumed token is outstanding.
pub async fn issue(state: &AppState, email: &str) -> Result<VerificationToken, ApiError> {
    let token = VerificationToken::issue(email, state.config.verification_ttl);
    state.tokens.insert(&token).await?;
    info!(email = %email, "verification token issued");
    Ok(token)
}

/// Best-effort notification publish. At most once, never rolled back,
/// never surfaced to the registration caller; a lost message just leaves
/// the account unverified.
pub async fn dispatch(state: &AppState, token: &VerificationToken) {
    let link = format!(
        "http://{}/user/verify?email={}&token={}",
        state.config.verify_domain, token.email, token.token
    );
    match state
        .notifier
        .publish_verification(&token.email, &token.token, &link)
        .await
    {
        Ok(()) => info!(email = %token.email, "verification notification queued"),
        Err(e) => {
            error!(error = %e, email = %token.email, "verification notification failed; account stays unverified");
        }
    }
}

/// Consumes the token and flips the account's verified flag. Every
/// failure, including a store outage, collapses to one rejection; the
/// shape of the failure is only visible in the logs.
pub async fn verify(state: &AppState, email: &str, token_value: &str) -> Result<(), ApiError> {
    let email = email.trim().to_lowercase();
    let now = OffsetDateTime::now_utc();

    let rejected = || ApiError::Validation("verification failed".to_string());

    let consumed = state
        .tokens
        .consume(token_value, &email, now)
        .await
        .map_err(|e| {
            error!(error = %e, "token store failure during verification");
            rejected()
        })?;

    if !consumed {
        // Fetch once more purely to say why in the logs.
        match state.tokens.find_by_token(token_value).await {
            Ok(found) => {
                warn!(email = %email, reason = %check(found.as_ref(), &email, now), "verification failed")
            }
            Err(e) => warn!(email = %email, error = %e, "verification failed"),
        }
        return Err(rejected());
    }

    let flipped = state.accounts.set_verified(&email).await.map_err(|e| {
        error!(error = %e, "account store failure during verification");
        rejected()
    })?;
    if !flipped {
        warn!(email = %email, "verification failed: token without an account");
        return Err(rejected());
    }

    info!(email = %email, "email verified");
    Ok(())
}

/// Why a token cannot be consumed, in the order the checks apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    Usable,
    NotFound,
    WrongSubject,
    Expired,
    Consumed,
}

impl fmt::Display for TokenCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenCheck::Usable => "usable",
            TokenCheck::NotFound => "token not found",
            TokenCheck::WrongSubject => "token bound to another email",
            TokenCheck::Expired => "token expired",
            TokenCheck::Consumed => "token already used",
        };
        f.write_str(s)
    }
}

/// Pure classifier mirroring the conditional consume, used for
/// diagnostics and directly testable without a store.
pub fn check(token: Option<&VerificationToken>, email: &str, now: OffsetDateTime) -> TokenCheck {
    let Some(token) = token else {
        return TokenCheck::NotFound;
    };
    if token.email != email {
        return TokenCheck::WrongSubject;
    }
    if token.is_expired_at(now) {
        return TokenCheck::Expired;
    }
    if token.consumed {
        return TokenCheck::Consumed;
    }
    TokenCheck::Usable
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn token() -> VerificationToken {
        VerificationToken::issue("a@x.com", Duration::seconds(60))
    }

    #[test]
    fn classifies_missing_token() {
        let now = OffsetDateTime::now_utc();
        assert_eq!(check(None, "a@x.com", now), TokenCheck::NotFound);
    }

    #[test]
    fn classifies_wrong_subject_before_expiry() {
        let t = token();
        let late = t.expires_at + Duration::seconds(1);
        assert_eq!(check(Some(&t), "b@x.com", late), TokenCheck::WrongSubject);
    }

    #[test]
    fn classifies_expiry_before_consumption() {
        let mut t = token();
        t.consumed = true;
        let late = t.expires_at + Duration::seconds(1);
        assert_eq!(check(Some(&t), "a@x.com", late), TokenCheck::Expired);
    }

    #[test]
    fn classifies_consumed_inside_the_window() {
        let mut t = token();
        t.consumed = true;
        assert_eq!(check(Some(&t), "a@x.com", t.created_at), TokenCheck::Consumed);
    }

    #[test]
    fn fresh_token_is_usable() {
        let t = token();
        assert_eq!(check(Some(&t), "a@x.com", t.created_at), TokenCheck::Usable);
    }
}
