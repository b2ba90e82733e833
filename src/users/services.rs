use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::password::hash_password;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{RegisterRequest, UpdateAccountRequest};
use crate::users::repo_types::Account;
use crate::verification;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

const MIN_PASSWORD_LEN: usize = 8;

/// Public registration. Refuses a taken handle and a handle with a
/// verification still pending, with distinct reasons; then creates the
/// account, issues the verification token and queues the notification.
/// A failed notification never rolls anything back.
pub async fn register(state: &AppState, req: RegisterRequest) -> Result<Account, ApiError> {
    let email = req.email.trim().to_lowercase();

    if !is_valid_email(&email) {
        warn!(email = %email, "registration rejected: invalid email");
        return Err(ApiError::Validation("invalid email address".into()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        warn!(email = %email, "registration rejected: password too short");
        return Err(ApiError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }

    if state.accounts.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "registration rejected: email already registered");
        return Err(ApiError::Conflict("email already registered".into()));
    }
    if state.tokens.find_outstanding(&email).await?.is_some() {
        warn!(email = %email, "registration rejected: verification already pending");
        return Err(ApiError::Conflict("verification already pending".into()));
    }

    let hash = hash_password(&req.password)?;
    let account = Account::new(&email, &hash, &req.first_name, &req.last_name);
    state.accounts.insert(&account).await?;

    let token = verification::issue(state, &email).await?;
    verification::dispatch(state, &token).await;

    info!(account_id = %account.id, email = %account.email, "account registered");
    Ok(account)
}

/// Self-only read. Existence is reported before ownership, matching the
/// mutating paths.
pub async fn get_account(state: &AppState, who: &Account, id: Uuid) -> Result<Account, ApiError> {
    let account = state
        .accounts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    if account.id != who.id {
        warn!(requested = %id, by = %who.id, "account read denied: not self");
        return Err(ApiError::Forbidden("not your account".into()));
    }
    Ok(account)
}

/// Self-only partial update over {first_name, last_name, password}.
pub async fn update_account(
    state: &AppState,
    who: &Account,
    id: Uuid,
    req: UpdateAccountRequest,
) -> Result<(), ApiError> {
    let mut account = state
        .accounts
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    if account.id != who.id {
        warn!(requested = %id, by = %who.id, "account update denied: not self");
        return Err(ApiError::Forbidden("not your account".into()));
    }

    if let Some(password) = &req.password {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }
        account.password_hash = hash_password(password)?;
    }
    if let Some(first_name) = req.first_name {
        account.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        account.last_name = last_name;
    }

    account.touch();
    state.accounts.update(&account).await?;
    info!(account_id = %account.id, "account updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_syntax_check() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email("spaces in@x.com"));
        assert!(!is_valid_email("a@@x.com"));
        assert!(!is_valid_email(""));
    }
}
