use uuid::Uuid;

use crate::error::ApiError;
use crate::users::repo_types::Account;

pub(crate) mod basic;
pub mod extractors;
pub mod gate;
pub mod password;

pub use extractors::{Identity, Principal};
pub use gate::{decide, enforce, Decision, PrincipalState};

/// Ownership predicate shared by every mutating resource path.
///
/// Callers check existence first, so a failed comparison always means
/// "resource exists, requester is someone else" and answers 403.
pub fn ensure_owner(owner_id: Uuid, who: &Account) -> Result<(), ApiError> {
    if owner_id == who.id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("not the owner".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: Uuid) -> Account {
        Account {
            id,
            email: "owner@example.com".into(),
            password_hash: "x".into(),
            first_name: "O".into(),
            last_name: "W".into(),
            email_verified: true,
            account_created: time::OffsetDateTime::now_utc(),
            account_updated: time::OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn owner_matches_by_id() {
        let id = Uuid::new_v4();
        assert!(ensure_owner(id, &account(id)).is_ok());
    }

    #[test]
    fn non_owner_is_forbidden() {
        let err = ensure_owner(Uuid::new_v4(), &account(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
