use sqlx::FromRow;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Single-use verification token. The value is random and unguessable;
/// the window is fixed at issuance.
#[derive(Debug, Clone, FromRow)]
pub struct VerificationToken {
    pub token: String,
    pub email: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub consumed: bool,
}

impl VerificationToken {
    pub fn issue(email: &str, window: Duration) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            token: Uuid::new_v4().to_string(),
            email: email.to_string(),
            created_at: now,
            expires_at: now + window,
            consumed: false,
        }
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_stamps_the_window() {
        let token = VerificationToken::issue("a@x.com", Duration::seconds(60));
        assert_eq!(token.expires_at - token.created_at, Duration::seconds(60));
        assert!(!token.consumed);
        assert!(!token.is_expired_at(token.created_at + Duration::seconds(59)));
        assert!(token.is_expired_at(token.created_at + Duration::seconds(61)));
    }

    #[test]
    fn token_values_are_unique() {
        let a = VerificationToken::issue("a@x.com", Duration::seconds(60));
        let b = VerificationToken::issue("a@x.com", Duration::seconds(60));
        assert_ne!(a.token, b.token);
    }
}
