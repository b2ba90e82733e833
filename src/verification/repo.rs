use axum::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::store::StoreError;
use crate::verification::repo_types::VerificationToken;

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, token: &VerificationToken) -> Result<(), StoreError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<VerificationToken>, StoreError>;
    /// Any unconsumed token for the subject, expired or not. The issuance
    /// path refuses to re-issue while one exists.
    async fn find_outstanding(&self, email: &str) -> Result<Option<VerificationToken>, StoreError>;
    /// Marks the token consumed iff it matches `email`, is unconsumed and
    /// unexpired at `now`, in one conditional update. Returns whether this
    /// call was the one that consumed it.
    async fn consume(
        &self,
        token: &str,
        email: &str,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError>;
}

pub struct PgTokenStore {
    db: PgPool,
}

impl PgTokenStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert(&self, token: &VerificationToken) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO verification_tokens (token, email, created_at, expires_at, consumed)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&token.token)
        .bind(&token.email)
        .bind(token.created_at)
        .bind(token.expires_at)
        .bind(token.consumed)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<VerificationToken>, StoreError> {
        let row = sqlx::query_as::<_, VerificationToken>(
            r#"
            SELECT token, email, created_at, expires_at, consumed
            FROM verification_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_outstanding(&self, email: &str) -> Result<Option<VerificationToken>, StoreError> {
        let row = sqlx::query_as::<_, VerificationToken>(
            r#"
            SELECT token, email, created_at, expires_at, consumed
            FROM verification_tokens
            WHERE email = $1 AND consumed = FALSE
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn consume(
        &self,
        token: &str,
        email: &str,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError> {
        // The conditional update is the linearization point: of two
        // concurrent calls at most one sees rows_affected = 1.
        let result = sqlx::query(
            r#"
            UPDATE verification_tokens
               SET consumed = TRUE
             WHERE token = $1
               AND email = $2
               AND consumed = FALSE
               AND expires_at >= $3
            "#,
        )
        .bind(token)
        .bind(email)
        .bind(now)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
