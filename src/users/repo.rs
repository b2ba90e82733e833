use axum::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::StoreError;
use crate::users::repo_types::Account;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, account: &Account) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn update(&self, account: &Account) -> Result<(), StoreError>;
    /// Flips `email_verified` for the account bound to `email`.
    /// Returns false when no such account exists.
    async fn set_verified(&self, email: &str) -> Result<bool, StoreError>;
}

pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const ACCOUNT_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, email_verified, account_created, account_updated";

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, email, password_hash, first_name, last_name, email_verified, account_created, account_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.email_verified)
        .bind(account.account_created)
        .bind(account.account_updated)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
               SET password_hash = $2,
                   first_name = $3,
                   last_name = $4,
                   account_updated = $5
             WHERE id = $1
            "#,
        )
        .bind(account.id)
        .bind(&account.password_hash)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.account_updated)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn set_verified(&self, email: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET email_verified = TRUE,
                   account_updated = $2
             WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(OffsetDateTime::now_utc())
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
