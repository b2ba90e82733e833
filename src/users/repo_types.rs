use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
    pub first_name: String,
    pub last_name: String,
    pub email_verified: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub account_created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub account_updated: OffsetDateTime,
}

impl Account {
    /// Server-assigned fields are stamped here, at the construction
    /// boundary; clients never supply them.
    pub fn new(email: &str, password_hash: &str, first_name: &str, last_name: &str) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email_verified: false,
            account_created: now,
            account_updated: now,
        }
    }

    pub fn touch(&mut self) {
        self.account_updated = OffsetDateTime::now_utc();
    }
}
