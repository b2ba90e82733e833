use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::products::dto::ProductRequest;

/// Product record in the database. `owner_id` is set once at creation
/// and never reassigned.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub sku: String,
    pub manufacturer: String,
    pub quantity: i32,
    pub owner_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date_added: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub date_last_updated: OffsetDateTime,
}

impl Product {
    pub fn new(req: ProductRequest, owner_id: Uuid) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            sku: req.sku,
            manufacturer: req.manufacturer,
            quantity: req.quantity,
            owner_id,
            date_added: now,
            date_last_updated: now,
        }
    }

    pub fn touch(&mut self) {
        self.date_last_updated = OffsetDateTime::now_utc();
    }
}
