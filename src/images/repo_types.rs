use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Image record: an opaque display name plus the backend-specific
/// storage path the object lives under. Paths are unique even when
/// display names collide.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Image {
    pub id: Uuid,
    pub product_id: Uuid,
    pub file_name: String,
    pub storage_path: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_created: OffsetDateTime,
}

impl Image {
    pub fn new(product_id: Uuid, file_name: &str, storage_path: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            file_name: file_name.to_string(),
            storage_path: storage_path.to_string(),
            date_created: OffsetDateTime::now_utc(),
        }
    }
}
