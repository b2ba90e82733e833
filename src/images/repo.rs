use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::images::repo_types::Image;
use crate::store::StoreError;

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn insert(&self, image: &Image) -> Result<(), StoreError>;
    async fn list_by_product(&self, product_id: Uuid) -> Result<Vec<Image>, StoreError>;
    /// Lookup scoped to the owning product: an image id paired with the
    /// wrong product is a miss, not a leak.
    async fn find_by_id_and_product(
        &self,
        id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Image>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

pub struct PgImageStore {
    db: PgPool,
}

impl PgImageStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ImageStore for PgImageStore {
    async fn insert(&self, image: &Image) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO images (id, product_id, file_name, storage_path, date_created)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(image.id)
        .bind(image.product_id)
        .bind(&image.file_name)
        .bind(&image.storage_path)
        .bind(image.date_created)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn list_by_product(&self, product_id: Uuid) -> Result<Vec<Image>, StoreError> {
        let images = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, product_id, file_name, storage_path, date_created
            FROM images
            WHERE product_id = $1
            ORDER BY date_created ASC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;
        Ok(images)
    }

    async fn find_by_id_and_product(
        &self,
        id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Image>, StoreError> {
        let image = sqlx::query_as::<_, Image>(
            r#"
            SELECT id, product_id, file_name, storage_path, date_created
            FROM images
            WHERE id = $1 AND product_id = $2
            "#,
        )
        .bind(id)
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(image)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
