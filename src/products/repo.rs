use axum::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::products::repo_types::Product;
use crate::store::StoreError;

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError>;
    async fn sku_exists(&self, sku: &str) -> Result<bool, StoreError>;
    async fn update(&self, product: &Product) -> Result<(), StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

pub struct PgProductStore {
    db: PgPool,
}

impl PgProductStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, sku, manufacturer, quantity, owner_id, date_added, date_last_updated";

#[async_trait]
impl ProductStore for PgProductStore {
    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, sku, manufacturer, quantity, owner_id, date_added, date_last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(&product.manufacturer)
        .bind(product.quantity)
        .bind(product.owner_id)
        .bind(product.date_added)
        .bind(product.date_last_updated)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(product)
    }

    async fn sku_exists(&self, sku: &str) -> Result<bool, StoreError> {
        let found: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM products WHERE sku = $1 LIMIT 1")
                .bind(sku)
                .fetch_optional(&self.db)
                .await?;
        Ok(found.is_some())
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        // owner_id is deliberately absent: the owning account never changes.
        sqlx::query(
            r#"
            UPDATE products
               SET name = $2,
                   description = $3,
                   sku = $4,
                   manufacturer = $5,
                   quantity = $6,
                   date_last_updated = $7
             WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(&product.manufacturer)
        .bind(product.quantity)
        .bind(product.date_last_updated)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
