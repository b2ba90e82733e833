use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{AppConfig, StorageKind};
use crate::health::{HealthStore, PgHealthStore};
use crate::images::{ImageStore, PgImageStore};
use crate::notify::{DisabledNotifier, Notifier, SnsNotifier};
use crate::products::{PgProductStore, ProductStore};
use crate::storage::{FsStore, ObjectStore, S3Store};
use crate::users::{AccountStore, PgAccountStore};
use crate::verification::{PgTokenStore, TokenStore};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub accounts: Arc<dyn AccountStore>,
    pub products: Arc<dyn ProductStore>,
    pub images: Arc<dyn ImageStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub health: Arc<dyn HealthStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        // Exactly one backend is active; the choice is made here, once.
        let objects: Arc<dyn ObjectStore> = match config.storage {
            StorageKind::Local => Arc::new(FsStore::new(&config.upload_dir)),
            StorageKind::S3 => Arc::new(S3Store::new(&config.s3).await?),
        };

        let notifier: Arc<dyn Notifier> = match &config.sns_topic_arn {
            Some(arn) => Arc::new(SnsNotifier::new(&config.s3.region, arn).await),
            None => Arc::new(DisabledNotifier),
        };

        Ok(Self {
            accounts: Arc::new(PgAccountStore::new(db.clone())),
            products: Arc::new(PgProductStore::new(db.clone())),
            images: Arc::new(PgImageStore::new(db.clone())),
            tokens: Arc::new(PgTokenStore::new(db.clone())),
            health: Arc::new(PgHealthStore::new(db.clone())),
            db,
            config,
            objects,
            notifier,
        })
    }

    /// Assembly seam for tests: every collaborator injected by reference.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        accounts: Arc<dyn AccountStore>,
        products: Arc<dyn ProductStore>,
        images: Arc<dyn ImageStore>,
        tokens: Arc<dyn TokenStore>,
        health: Arc<dyn HealthStore>,
        objects: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            db,
            config,
            accounts,
            products,
            images,
            tokens,
            health,
            objects,
            notifier,
        }
    }
}
