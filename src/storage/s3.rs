use anyhow::Context;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use axum::async_trait;
use bytes::Bytes;
use tracing::info;

use super::{content_type_for, placement_key, ObjectStore, Partition};
use crate::config::S3Config;

/// Object-store backend. Keys mirror the filesystem partition scheme;
/// random segments make overwrites impossible in practice, so no
/// precondition headers are needed.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// A custom endpoint switches on path-style addressing and accepts
    /// static credentials (MinIO-style); otherwise the default AWS
    /// credential chain applies.
    pub async fn new(cfg: &S3Config) -> anyhow::Result<Self> {
        anyhow::ensure!(!cfg.bucket.is_empty(), "s3 bucket not configured");

        let mut loader =
            defaults(BehaviorVersion::latest()).region(Region::new(cfg.region.clone()));
        if let (Some(access_key), Some(secret_key)) = (&cfg.access_key, &cfg.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key, secret_key, None, None, "static",
            ));
        }
        let shared = loader.load().await;

        let conf = match &cfg.endpoint {
            Some(endpoint) => S3ConfigBuilder::from(&shared)
                .endpoint_url(endpoint)
                .force_path_style(true)
                .build(),
            None => S3ConfigBuilder::from(&shared).build(),
        };

        info!(bucket = %cfg.bucket, region = %cfg.region, "s3 object store initialized");
        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn store(
        &self,
        partition: &Partition,
        display_name: &str,
        body: Bytes,
    ) -> anyhow::Result<String> {
        let key = placement_key(partition, display_name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(content_type_for(&key))
            .send()
            .await
            .with_context(|| format!("s3 put_object {key}"))?;
        info!(path = %key, "object stored in s3");
        Ok(key)
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        // S3 DeleteObject succeeds on missing keys, matching the
        // idempotent contract.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .with_context(|| format!("s3 delete_object {path}"))?;
        info!(path = %path, "object deleted from s3");
        Ok(())
    }
}
