use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::{placement_key, ObjectStore, Partition};

/// Filesystem-rooted backend. Partition directories are created on
/// demand; writes use create-new semantics so an existing object is
/// never overwritten.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Keys are relative and may not step outside the root.
    fn resolve(&self, key: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(key);
        let clean = !key.is_empty()
            && relative.is_relative()
            && relative
                .components()
                .all(|c| matches!(c, std::path::Component::Normal(_)));
        anyhow::ensure!(clean, "invalid storage path: {key}");
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn store(
        &self,
        partition: &Partition,
        display_name: &str,
        body: Bytes,
    ) -> anyhow::Result<String> {
        let key = placement_key(partition, display_name);
        let full = self.resolve(&key)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create partition directory {}", parent.display()))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .await
            .with_context(|| format!("create {}", full.display()))?;
        file.write_all(&body)
            .await
            .with_context(|| format!("write {}", full.display()))?;
        file.flush().await?;

        info!(path = %key, size = body.len(), "object stored on filesystem");
        Ok(key)
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => {
                info!(path = %path, "object deleted from filesystem");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path, "object already absent");
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("delete {}", full.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn partition() -> Partition {
        Partition {
            owner_id: Uuid::new_v4(),
            resource_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn stores_under_the_partition_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let p = partition();

        let key = store
            .store(&p, "photo.png", Bytes::from_static(b"pixels"))
            .await
            .unwrap();
        assert!(key.starts_with(&p.prefix()));
        assert_eq!(tokio::fs::read(dir.path().join(&key)).await.unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn identical_display_names_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let p = partition();

        let a = store
            .store(&p, "photo.png", Bytes::from_static(b"a"))
            .await
            .unwrap();
        let b = store
            .store(&p, "photo.png", Bytes::from_static(b"b"))
            .await
            .unwrap();
        assert_ne!(a, b);

        // Each is independently deletable.
        store.delete(&a).await.unwrap();
        assert!(!dir.path().join(&a).exists());
        assert!(dir.path().join(&b).exists());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let p = partition();

        let key = store
            .store(&p, "photo.jpg", Bytes::from_static(b"x"))
            .await
            .unwrap();
        store.delete(&key).await.unwrap();
        store.delete(&key).await.unwrap();
        store.delete("owner_x/resource_y/never-existed.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn traversal_outside_the_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        assert!(store.delete("../evil").await.is_err());
        assert!(store.delete("owner_1/../../evil").await.is_err());
        assert!(store.delete("/etc/passwd").await.is_err());
        assert!(store.delete("").await.is_err());
    }
}
