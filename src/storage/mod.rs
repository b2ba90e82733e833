use axum::async_trait;
use bytes::Bytes;
use uuid::Uuid;

pub mod fs;
pub mod s3;

pub use fs::FsStore;
pub use s3::S3Store;

/// The (owner, resource) pair that namespaces every stored object, so a
/// whole account or product can be cleaned up by prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub owner_id: Uuid,
    pub resource_id: Uuid,
}

impl Partition {
    pub fn prefix(&self) -> String {
        format!("owner_{}/resource_{}", self.owner_id, self.resource_id)
    }
}

/// Backend-agnostic object placement. Callers validate display names
/// before storing; backends assume valid input.
///
/// `store` must never overwrite an existing object; `delete` is
/// idempotent, so a missing object is not an error.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn store(
        &self,
        partition: &Partition,
        display_name: &str,
        body: Bytes,
    ) -> anyhow::Result<String>;
    async fn delete(&self, path: &str) -> anyhow::Result<()>;
}

/// `owner_{id}/resource_{id}/{uuidv4}{ext}`. The 128-bit random segment
/// carries all the collision resistance; the display name only
/// contributes its extension.
pub fn placement_key(partition: &Partition, display_name: &str) -> String {
    format!(
        "{}/{}{}",
        partition.prefix(),
        Uuid::new_v4(),
        extension_suffix(display_name)
    )
}

/// Last-dot suffix including the dot, or empty. A leading dot is not an
/// extension.
fn extension_suffix(display_name: &str) -> &str {
    match display_name.rfind('.') {
        Some(i) if i > 0 => &display_name[i..],
        _ => "",
    }
}

/// Content type from the key suffix, for backends that record one.
pub fn content_type_for(path: &str) -> &'static str {
    match extension_suffix(path).to_ascii_lowercase().as_str() {
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition() -> Partition {
        Partition {
            owner_id: Uuid::new_v4(),
            resource_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn keys_are_partitioned_and_keep_the_extension() {
        let p = partition();
        let key = placement_key(&p, "photo.png");
        assert!(key.starts_with(&format!(
            "owner_{}/resource_{}/",
            p.owner_id, p.resource_id
        )));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn identical_display_names_yield_distinct_keys() {
        let p = partition();
        let a = placement_key(&p, "photo.png");
        let b = placement_key(&p, "photo.png");
        assert_ne!(a, b);
    }

    #[test]
    fn extension_suffix_edge_cases() {
        assert_eq!(extension_suffix("a.PNG"), ".PNG");
        assert_eq!(extension_suffix("archive.tar.gz"), ".gz");
        assert_eq!(extension_suffix("noext"), "");
        assert_eq!(extension_suffix(".dotfile"), "");
        assert_eq!(extension_suffix(""), "");
    }

    #[test]
    fn content_types_follow_the_suffix() {
        assert_eq!(content_type_for("a/b/c.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a/b/c.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("a/b/c.png"), "image/png");
        assert_eq!(content_type_for("a/b/c"), "application/octet-stream");
    }
}
