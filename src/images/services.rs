use bytes::Bytes;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::access::ensure_owner;
use crate::error::ApiError;
use crate::images::repo_types::Image;
use crate::state::AppState;
use crate::storage::Partition;
use crate::users::repo_types::Account;

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Case-insensitive extension allowlist. The dot must not be the first
/// character, so dotfiles without a real extension are rejected.
pub(crate) fn allowed_extension(file_name: &str) -> bool {
    match file_name.rfind('.') {
        Some(i) if i > 0 => {
            ALLOWED_EXTENSIONS.contains(&file_name[i + 1..].to_ascii_lowercase().as_str())
        }
        _ => false,
    }
}

/// Upload ordering is store-first, insert-second: a storage failure
/// leaves no DB record, and an insert failure triggers a best-effort
/// delete of the already-stored object.
pub async fn upload(
    state: &AppState,
    who: &Account,
    product_id: Uuid,
    file_name: &str,
    data: Bytes,
) -> Result<Image, ApiError> {
    let product = state
        .products
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;
    ensure_owner(product.owner_id, who)?;

    if data.is_empty() {
        return Err(ApiError::Validation("uploaded file is empty".into()));
    }
    if !allowed_extension(file_name) {
        warn!(file_name = %file_name, "upload rejected: extension not allowed");
        return Err(ApiError::Validation(
            "only jpg, jpeg and png files are accepted".into(),
        ));
    }

    let partition = Partition {
        owner_id: product.owner_id,
        resource_id: product.id,
    };
    let size = data.len();
    let path = state
        .objects
        .store(&partition, file_name, data)
        .await
        .map_err(|e| {
            error!(error = %e, product_id = %product.id, "object store failed during upload");
            ApiError::Internal(e)
        })?;

    let image = Image::new(product.id, file_name, &path);
    if let Err(e) = state.images.insert(&image).await {
        if let Err(del) = state.objects.delete(&path).await {
            error!(error = %del, path = %path, "orphaned object after failed image insert");
        }
        return Err(e.into());
    }

    info!(image_id = %image.id, product_id = %product.id, path = %path, size, "image uploaded");
    Ok(image)
}

/// Public listing; the product must exist.
pub async fn list(state: &AppState, product_id: Uuid) -> Result<Vec<Image>, ApiError> {
    if state.products.find_by_id(product_id).await?.is_none() {
        return Err(ApiError::NotFound("product not found".into()));
    }
    Ok(state.images.list_by_product(product_id).await?)
}

/// Public read; 404 when the image is not paired with that product.
pub async fn get(state: &AppState, product_id: Uuid, image_id: Uuid) -> Result<Image, ApiError> {
    if state.products.find_by_id(product_id).await?.is_none() {
        return Err(ApiError::NotFound("product not found".into()));
    }
    state
        .images
        .find_by_id_and_product(image_id, product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("image not found".into()))
}

/// Owner-only delete. A storage-delete failure is logged and the record
/// is removed anyway; an orphaned object is recoverable, a dangling
/// record pointing at nothing is not.
pub async fn delete(
    state: &AppState,
    who: &Account,
    product_id: Uuid,
    image_id: Uuid,
) -> Result<(), ApiError> {
    let product = state
        .products
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;
    ensure_owner(product.owner_id, who)?;

    let image = state
        .images
        .find_by_id_and_product(image_id, product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("image not found".into()))?;

    if let Err(e) = state.objects.delete(&image.storage_path).await {
        error!(error = %e, path = %image.storage_path, "storage delete failed; removing record anyway");
    }
    state.images.delete(image.id).await?;
    info!(image_id = %image.id, product_id = %product_id, "image deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist_is_case_insensitive() {
        assert!(allowed_extension("photo.png"));
        assert!(allowed_extension("photo.JPG"));
        assert!(allowed_extension("photo.JpEg"));
    }

    #[test]
    fn allowlist_rejects_everything_else() {
        assert!(!allowed_extension("photo.gif"));
        assert!(!allowed_extension("photo.png.exe"));
        assert!(!allowed_extension("photo"));
        assert!(!allowed_extension(".png"));
        assert!(!allowed_extension(""));
    }

    #[test]
    fn only_the_last_extension_counts() {
        assert!(allowed_extension("archive.tar.png"));
        assert!(!allowed_extension("photo.png.tar"));
    }
}
