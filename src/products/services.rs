use std::ops::RangeInclusive;

use tracing::{info, warn};
use uuid::Uuid;

use crate::access::ensure_owner;
use crate::error::ApiError;
use crate::products::dto::{PatchProductRequest, ProductRequest};
use crate::products::repo_types::Product;
use crate::state::AppState;
use crate::users::repo_types::Account;

const QUANTITY_RANGE: RangeInclusive<i32> = 0..=100;

fn check_quantity(quantity: i32) -> Result<(), ApiError> {
    if QUANTITY_RANGE.contains(&quantity) {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "quantity must be between 0 and 100".into(),
        ))
    }
}

fn check_fields(req: &ProductRequest) -> Result<(), ApiError> {
    if req.name.trim().is_empty()
        || req.sku.trim().is_empty()
        || req.manufacturer.trim().is_empty()
    {
        return Err(ApiError::Validation(
            "name, sku and manufacturer must not be empty".into(),
        ));
    }
    check_quantity(req.quantity)
}

/// Every check resolves before any write, so a rejection never leaves a
/// partial mutation behind. The unique index on sku backstops the
/// pre-check under concurrency.
pub async fn create(
    state: &AppState,
    who: &Account,
    req: ProductRequest,
) -> Result<Product, ApiError> {
    check_fields(&req)?;
    if state.products.sku_exists(&req.sku).await? {
        warn!(sku = %req.sku, "product create rejected: duplicate sku");
        return Err(ApiError::Conflict("sku already exists".into()));
    }

    let product = Product::new(req, who.id);
    state.products.insert(&product).await?;
    info!(product_id = %product.id, sku = %product.sku, owner = %who.id, "product created");
    Ok(product)
}

/// Public read.
pub async fn get(state: &AppState, id: Uuid) -> Result<Product, ApiError> {
    state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))
}

/// Full replacement (PUT). Existence answers before ownership.
pub async fn replace(
    state: &AppState,
    who: &Account,
    id: Uuid,
    req: ProductRequest,
) -> Result<(), ApiError> {
    let mut product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;
    ensure_owner(product.owner_id, who)?;
    check_fields(&req)?;

    if req.sku != product.sku && state.products.sku_exists(&req.sku).await? {
        warn!(product_id = %id, sku = %req.sku, "product update rejected: duplicate sku");
        return Err(ApiError::Conflict("sku already exists".into()));
    }

    product.name = req.name;
    product.description = req.description;
    product.sku = req.sku;
    product.manufacturer = req.manufacturer;
    product.quantity = req.quantity;
    product.touch();

    state.products.update(&product).await?;
    info!(product_id = %product.id, "product replaced");
    Ok(())
}

/// Partial update (PATCH): only supplied fields are validated and applied.
pub async fn patch(
    state: &AppState,
    who: &Account,
    id: Uuid,
    req: PatchProductRequest,
) -> Result<(), ApiError> {
    let mut product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;
    ensure_owner(product.owner_id, who)?;

    if let Some(quantity) = req.quantity {
        check_quantity(quantity)?;
    }
    if let Some(sku) = &req.sku {
        if sku != &product.sku && state.products.sku_exists(sku).await? {
            warn!(product_id = %id, sku = %sku, "product patch rejected: duplicate sku");
            return Err(ApiError::Conflict("sku already exists".into()));
        }
    }

    if let Some(name) = req.name {
        product.name = name;
    }
    if let Some(description) = req.description {
        product.description = description;
    }
    if let Some(sku) = req.sku {
        product.sku = sku;
    }
    if let Some(manufacturer) = req.manufacturer {
        product.manufacturer = manufacturer;
    }
    if let Some(quantity) = req.quantity {
        product.quantity = quantity;
    }
    product.touch();

    state.products.update(&product).await?;
    info!(product_id = %product.id, "product patched");
    Ok(())
}

pub async fn delete(state: &AppState, who: &Account, id: Uuid) -> Result<(), ApiError> {
    let product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("product not found".into()))?;
    ensure_owner(product.owner_id, who)?;

    state.products.delete(product.id).await?;
    info!(product_id = %product.id, "product deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_bounds_are_inclusive() {
        assert!(check_quantity(0).is_ok());
        assert!(check_quantity(100).is_ok());
        assert!(check_quantity(-1).is_err());
        assert!(check_quantity(101).is_err());
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let req = ProductRequest {
            name: "  ".into(),
            description: String::new(),
            sku: "S1".into(),
            manufacturer: "Acme".into(),
            quantity: 1,
        };
        assert!(check_fields(&req).is_err());
    }
}
