use serde::Deserialize;

/// Writable product shape, used by create (POST) and full replacement
/// (PUT). Owner and timestamps are server-assigned and have no field here.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub sku: String,
    pub manufacturer: String,
    pub quantity: i32,
}

/// Partial update (PATCH): absent fields leave the stored value untouched.
#[derive(Debug, Deserialize)]
pub struct PatchProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub manufacturer: Option<String>,
    pub quantity: Option<i32>,
}
