//! Product types for the catalog and for seller product management.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingMethod {
    Parcel,
    Delivery,
}

impl ShippingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingMethod::Parcel => "PARCEL",
            ShippingMethod::Delivery => "DELIVERY",
        }
    }
}

/// Catalog entry. `seller` is embedded on list and detail responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub info: String,
    /// Image URL
    #[serde(default)]
    pub image: String,
    pub price: u64,
    pub shipping_method: ShippingMethod,
    pub shipping_fee: u64,
    pub stock: u64,
    #[serde(default)]
    pub seller: Option<Seller>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Display name for the seller: store name when present, else the
    /// account name.
    pub fn seller_display(&self) -> &str {
        self.seller
            .as_ref()
            .and_then(|s| s.store_name.as_deref().or(s.name.as_deref()))
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seller {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub store_name: Option<String>,
}

/// An image to upload with a product, as raw bytes.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub filename: String,
    pub mime: String,
}

/// Payload for `POST /products/`. Lowered to a multipart form because of
/// the image.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub info: String,
    pub image: ImageUpload,
    pub price: u64,
    pub shipping_method: ShippingMethod,
    pub shipping_fee: u64,
    pub stock: u64,
}

/// Payload for `PUT /products/{id}/`; only supplied fields are sent.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub info: Option<String>,
    pub image: Option<ImageUpload>,
    pub price: Option<u64>,
    pub shipping_method: Option<ShippingMethod>,
    pub shipping_fee: Option<u64>,
    pub stock: Option<u64>,
}
