//! Product catalog and seller product management endpoints.
//!
//! Catalog reads are public. Create/update/delete are seller operations and
//! go through the authenticated path with token refresh; create and update
//! are multipart because they carry the product image.

use serde::de::DeserializeOwned;

use crate::models::{NewProduct, Page, Product, ProductPatch};

use super::client::ApiClient;
use super::error::ApiError;
use super::request::{FormField, Request};

/// Query options for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
}

impl ProductQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

impl ApiClient {
    /// Fetch a page of the product catalog, optionally filtered by search
    /// term.
    pub async fn fetch_products(&self, query: &ProductQuery) -> Result<Page<Product>, ApiError> {
        let url = self.endpoint_url(&["products"], &query.pairs())?;
        self.request_json(&Request::get(url)).await
    }

    /// Fetch one product by id.
    pub async fn fetch_product(&self, product_id: u64) -> Result<Product, ApiError> {
        let url = self.endpoint_url(&["products", &product_id.to_string()], &[])?;
        self.request_json(&Request::get(url)).await
    }

    /// Fetch the products of a single seller, by seller name.
    pub async fn fetch_seller_products(
        &self,
        seller: &str,
        query: &ProductQuery,
    ) -> Result<Page<Product>, ApiError> {
        let url = self.endpoint_url(&[seller, "products"], &query.pairs())?;
        self.request_json(&Request::get(url)).await
    }

    /// Follow a pagination envelope's absolute `next`/`previous` URL.
    pub async fn fetch_page<T: DeserializeOwned>(&self, url: &str) -> Result<Page<T>, ApiError> {
        self.request_json(&Request::get(url)).await
    }

    /// Register a new product. Seller accounts only.
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let url = self.endpoint_url(&["products"], &[])?;
        let req = Request::post(url).form(new_product_fields(product));
        self.auth_request_json(&req).await
    }

    /// Update a product, sending only the supplied fields.
    pub async fn update_product(
        &self,
        product_id: u64,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        let url = self.endpoint_url(&["products", &product_id.to_string()], &[])?;
        let req = Request::put(url).form(patch_fields(patch));
        self.auth_request_json(&req).await
    }

    /// Delete a product.
    pub async fn delete_product(&self, product_id: u64) -> Result<(), ApiError> {
        let url = self.endpoint_url(&["products", &product_id.to_string()], &[])?;
        self.auth_request(&Request::delete(url)).await?;
        Ok(())
    }
}

fn new_product_fields(product: &NewProduct) -> Vec<FormField> {
    vec![
        FormField::text("name", &product.name),
        FormField::text("info", &product.info),
        FormField::file(
            "image",
            product.image.data.clone(),
            &product.image.filename,
            &product.image.mime,
        ),
        FormField::text("price", product.price.to_string()),
        FormField::text("shipping_method", product.shipping_method.as_str()),
        FormField::text("shipping_fee", product.shipping_fee.to_string()),
        FormField::text("stock", product.stock.to_string()),
    ]
}

fn patch_fields(patch: &ProductPatch) -> Vec<FormField> {
    let mut fields = Vec::new();
    if let Some(name) = &patch.name {
        fields.push(FormField::text("name", name));
    }
    if let Some(info) = &patch.info {
        fields.push(FormField::text("info", info));
    }
    if let Some(image) = &patch.image {
        fields.push(FormField::file(
            "image",
            image.data.clone(),
            &image.filename,
            &image.mime,
        ));
    }
    if let Some(price) = patch.price {
        fields.push(FormField::text("price", price.to_string()));
    }
    if let Some(method) = patch.shipping_method {
        fields.push(FormField::text("shipping_method", method.as_str()));
    }
    if let Some(fee) = patch.shipping_fee {
        fields.push(FormField::text("shipping_fee", fee.to_string()));
    }
    if let Some(stock) = patch.stock {
        fields.push(FormField::text("stock", stock.to_string()));
    }
    fields
}
