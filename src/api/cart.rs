//! Cart endpoints. All of them require a logged-in buyer, so every call
//! goes through the authenticated path with token refresh.

use serde_json::json;

use crate::models::{CartItem, Page};

use super::client::ApiClient;
use super::error::ApiError;
use super::request::Request;

impl ApiClient {
    /// Fetch a page of the cart.
    pub async fn fetch_cart(&self, page: Option<u32>) -> Result<Page<CartItem>, ApiError> {
        let mut pairs = Vec::new();
        if let Some(page) = page {
            pairs.push(("page", page.to_string()));
        }
        let url = self.endpoint_url(&["cart"], &pairs)?;
        self.auth_request_json(&Request::get(url)).await
    }

    /// Follow a cart page's absolute `next`/`previous` URL.
    pub async fn fetch_cart_page(&self, url: &str) -> Result<Page<CartItem>, ApiError> {
        self.auth_request_json(&Request::get(url)).await
    }

    /// Add a product to the cart. Adding a product already in the cart
    /// increases its quantity server-side.
    pub async fn add_to_cart(&self, product_id: u64, quantity: u32) -> Result<(), ApiError> {
        let url = self.endpoint_url(&["cart"], &[])?;
        let req = Request::post(url).json(json!({
            "product_id": product_id,
            "quantity": quantity,
        }));
        self.auth_request(&req).await?;
        Ok(())
    }

    /// Fetch one cart item.
    pub async fn fetch_cart_item(&self, cart_item_id: u64) -> Result<CartItem, ApiError> {
        let url = self.endpoint_url(&["cart", &cart_item_id.to_string()], &[])?;
        self.auth_request_json(&Request::get(url)).await
    }

    /// Set a cart item's quantity.
    pub async fn update_cart_quantity(
        &self,
        cart_item_id: u64,
        quantity: u32,
    ) -> Result<CartItem, ApiError> {
        let url = self.endpoint_url(&["cart", &cart_item_id.to_string()], &[])?;
        let req = Request::put(url).json(json!({ "quantity": quantity }));
        self.auth_request_json(&req).await
    }

    /// Remove one item from the cart.
    pub async fn remove_cart_item(&self, cart_item_id: u64) -> Result<(), ApiError> {
        let url = self.endpoint_url(&["cart", &cart_item_id.to_string()], &[])?;
        self.auth_request(&Request::delete(url)).await?;
        Ok(())
    }

    /// Empty the cart.
    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        let url = self.endpoint_url(&["cart"], &[])?;
        self.auth_request(&Request::delete(url)).await?;
        Ok(())
    }
}
