//! REST API client module for the open-market service.
//!
//! This module provides the `ApiClient` for communicating with the
//! open-market API: account endpoints, the product catalog, seller
//! product management, and the cart.
//!
//! The API uses JWT bearer token authentication; expired access tokens
//! are renewed through the token-refresh endpoint and the failed request
//! is retried once.

pub mod cart;
pub mod client;
pub mod error;
pub mod products;
pub mod request;

pub use client::ApiClient;
pub use error::ApiError;
pub use products::ProductQuery;
pub use request::{Body, FormField, FormValue, Request, ResponseBody};
