//! Data models for open-market entities.
//!
//! This module contains all the data structures used on the wire:
//!
//! - `User`, `UserType`, `SignupRequest`: account types
//! - `LoginResponse`, `RefreshResponse`: token endpoints
//! - `Product`, `NewProduct`, `ProductPatch`: catalog and seller management
//! - `CartItem`, `CartTotals`: cart contents and price math
//! - `Page<T>`: the DRF pagination envelope list endpoints return

pub mod account;
pub mod cart;
pub mod page;
pub mod product;

pub use account::{LoginResponse, RefreshResponse, SignupRequest, User, UserType};
pub use cart::{CartItem, CartTotals};
pub use page::Page;
pub use product::{ImageUpload, NewProduct, Product, ProductPatch, Seller, ShippingMethod};
