//! Client library for the Weniv open-market REST API.
//!
//! The API uses JWT bearer token authentication: a short-lived access token
//! authorizes requests, and a longer-lived refresh token is exchanged for a
//! new access token when the server rejects one as expired. `ApiClient`
//! handles that exchange transparently and retries the failed request once.
//!
//! Session state (tokens plus the cached user profile) lives behind the
//! [`SessionStore`] trait so embedders can choose between the in-memory store
//! and the JSON-file store, or supply their own.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{FileSessionStore, MemorySessionStore, SessionStore};
pub use config::Config;
