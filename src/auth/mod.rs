//! Session state for the open-market API.
//!
//! This module provides:
//! - `SessionStore`: the trait the request client reads tokens through
//! - `MemorySessionStore`: process-local store for tests and embedding
//! - `FileSessionStore`: JSON-file store persisted across runs
//!
//! The API issues no expiry timestamp for the access token, so "logged in"
//! means only that an access token is present; expiry is discovered when a
//! request comes back 401.

pub mod session;

pub use session::{FileSessionStore, MemorySessionStore, SessionData, SessionStore};
