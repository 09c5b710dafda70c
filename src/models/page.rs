//! DRF-style pagination envelope.

use serde::{Deserialize, Serialize};

/// List endpoints return `{count, next, previous, results}`; `next` and
/// `previous` are absolute URLs that can be fed back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}
