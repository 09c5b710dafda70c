use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{User, UserType};

/// Directory name under the platform cache dir
const APP_DIR: &str = "open-market";

/// Session file name in the cache directory
const SESSION_FILE: &str = "session.json";

/// Everything the client persists between runs: the token pair and the
/// profile returned at login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionData {
    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

/// Source of truth for session credentials.
///
/// `set_tokens` always overwrites the access token but only touches the
/// refresh token when a non-empty replacement is supplied; the refresh
/// endpoint does not rotate the refresh token on every exchange.
pub trait SessionStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn set_tokens(&self, access: &str, refresh: Option<&str>);
    fn user(&self) -> Option<User>;
    fn set_user(&self, user: &User);

    /// Remove tokens and the cached profile. Safe to call repeatedly.
    fn clear(&self);

    fn is_logged_in(&self) -> bool {
        self.access_token().map(|t| !t.is_empty()).unwrap_or(false)
    }

    fn is_buyer(&self) -> bool {
        self.user()
            .map(|u| u.user_type == UserType::Buyer)
            .unwrap_or(false)
    }
}

/// In-memory session store.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<SessionData>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn access_token(&self) -> Option<String> {
        self.inner.lock().unwrap().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.inner.lock().unwrap().refresh_token.clone()
    }

    fn set_tokens(&self, access: &str, refresh: Option<&str>) {
        let mut data = self.inner.lock().unwrap();
        data.access_token = Some(access.to_string());
        if let Some(refresh) = refresh.filter(|r| !r.is_empty()) {
            data.refresh_token = Some(refresh.to_string());
        }
        data.updated_at = Some(Utc::now());
    }

    fn user(&self) -> Option<User> {
        self.inner.lock().unwrap().user.clone()
    }

    fn set_user(&self, user: &User) {
        let mut data = self.inner.lock().unwrap();
        data.user = Some(user.clone());
        data.updated_at = Some(Utc::now());
    }

    fn clear(&self) {
        *self.inner.lock().unwrap() = SessionData::default();
    }
}

/// Session store persisted as JSON in the platform cache directory.
///
/// Reads are served from memory; every mutation is written through to disk.
/// A write failure is logged and the in-memory state stays authoritative for
/// the rest of the process.
pub struct FileSessionStore {
    path: PathBuf,
    inner: Mutex<SessionData>,
}

impl FileSessionStore {
    /// Open the store at the default location
    /// (`<cache dir>/open-market/session.json`).
    pub fn open_default() -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Self::open(cache_dir.join(APP_DIR).join(SESSION_FILE))
    }

    /// Open the store at an explicit path, loading any existing session.
    pub fn open(path: PathBuf) -> Result<Self> {
        let data = Self::load(&path)?;
        Ok(Self {
            path,
            inner: Mutex::new(data),
        })
    }

    fn load(path: &Path) -> Result<SessionData> {
        if !path.exists() {
            return Ok(SessionData::default());
        }
        let contents = std::fs::read_to_string(path).context("Failed to read session file")?;
        serde_json::from_str(&contents).context("Failed to parse session file")
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        if data.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove session file")?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn mutate(&self, f: impl FnOnce(&mut SessionData)) {
        let mut data = self.inner.lock().unwrap();
        f(&mut data);
        if let Err(e) = self.save(&data) {
            warn!(path = %self.path.display(), error = %e, "failed to persist session");
        }
    }
}

impl SessionStore for FileSessionStore {
    fn access_token(&self) -> Option<String> {
        self.inner.lock().unwrap().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.inner.lock().unwrap().refresh_token.clone()
    }

    fn set_tokens(&self, access: &str, refresh: Option<&str>) {
        self.mutate(|data| {
            data.access_token = Some(access.to_string());
            if let Some(refresh) = refresh.filter(|r| !r.is_empty()) {
                data.refresh_token = Some(refresh.to_string());
            }
            data.updated_at = Some(Utc::now());
        });
    }

    fn user(&self) -> Option<User> {
        self.inner.lock().unwrap().user.clone()
    }

    fn set_user(&self, user: &User) {
        self.mutate(|data| {
            data.user = Some(user.clone());
            data.updated_at = Some(Utc::now());
        });
    }

    fn clear(&self) {
        self.mutate(|data| *data = SessionData::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buyer() -> User {
        User {
            username: "buyer1".into(),
            name: "Kim".into(),
            phone_number: "01012345678".into(),
            user_type: UserType::Buyer,
            store_name: None,
            company_registration_number: None,
        }
    }

    #[test]
    fn tokens_round_trip() {
        let store = MemorySessionStore::new();
        assert!(!store.is_logged_in());

        store.set_tokens("A1", Some("R1"));
        assert_eq!(store.access_token().as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
        assert!(store.is_logged_in());
    }

    #[test]
    fn refresh_token_survives_rotation_without_replacement() {
        let store = MemorySessionStore::new();
        store.set_tokens("A1", Some("R1"));

        // refresh responses may omit the refresh token
        store.set_tokens("A2", None);
        assert_eq!(store.access_token().as_deref(), Some("A2"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));

        // an empty string must not wipe the stored refresh token either
        store.set_tokens("A3", Some(""));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
    }

    #[test]
    fn clear_is_idempotent() {
        let store = MemorySessionStore::new();
        store.set_tokens("A1", Some("R1"));
        store.set_user(&buyer());

        store.clear();
        store.clear();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert!(store.user().is_none());
        assert!(!store.is_logged_in());
    }

    #[test]
    fn buyer_check_uses_cached_profile() {
        let store = MemorySessionStore::new();
        assert!(!store.is_buyer());

        store.set_user(&buyer());
        assert!(store.is_buyer());

        let mut seller = buyer();
        seller.user_type = UserType::Seller;
        store.set_user(&seller);
        assert!(!store.is_buyer());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        {
            let store = FileSessionStore::open(path.clone()).unwrap();
            store.set_tokens("A1", Some("R1"));
            store.set_user(&buyer());
        }

        let store = FileSessionStore::open(path.clone()).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("A1"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
        assert_eq!(store.user().unwrap().username, "buyer1");

        store.clear();
        assert!(!path.exists());

        let store = FileSessionStore::open(path).unwrap();
        assert!(!store.is_logged_in());
    }
}
