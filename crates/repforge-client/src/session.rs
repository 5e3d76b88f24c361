// ABOUTME: Local key-value session storage for the auth token, user id, and onboarding flag
// ABOUTME: Provides in-memory and JSON-file stores behind one trait plus a typed Session wrapper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Session Storage
//!
//! The session is three string keys in a flat key-value store. There is no
//! expiry or versioning; the server rejects stale tokens and the app signs
//! out in response.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "token";
/// Key holding the signed-in user id
pub const USER_ID_KEY: &str = "userId";
/// Key holding `"true"` once onboarding is finished
pub const ONBOARDING_KEY: &str = "is_onboarding_complete";

/// Flat string key-value storage
pub trait SessionStore: Send + Sync {
    /// Read a key
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read
    fn get(&self, key: &str) -> ClientResult<Option<String>>;

    /// Write a key
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;

    /// Delete a key
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written
    fn remove(&self, key: &str) -> ClientResult<()>;

    /// Delete every key
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written
    fn clear(&self) -> ClientResult<()>;
}

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: DashMap<String, String>,
}

impl MemorySessionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        self.entries.clear();
        Ok(())
    }
}

/// JSON file store that survives restarts
///
/// Every write rewrites the whole file; the session is three short keys.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Open or create the store at an explicit path
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(ClientError::session)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened session store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Open the store in the platform data directory
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no data directory or the file is unreadable
    pub fn open_default() -> ClientResult<Self> {
        let path = Self::default_path()
            .ok_or_else(|| ClientError::Session("No platform data directory".to_owned()))?;
        Self::open(path)
    }

    /// `<data dir>/repforge/session.json`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("repforge").join("session.json"))
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> ClientResult<()> {
        let mut entries = self.entries.lock().map_err(ClientError::session)?;
        change(&mut entries);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(ClientError::session)?;
        }
        let raw = serde_json::to_string_pretty(&*entries)?;
        fs::write(&self.path, raw).map_err(ClientError::session)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let entries = self.entries.lock().map_err(ClientError::session)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> ClientResult<()> {
        self.update(BTreeMap::clear)
    }
}

/// Typed view over a [`SessionStore`]
///
/// Cloning shares the same store, so every clone observes writes in the order
/// they were made.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap a store
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Session backed by memory only
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Stored bearer token
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read
    pub fn token(&self) -> ClientResult<Option<String>> {
        self.store.get(TOKEN_KEY)
    }

    /// Stored user id
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or holds a non-numeric id
    pub fn user_id(&self) -> ClientResult<Option<i64>> {
        self.store
            .get(USER_ID_KEY)?
            .map(|raw| {
                raw.parse()
                    .map_err(|e| ClientError::Session(format!("Invalid stored user id: {e}")))
            })
            .transpose()
    }

    /// Stored user id, or [`ClientError::NotAuthenticated`]
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in
    pub fn require_user_id(&self) -> ClientResult<i64> {
        self.user_id()?.ok_or(ClientError::NotAuthenticated)
    }

    /// Whether a token is stored
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read
    pub fn is_signed_in(&self) -> ClientResult<bool> {
        Ok(self.token()?.is_some())
    }

    /// Whether onboarding has been finished
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read
    pub fn is_onboarding_complete(&self) -> ClientResult<bool> {
        Ok(self.store.get(ONBOARDING_KEY)?.as_deref() == Some("true"))
    }

    /// Store a fresh token and user id
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written
    pub fn sign_in(&self, token: &str, user_id: i64) -> ClientResult<()> {
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_ID_KEY, &user_id.to_string())
    }

    /// Record that onboarding is finished
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written
    pub fn complete_onboarding(&self) -> ClientResult<()> {
        self.store.set(ONBOARDING_KEY, "true")
    }

    /// Forget everything
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written
    pub fn sign_out(&self) -> ClientResult<()> {
        self.store.clear()
    }
}
