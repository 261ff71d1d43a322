// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory collaborator fakes.
//!
//! Real deployments plug in a persistence-backed user store and a
//! password-hashing library; these fakes let this crate's tests (and
//! downstream integration tests) exercise the full authenticate → verify
//! loop without external services.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::credentials::{SecretVerifier, UserLookup};
use crate::error::{LookupError, SecretStoreError};
use crate::keyring::{SecretStore, SigningKey};
use crate::principal::UserRecord;

/// In-memory user store with a lookup counter and an unavailability
/// switch for simulating outages.
///
/// Clones share state, so a test can keep a handle after moving the store
/// into the core.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    users: RwLock<HashMap<String, UserRecord>>,
    lookups: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record under a login identifier.
    pub fn insert(&self, identifier: impl Into<String>, record: UserRecord) {
        self.inner
            .users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(identifier.into(), record);
    }

    /// How many lookups have hit the store.
    pub fn lookup_count(&self) -> usize {
        self.inner.lookups.load(Ordering::Relaxed)
    }

    /// Make subsequent lookups fail as an upstream outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::Relaxed);
    }
}

impl UserLookup for MemoryUserStore {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<UserRecord>, LookupError> {
        self.inner.lookups.fetch_add(1, Ordering::Relaxed);
        if self.inner.unavailable.load(Ordering::Relaxed) {
            return Err(LookupError::new("user store unavailable"));
        }
        let users = self.inner.users.read().unwrap_or_else(|e| e.into_inner());
        Ok(users.get(identifier).cloned())
    }
}

/// Secret verifier that compares the supplied secret byte-for-byte with
/// the stored bytes. Test-only stand-in for a real hashing library.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSecretVerifier;

impl SecretVerifier for PlainTextSecretVerifier {
    fn check(&self, stored_hash: &[u8], supplied_secret: &str) -> bool {
        stored_hash == supplied_secret.as_bytes()
    }
}

/// Secret store serving a fixed key list.
pub struct StaticSecretStore {
    keys: Vec<SigningKey>,
    fail: bool,
}

impl StaticSecretStore {
    /// Serve the given keys; the last one becomes the signing default.
    pub fn new(keys: Vec<SigningKey>) -> Self {
        Self { keys, fail: false }
    }

    /// A store that fails every load, for outage tests.
    pub fn failing() -> Self {
        Self {
            keys: Vec::new(),
            fail: true,
        }
    }
}

impl SecretStore for StaticSecretStore {
    fn load_keys(&self) -> Result<Vec<SigningKey>, SecretStoreError> {
        if self.fail {
            return Err(SecretStoreError::new("secret store unavailable"));
        }
        Ok(self.keys.clone())
    }
}
