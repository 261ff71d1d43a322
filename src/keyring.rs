// SPDX-License-Identifier: AGPL-3.0-or-later

//! Signing key material and rotation.
//!
//! Key material is process-wide, read-mostly state. Readers take an
//! immutable snapshot behind an `Arc`; rotation builds a new snapshot and
//! swaps the pointer, so a concurrent verification never observes a
//! partially-updated key set.
//!
//! ## Rotation
//!
//! [`Keyring::add_key`] appends a key and makes it the signing default
//! without invalidating tokens signed by earlier keys; those stay
//! verifiable through the `kid` embedded in their header until the key is
//! explicitly retired. Confirming that all tokens signed by a key have
//! expired before retiring it is the caller's responsibility.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use crate::error::{KeyError, SecretStoreError};

/// Minimum HS256 secret length in bytes (256 bits).
pub const MIN_HS256_SECRET_LEN: usize = 32;

/// Supplies signing key material at startup and on rotation.
///
/// External collaborator; the core never reads secrets from literals or
/// the environment itself.
pub trait SecretStore {
    /// Load the active key set. The last key in the list becomes the
    /// signing default.
    fn load_keys(&self) -> Result<Vec<SigningKey>, SecretStoreError>;
}

/// Key id, secret bytes, and algorithm tag.
///
/// Construction validates that the secret meets the algorithm's minimum
/// entropy requirement; a short secret fails rather than silently
/// proceeding.
#[derive(Clone)]
pub struct SigningKey {
    kid: String,
    secret: Vec<u8>,
    algorithm: Algorithm,
}

impl SigningKey {
    /// Create a key, validating id, algorithm, and secret length.
    ///
    /// Only the HMAC family is supported; the minimum secret length is the
    /// hash output size (32/48/64 bytes for HS256/HS384/HS512).
    pub fn new(
        kid: impl Into<String>,
        secret: impl Into<Vec<u8>>,
        algorithm: Algorithm,
    ) -> Result<Self, KeyError> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            return Err(KeyError::EmptyKeyId);
        }

        let minimum = match algorithm {
            Algorithm::HS256 => MIN_HS256_SECRET_LEN,
            Algorithm::HS384 => 48,
            Algorithm::HS512 => 64,
            other => return Err(KeyError::UnsupportedAlgorithm(format!("{other:?}"))),
        };

        let secret = secret.into();
        if secret.len() < minimum {
            return Err(KeyError::WeakKey {
                actual: secret.len(),
                minimum,
            });
        }

        Ok(Self {
            kid,
            secret,
            algorithm,
        })
    }

    /// HS256 key, the default algorithm for this core.
    pub fn hs256(kid: impl Into<String>, secret: impl Into<Vec<u8>>) -> Result<Self, KeyError> {
        Self::new(kid, secret, Algorithm::HS256)
    }

    /// Key id carried in token headers.
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Algorithm tag.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    pub(crate) fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }
}

// Secret bytes stay out of logs.
impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Immutable view of the active key set.
struct KeyringSnapshot {
    keys: HashMap<String, Arc<SigningKey>>,
    signing_kid: String,
}

/// The active signing key set.
///
/// Shared read-mostly state: verifications read a snapshot, rotation swaps
/// in a new one.
pub struct Keyring {
    inner: RwLock<Arc<KeyringSnapshot>>,
}

impl Keyring {
    /// Create a keyring with a single key, which is the signing default.
    pub fn new(initial: SigningKey) -> Self {
        let kid = initial.kid.clone();
        let mut keys = HashMap::new();
        keys.insert(kid.clone(), Arc::new(initial));
        Self {
            inner: RwLock::new(Arc::new(KeyringSnapshot {
                keys,
                signing_kid: kid,
            })),
        }
    }

    /// Load the key set from the external secret store.
    ///
    /// Fails fast on an empty set: a deployment without key material
    /// cannot issue or verify anything.
    pub fn from_secret_store(store: &dyn SecretStore) -> Result<Self, KeyError> {
        let loaded = store.load_keys()?;
        if loaded.is_empty() {
            return Err(KeyError::EmptyKeySet);
        }
        // Earlier keys remain verify-only; the last loaded key signs.
        let signing_kid = loaded[loaded.len() - 1].kid.clone();
        let mut keys = HashMap::new();
        for key in loaded {
            keys.insert(key.kid.clone(), Arc::new(key));
        }
        Ok(Self {
            inner: RwLock::new(Arc::new(KeyringSnapshot { keys, signing_kid })),
        })
    }

    /// Add a key and make it the signing default.
    ///
    /// Prior keys stay in the active set, so tokens they signed remain
    /// verifiable until their own expiry.
    pub fn add_key(&self, key: SigningKey) {
        let kid = key.kid.clone();
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let mut keys = guard.keys.clone();
        keys.insert(kid.clone(), Arc::new(key));
        let next = Arc::new(KeyringSnapshot {
            keys,
            signing_kid: kid.clone(),
        });
        *guard = next;
        drop(guard);
        tracing::info!(%kid, "signing key rotated");
    }

    /// Remove a key from the active set.
    ///
    /// Refuses to retire the current signing key. Tokens signed by the
    /// retired key are rejected as `UnknownKey` from this point on, so the
    /// caller must confirm they have all expired first.
    pub fn retire_key(&self, kid: &str) -> Result<(), KeyError> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if guard.signing_kid == kid {
            return Err(KeyError::RetireActive(kid.to_string()));
        }
        if !guard.keys.contains_key(kid) {
            return Err(KeyError::UnknownKeyId(kid.to_string()));
        }
        let mut keys = guard.keys.clone();
        keys.remove(kid);
        let next = Arc::new(KeyringSnapshot {
            keys,
            signing_kid: guard.signing_kid.clone(),
        });
        *guard = next;
        drop(guard);
        tracing::info!(kid, "signing key retired");
        Ok(())
    }

    /// The key currently used to sign new tokens.
    pub fn signing_key(&self) -> Arc<SigningKey> {
        let snapshot = self.snapshot();
        // The signing kid always names a present key; both are written
        // together under the same swap.
        snapshot.keys[&snapshot.signing_kid].clone()
    }

    /// Resolve a key by the id found in a token header.
    pub fn lookup(&self, kid: &str) -> Option<Arc<SigningKey>> {
        self.snapshot().keys.get(kid).cloned()
    }

    /// Key ids currently in the active set.
    pub fn key_ids(&self) -> Vec<String> {
        self.snapshot().keys.keys().cloned().collect()
    }

    fn snapshot(&self) -> Arc<KeyringSnapshot> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

// Shows kids only; the keys themselves already redact their secrets.
impl fmt::Debug for Keyring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("Keyring")
            .field("signing_kid", &snapshot.signing_kid)
            .field("key_ids", &snapshot.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}
