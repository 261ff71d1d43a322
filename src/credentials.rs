// SPDX-License-Identifier: AGPL-3.0-or-later

//! Credential verification against external collaborators.
//!
//! The core consults two read-only collaborators: a user store and a
//! secret (password-hash) verifier. It never implements hashing itself and
//! never mutates user state on failure; lockout and throttling belong to
//! an external layer.
//!
//! "User not found" and "password wrong" both come back as `Ok(None)` so
//! the caller cannot tell the two apart (user-enumeration resistance).

use std::future::Future;

use crate::error::{AuthError, LookupError};
use crate::principal::{Principal, UserRecord};

/// Read-only user lookup, backed by external persistence.
///
/// The lookup is the core's only suspension point; cancellation from the
/// caller's request context propagates through the returned future.
pub trait UserLookup: Send + Sync {
    /// Find a user record by its login identifier.
    fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<Option<UserRecord>, LookupError>> + Send;
}

/// External secret-verification collaborator (password-hashing library).
pub trait SecretVerifier: Send + Sync {
    /// Check a supplied secret against the stored credential hash.
    fn check(&self, stored_hash: &[u8], supplied_secret: &str) -> bool;
}

/// Decides whether an (identifier, secret) pair names a valid principal.
pub struct CredentialVerifier<L, S> {
    lookup: L,
    secrets: S,
}

impl<L: UserLookup, S: SecretVerifier> CredentialVerifier<L, S> {
    /// Create a verifier over the two collaborators.
    pub fn new(lookup: L, secrets: S) -> Self {
        Self { lookup, secrets }
    }

    /// Verify credentials, returning a [`Principal`] on success.
    ///
    /// Inputs empty after trimming short-circuit to `Ok(None)` without
    /// consulting collaborators. `Err` is reserved for collaborator
    /// failure and is never used for invalid credentials.
    pub async fn verify(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Option<Principal>, AuthError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || secret.trim().is_empty() {
            return Ok(None);
        }

        let record = match self.lookup.find_by_identifier(identifier).await? {
            Some(record) => record,
            None => {
                // Same message as the mismatch path below.
                tracing::debug!("credential verification failed");
                return Ok(None);
            }
        };

        if !self.secrets.check(&record.password_hash, secret) {
            tracing::debug!("credential verification failed");
            return Ok(None);
        }

        Ok(Some(record.into_principal()))
    }
}
