// SPDX-License-Identifier: AGPL-3.0-or-later

//! The authentication core orchestrator.
//!
//! Composes credential verification, claims building, and token signing
//! into one `authenticate` operation, and exposes a separate
//! `verify_token` operation over the same key material.

use std::sync::Arc;

use serde::Serialize;

use crate::claims::ClaimsBuilder;
use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::credentials::{CredentialVerifier, SecretVerifier, UserLookup};
use crate::error::{AuthError, KeyError};
use crate::keyring::{Keyring, SigningKey};
use crate::token::{self, TokenVerifier, VerificationResult};

/// Successful authenticate outcome handed to the surrounding service.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    /// The principal's opaque unique id (the token's `sub`).
    pub subject_id: String,
    /// Human-readable display name, when the principal has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// The opaque signed token.
    pub token: String,
    /// Seconds until the token expires, straight from the configured ttl.
    pub expires_in_seconds: i64,
}

/// Authentication core: credential verification plus token lifecycle.
///
/// Owns no long-lived state beyond the keyring (read-mostly, swapped on
/// rotation) and a clock reference. `verify_token` is side-effect-free
/// aside from reading the keyring snapshot and is safe to call from many
/// requests concurrently.
pub struct AuthCore<L, S> {
    credentials: CredentialVerifier<L, S>,
    claims: ClaimsBuilder,
    verifier: TokenVerifier,
    keyring: Keyring,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl<L: UserLookup, S: SecretVerifier> AuthCore<L, S> {
    /// Create a core over the given collaborators, using the system clock.
    pub fn new(config: AuthConfig, keyring: Keyring, lookup: L, secrets: S) -> Self {
        Self::with_clock(config, keyring, lookup, secrets, Arc::new(SystemClock))
    }

    /// Create a core with an explicit clock.
    pub fn with_clock(
        config: AuthConfig,
        keyring: Keyring,
        lookup: L,
        secrets: S,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials: CredentialVerifier::new(lookup, secrets),
            claims: ClaimsBuilder::new(&config.issuer, &config.audience),
            verifier: TokenVerifier::new(&config.issuer, &config.audience, clock.clone()),
            keyring,
            clock,
            config,
        }
    }

    /// Tolerate clock skew on token verification.
    pub fn with_leeway(mut self, seconds: i64) -> Self {
        self.verifier = self.verifier.with_leeway(seconds);
        self
    }

    /// Verify credentials and issue a signed access token.
    ///
    /// Returns [`AuthError::InvalidCredentials`] uniformly for unknown
    /// identifier, wrong secret, and empty inputs; callers cannot
    /// distinguish the causes from this call alone.
    /// [`AuthError::Upstream`] is reserved for collaborator failure and is
    /// the caller's signal to apply its own retry policy.
    pub async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<AuthResponse, AuthError> {
        let principal = self
            .credentials
            .verify(identifier, secret)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "user lookup unavailable"))?
            .ok_or(AuthError::InvalidCredentials)?;

        let now = self.clock.now();
        let claims = self.claims.build(&principal, now, self.config.ttl);
        let issued = token::sign(&claims, &self.keyring.signing_key())?;

        tracing::debug!(subject = %claims.sub, jti = %claims.jti, "issued access token");

        Ok(AuthResponse {
            subject_id: principal.id,
            display_name: claims.name,
            token: issued.token,
            expires_in_seconds: self.config.ttl.as_secs(),
        })
    }

    /// Verify a presented token against the active key set.
    pub fn verify_token(&self, token: &str) -> VerificationResult {
        self.verifier.verify(token, &self.keyring)
    }

    /// Add a key and make it the signing default; prior keys stay
    /// verifiable until retired.
    pub fn add_key(&self, key: SigningKey) {
        self.keyring.add_key(key);
    }

    /// Retire a key from the active set.
    ///
    /// The caller confirms out-of-band that all tokens signed with it have
    /// expired; retiring too early invalidates live sessions.
    pub fn retire_key(&self, kid: &str) -> Result<(), KeyError> {
        self.keyring.retire_key(kid)
    }

    /// Key ids currently accepted for verification.
    pub fn key_ids(&self) -> Vec<String> {
        self.keyring.key_ids()
    }
}
