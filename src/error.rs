// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for the authentication core.
//!
//! Verification rejections are returned as typed outcomes
//! ([`RejectReason`](crate::token::RejectReason) inside a
//! [`VerificationResult`](crate::token::VerificationResult)), never raised.
//! The errors in this module cover the authenticate path and the
//! fail-fast configuration contracts.

use std::sync::Arc;

use thiserror::Error;

/// Errors returned by the authenticate path.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Identifier not found OR secret mismatch.
    ///
    /// Intentionally merged: callers must not be able to distinguish the
    /// two causes (user-enumeration resistance).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A collaborator (user store, secret store) failed to respond.
    ///
    /// Distinct from `InvalidCredentials` so the caller can apply its own
    /// retry/backoff policy. The core never retries internally.
    #[error("upstream collaborator unavailable: {0}")]
    Upstream(#[from] LookupError),

    /// Token encoding failed. Indicates a programming or key-material
    /// problem, not an end-user error.
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    /// Stable error code for logging and API error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Upstream(_) => "upstream_unavailable",
            AuthError::Signing(_) => "signing_error",
        }
    }
}

/// Error raised by the external user-lookup collaborator.
///
/// Wraps the collaborator's failure with an optional source so the full
/// chain survives into structured logs.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LookupError {
    message: String,
    #[source]
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl LookupError {
    /// Create a lookup error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying collaborator error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }
}

/// Error raised by the external secret store while loading key material.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SecretStoreError {
    message: String,
}

impl SecretStoreError {
    /// Create a secret store error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Key material contract violations.
///
/// These indicate a misconfigured deployment and are surfaced at
/// construction or rotation time, never during request handling.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KeyError {
    /// Secret bytes are below the algorithm's minimum entropy requirement.
    #[error("signing key secret too short: {actual} bytes (minimum {minimum})")]
    WeakKey {
        /// Supplied secret length in bytes.
        actual: usize,
        /// Minimum length required by the algorithm.
        minimum: usize,
    },

    /// The key id is empty.
    #[error("signing key id must not be empty")]
    EmptyKeyId,

    /// The algorithm is not a supported HMAC variant.
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Rotation referenced a key id not in the active set.
    #[error("unknown key id: {0}")]
    UnknownKeyId(String),

    /// Attempted to retire the key currently used for signing.
    #[error("cannot retire the current signing key: {0}")]
    RetireActive(String),

    /// The secret store supplied no keys at startup.
    #[error("secret store returned no signing keys")]
    EmptyKeySet,

    /// The secret store failed while loading key material.
    #[error("secret store error: {0}")]
    Store(#[from] SecretStoreError),
}

/// Configuration contract violations. Fail-fast at construction.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Token ttl must be at least one whole second.
    #[error("token ttl must be strictly positive (whole seconds)")]
    NonPositiveTtl,

    /// Issuer must not be empty.
    #[error("issuer must not be empty")]
    EmptyIssuer,

    /// Audience must not be empty.
    #[error("audience must not be empty")]
    EmptyAudience,
}
