// SPDX-License-Identifier: AGPL-3.0-or-later

//! Core configuration.
//!
//! Every field is required; nothing here carries a baked-in default. In
//! particular the token ttl is mandatory deployment configuration, not a
//! constant of the core.

use chrono::Duration;

use crate::error::ConfigError;

/// Validated token time-to-live.
///
/// Claims carry epoch-second timestamps, so the ttl must be at least one
/// whole second; anything shorter would let `iat == exp`. A zero or
/// negative ttl is a caller programming error and fails construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl(Duration);

impl TokenTtl {
    /// Validate a ttl duration.
    pub fn new(ttl: Duration) -> Result<Self, ConfigError> {
        if ttl.num_seconds() < 1 {
            return Err(ConfigError::NonPositiveTtl);
        }
        Ok(Self(ttl))
    }

    /// Validate a ttl given in whole seconds.
    pub fn from_secs(secs: i64) -> Result<Self, ConfigError> {
        Self::new(Duration::seconds(secs))
    }

    /// The ttl as a duration.
    pub fn as_duration(self) -> Duration {
        self.0
    }

    /// The ttl in whole seconds, as reported in authenticate responses.
    pub fn as_secs(self) -> i64 {
        self.0.num_seconds()
    }
}

/// Authentication core configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Issuer embedded in every token and required on verification.
    pub issuer: String,
    /// Audience embedded in every token and required on verification.
    pub audience: String,
    /// Access token lifetime.
    pub ttl: TokenTtl,
}

impl AuthConfig {
    /// Create a validated configuration.
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl: TokenTtl,
    ) -> Result<Self, ConfigError> {
        let issuer = issuer.into();
        let audience = audience.into();
        if issuer.trim().is_empty() {
            return Err(ConfigError::EmptyIssuer);
        }
        if audience.trim().is_empty() {
            return Err(ConfigError::EmptyAudience);
        }
        Ok(Self {
            issuer,
            audience,
            ttl,
        })
    }
}
