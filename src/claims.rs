// SPDX-License-Identifier: AGPL-3.0-or-later

//! Token claims and the builder that derives them from a [`Principal`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TokenTtl;
use crate::principal::Principal;

/// The full claim set embedded in one token.
///
/// Exactly one `sub` and one `jti` by construction, `iat < exp` always.
/// Attributes absent on the principal are omitted rather than emitted as
/// null, keeping the token minimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal's opaque unique id.
    pub sub: String,
    /// Unique token id, fresh per issuance.
    pub jti: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Contact attribute, present only when the principal carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name, present only when the principal has name parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role attributes, copied verbatim from the principal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

/// Maps a verified principal to the exact claim set to embed.
#[derive(Debug, Clone)]
pub struct ClaimsBuilder {
    issuer: String,
    audience: String,
}

impl ClaimsBuilder {
    /// Create a builder stamping the given issuer and audience.
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Build the claim set for one token.
    ///
    /// The `jti` is a fresh UUIDv4 on every call: never reused, never
    /// derived from the principal id. `iat = now`, `exp = now + ttl`;
    /// [`TokenTtl`] guarantees a strictly positive ttl, so `iat < exp`.
    pub fn build(&self, principal: &Principal, now: DateTime<Utc>, ttl: TokenTtl) -> Claims {
        Claims {
            sub: principal.id.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl.as_duration()).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            email: principal.email.clone(),
            name: principal.display_name(),
            roles: principal.roles.clone(),
        }
    }
}
