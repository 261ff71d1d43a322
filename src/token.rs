// SPDX-License-Identifier: AGPL-3.0-or-later

//! Token signing and verification.
//!
//! The wire format is the interoperable three-segment JWT layout
//! (`header.claims.signature`, base64url). Signing stamps the key id into
//! the header so rotation can resolve the right key later.
//!
//! Verification runs a fixed, ordered pipeline; each step short-circuits
//! and the order is never changed. In particular the signature is checked
//! before any claim value is trusted, including expiry, so a forged-expiry
//! token cannot skip the signature step.

use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, encode, errors::ErrorKind, Header, Validation};

use crate::claims::Claims;
use crate::clock::Clock;
use crate::error::AuthError;
use crate::keyring::{Keyring, SigningKey};

/// An issued token: the opaque signed string plus its expiry.
///
/// Callers treat the string as opaque; the only operations are issue and
/// verify. Claims are never read without verifying the signature first.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The signed `header.claims.signature` string.
    pub token: String,
    /// Expiration (seconds since epoch), echoed from the claim set.
    pub expires_at: i64,
}

/// Why a presented token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Token does not parse as the expected structure.
    Malformed,
    /// Token references a key id not in the active key set.
    UnknownKey,
    /// Signature does not match the recomputed value.
    BadSignature,
    /// Current time is at or past the claimed expiry.
    Expired,
    /// Issuer or audience does not match the configured expected values.
    WrongAudience,
}

impl RejectReason {
    /// Stable reason code for logging and API error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Malformed => "malformed_token",
            RejectReason::UnknownKey => "unknown_key",
            RejectReason::BadSignature => "bad_signature",
            RejectReason::Expired => "token_expired",
            RejectReason::WrongAudience => "wrong_audience",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of verifying a presented token. Never partially valid.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationResult {
    /// Signature and all constraints check out; here are the claims.
    Valid(Claims),
    /// The token was rejected; the reason says at which step.
    Rejected(RejectReason),
}

impl VerificationResult {
    /// True when the token verified.
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid(_))
    }

    /// The verified claims, if any.
    pub fn claims(&self) -> Option<&Claims> {
        match self {
            VerificationResult::Valid(claims) => Some(claims),
            VerificationResult::Rejected(_) => None,
        }
    }
}

/// Serialize and sign a claim set with the given key.
///
/// The header carries the key's algorithm and kid.
pub fn sign(claims: &Claims, key: &SigningKey) -> Result<IssuedToken, AuthError> {
    let mut header = Header::new(key.algorithm());
    header.kid = Some(key.kid().to_string());

    let token = encode(&header, claims, &key.encoding_key())
        .map_err(|e| AuthError::Signing(e.to_string()))?;

    Ok(IssuedToken {
        token,
        expires_at: claims.exp,
    })
}

/// Parses presented tokens and checks signature, temporal, and identity
/// constraints against an injected clock and the active key set.
pub struct TokenVerifier {
    issuer: String,
    audience: String,
    clock: Arc<dyn Clock>,
    leeway_secs: i64,
}

impl TokenVerifier {
    /// Create a verifier expecting the given issuer and audience.
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            clock,
            leeway_secs: 0,
        }
    }

    /// Tolerate clock skew on the expiry check.
    ///
    /// Default is zero: `exp == now` is already expired.
    pub fn with_leeway(mut self, seconds: i64) -> Self {
        self.leeway_secs = seconds;
        self
    }

    /// Verify a presented token against the active key set.
    ///
    /// Steps, in order, each short-circuiting:
    /// 1. parse the header; malformed structure or missing kid → `Malformed`
    /// 2. resolve the key by kid → `UnknownKey`
    /// 3. recompute and compare the signature (constant-time inside the
    ///    JWT library), with all claim validation disabled so nothing is
    ///    trusted before this step → `BadSignature`
    /// 4. expiry against the injected clock → `Expired`
    /// 5. issuer and audience → `WrongAudience`
    pub fn verify(&self, token: &str, keyring: &Keyring) -> VerificationResult {
        let header = match decode_header(token) {
            Ok(header) => header,
            Err(_) => return self.reject(RejectReason::Malformed),
        };
        let kid = match header.kid {
            Some(kid) => kid,
            // The header's key id is the rotation mechanism; a token
            // without one does not have the expected structure.
            None => return self.reject(RejectReason::Malformed),
        };

        let key = match keyring.lookup(&kid) {
            Some(key) => key,
            None => return self.reject(RejectReason::UnknownKey),
        };

        // Signature only. Temporal and audience validation stay disabled
        // here: those claims are checked below, after the signature has
        // been established, against the injected clock.
        let mut validation = Validation::new(key.algorithm());
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = match decode::<Claims>(token, &key.decoding_key(), &validation) {
            Ok(data) => data,
            Err(e) => {
                let reason = match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        RejectReason::BadSignature
                    }
                    _ => RejectReason::Malformed,
                };
                return self.reject(reason);
            }
        };
        let claims = data.claims;

        let now = self.clock.now().timestamp();
        if now >= claims.exp + self.leeway_secs {
            return self.reject(RejectReason::Expired);
        }

        if claims.iss != self.issuer || claims.aud != self.audience {
            return self.reject(RejectReason::WrongAudience);
        }

        VerificationResult::Valid(claims)
    }

    fn reject(&self, reason: RejectReason) -> VerificationResult {
        tracing::debug!(reason = reason.as_str(), "token rejected");
        VerificationResult::Rejected(reason)
    }
}
