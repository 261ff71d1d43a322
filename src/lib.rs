// SPDX-License-Identifier: AGPL-3.0-or-later

//! authn-core - Credential Verification and Token Lifecycle
//!
//! The component behind a login endpoint that a web service delegates to:
//! it verifies a principal's credentials against external collaborators,
//! issues signed time-bounded access tokens, and validates or rejects
//! tokens presented on subsequent requests. HTTP routing, request
//! validation, user persistence, and password hashing stay outside; this
//! crate consumes them through the [`credentials::UserLookup`],
//! [`credentials::SecretVerifier`], and [`keyring::SecretStore`] traits.
//!
//! ## Modules
//!
//! - `auth` - [`auth::AuthCore`], the authenticate/verify orchestrator
//! - `credentials` - credential checks against the external user store
//! - `token` - signing and the ordered verification pipeline
//! - `claims` - the claim set and its builder
//! - `keyring` - signing key material and rotation
//! - `clock` - injected time source
//! - `config` - required issuer/audience/ttl configuration
//! - `error` - error taxonomy
//! - `testsupport` - in-memory collaborator fakes
//!
//! ## Flow
//!
//! `authenticate(identifier, secret)` looks the user up, checks the secret
//! with the hashing collaborator, builds a claim set, and signs it with
//! the current signing key. `verify_token(token)` resolves the key by the
//! `kid` in the token header, checks the signature before trusting any
//! claim, then checks expiry and issuer/audience, returning a typed
//! rejection at the first failing step.
//!
//! ## Security
//!
//! - Unknown identifier and wrong secret are indistinguishable to callers
//! - Claims are never read without a verified signature
//! - HS256 keys must carry at least 256 bits of secret
//! - Rotation swaps an immutable key-set snapshot; verifications never
//!   observe a partially-updated set

pub mod auth;
pub mod claims;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod error;
pub mod keyring;
pub mod principal;
pub mod testsupport;
pub mod token;

pub use auth::{AuthCore, AuthResponse};
pub use claims::{Claims, ClaimsBuilder};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuthConfig, TokenTtl};
pub use credentials::{CredentialVerifier, SecretVerifier, UserLookup};
pub use error::{AuthError, ConfigError, KeyError, LookupError, SecretStoreError};
pub use keyring::{Keyring, SecretStore, SigningKey};
pub use principal::{Principal, UserRecord};
pub use token::{IssuedToken, RejectReason, VerificationResult};
