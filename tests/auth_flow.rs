// SPDX-License-Identifier: AGPL-3.0-or-later

//! End-to-end authenticate → verify properties.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};

use authn_core::testsupport::{MemoryUserStore, PlainTextSecretVerifier, StaticSecretStore};
use authn_core::{
    AuthConfig, AuthCore, AuthError, Keyring, ManualClock, RejectReason, SigningKey, TokenTtl,
    UserRecord, VerificationResult,
};

const ISSUER: &str = "https://auth.example.com";
const AUDIENCE: &str = "https://api.example.com";

fn alice() -> UserRecord {
    UserRecord {
        id: "user_alice".to_string(),
        given_name: "Alice".to_string(),
        family_name: "Liddell".to_string(),
        email: Some("alice@example.com".to_string()),
        roles: vec!["client".to_string()],
        password_hash: b"CorrectPass123!".to_vec(),
    }
}

fn signing_key(kid: &str) -> SigningKey {
    SigningKey::hs256(kid, format!("{kid}-0123456789abcdef0123456789abcdef")).unwrap()
}

struct Harness {
    core: AuthCore<MemoryUserStore, PlainTextSecretVerifier>,
    store: MemoryUserStore,
    clock: Arc<ManualClock>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn harness(ttl_secs: i64) -> Harness {
    init_tracing();
    let store = MemoryUserStore::new();
    store.insert("alice@example.com", alice());

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let config = AuthConfig::new(ISSUER, AUDIENCE, TokenTtl::from_secs(ttl_secs).unwrap()).unwrap();
    let keyring = Keyring::new(signing_key("key-a"));
    let core = AuthCore::with_clock(
        config,
        keyring,
        store.clone(),
        PlainTextSecretVerifier,
        clock.clone(),
    );

    Harness { core, store, clock }
}

#[tokio::test]
async fn authenticate_then_verify_round_trips() {
    let h = harness(3600);

    let response = h
        .core
        .authenticate("alice@example.com", "CorrectPass123!")
        .await
        .unwrap();
    assert_eq!(response.subject_id, "user_alice");
    assert_eq!(response.expires_in_seconds, 3600);

    let claims = match h.core.verify_token(&response.token) {
        VerificationResult::Valid(claims) => claims,
        VerificationResult::Rejected(reason) => panic!("rejected: {reason}"),
    };
    assert_eq!(claims.sub, "user_alice");
    assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
    assert_eq!(claims.iss, ISSUER);
    assert_eq!(claims.aud, AUDIENCE);
    assert!(claims.iat < claims.exp);
}

#[tokio::test]
async fn wrong_secret_and_unknown_user_return_the_same_outcome() {
    let h = harness(3600);

    let wrong_secret = h
        .core
        .authenticate("alice@example.com", "wrong")
        .await
        .unwrap_err();
    let unknown_user = h
        .core
        .authenticate("mallory@example.com", "CorrectPass123!")
        .await
        .unwrap_err();

    assert!(matches!(wrong_secret, AuthError::InvalidCredentials));
    assert!(matches!(unknown_user, AuthError::InvalidCredentials));
    assert_eq!(wrong_secret.error_code(), unknown_user.error_code());
}

#[tokio::test]
async fn empty_inputs_fail_without_touching_the_user_store() {
    let h = harness(3600);

    let err = h.core.authenticate("", "CorrectPass123!").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    let err = h.core.authenticate("alice@example.com", "   ").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    assert_eq!(h.store.lookup_count(), 0);
}

#[tokio::test]
async fn upstream_outage_is_distinct_from_invalid_credentials() {
    let h = harness(3600);
    h.store.set_unavailable(true);

    let err = h
        .core
        .authenticate("alice@example.com", "CorrectPass123!")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Upstream(_)));
    assert_eq!(err.error_code(), "upstream_unavailable");
}

#[tokio::test]
async fn flipping_one_signature_bit_is_bad_signature() {
    let h = harness(3600);
    let token = h
        .core
        .authenticate("alice@example.com", "CorrectPass123!")
        .await
        .unwrap()
        .token;

    let parts: Vec<&str> = token.split('.').collect();
    let mut sig = URL_SAFE_NO_PAD.decode(parts[2]).unwrap();
    sig[0] ^= 0x01;
    let tampered = format!("{}.{}.{}", parts[0], parts[1], URL_SAFE_NO_PAD.encode(&sig));

    assert_eq!(
        h.core.verify_token(&tampered),
        VerificationResult::Rejected(RejectReason::BadSignature)
    );
}

#[tokio::test]
async fn altering_the_claims_segment_is_bad_signature() {
    let h = harness(3600);
    let token = h
        .core
        .authenticate("alice@example.com", "CorrectPass123!")
        .await
        .unwrap()
        .token;

    let parts: Vec<&str> = token.split('.').collect();
    let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
    let forged = String::from_utf8(payload)
        .unwrap()
        .replace("user_alice", "user_admin");
    let tampered = format!(
        "{}.{}.{}",
        parts[0],
        URL_SAFE_NO_PAD.encode(forged.as_bytes()),
        parts[2]
    );

    assert_eq!(
        h.core.verify_token(&tampered),
        VerificationResult::Rejected(RejectReason::BadSignature)
    );
}

#[tokio::test]
async fn token_expires_exactly_at_exp() {
    let h = harness(1);
    let token = h
        .core
        .authenticate("alice@example.com", "CorrectPass123!")
        .await
        .unwrap()
        .token;

    // Still within the ttl window.
    assert!(h.core.verify_token(&token).is_valid());

    // exp == now: rejected.
    h.clock.advance(Duration::seconds(1));
    assert_eq!(
        h.core.verify_token(&token),
        VerificationResult::Rejected(RejectReason::Expired)
    );
}

#[tokio::test]
async fn consecutive_tokens_for_the_same_principal_differ() {
    let h = harness(3600);

    let first = h
        .core
        .authenticate("alice@example.com", "CorrectPass123!")
        .await
        .unwrap();
    let second = h
        .core
        .authenticate("alice@example.com", "CorrectPass123!")
        .await
        .unwrap();

    assert_ne!(first.token, second.token);

    let first_jti = match h.core.verify_token(&first.token) {
        VerificationResult::Valid(claims) => claims.jti,
        other => panic!("unexpected: {other:?}"),
    };
    let second_jti = match h.core.verify_token(&second.token) {
        VerificationResult::Valid(claims) => claims.jti,
        other => panic!("unexpected: {other:?}"),
    };
    assert_ne!(first_jti, second_jti);
}

#[tokio::test]
async fn rotation_keeps_old_tokens_valid_until_retirement() {
    let h = harness(3600);

    let old_token = h
        .core
        .authenticate("alice@example.com", "CorrectPass123!")
        .await
        .unwrap()
        .token;

    // Key B becomes the signing default; key A stays in the active set.
    h.core.add_key(signing_key("key-b"));
    let mut kids = h.core.key_ids();
    kids.sort();
    assert_eq!(kids, vec!["key-a".to_string(), "key-b".to_string()]);
    assert!(h.core.verify_token(&old_token).is_valid());

    let new_token = h
        .core
        .authenticate("alice@example.com", "CorrectPass123!")
        .await
        .unwrap()
        .token;
    assert!(h.core.verify_token(&new_token).is_valid());

    // Retiring key A invalidates only tokens it signed.
    h.core.retire_key("key-a").unwrap();
    assert_eq!(
        h.core.verify_token(&old_token),
        VerificationResult::Rejected(RejectReason::UnknownKey)
    );
    assert!(h.core.verify_token(&new_token).is_valid());
}

#[tokio::test]
async fn keyring_loads_from_secret_store() {
    let store = MemoryUserStore::new();
    store.insert("alice@example.com", alice());

    let secret_store = StaticSecretStore::new(vec![signing_key("key-old"), signing_key("key-new")]);
    let keyring = Keyring::from_secret_store(&secret_store).unwrap();
    assert_eq!(keyring.signing_key().kid(), "key-new");

    let config = AuthConfig::new(ISSUER, AUDIENCE, TokenTtl::from_secs(60).unwrap()).unwrap();
    let core = AuthCore::new(config, keyring, store, PlainTextSecretVerifier);

    let response = core
        .authenticate("alice@example.com", "CorrectPass123!")
        .await
        .unwrap();
    assert!(core.verify_token(&response.token).is_valid());
}

#[test]
fn garbage_tokens_are_malformed() {
    let keyring = Keyring::new(signing_key("key-a"));
    let config = AuthConfig::new(ISSUER, AUDIENCE, TokenTtl::from_secs(60).unwrap()).unwrap();
    let core = AuthCore::new(
        config,
        keyring,
        MemoryUserStore::new(),
        PlainTextSecretVerifier,
    );

    for token in ["", "abc", "a.b", "a.b.c.d", "not base64 at all.x.y"] {
        assert_eq!(
            core.verify_token(token),
            VerificationResult::Rejected(RejectReason::Malformed),
            "token {token:?}"
        );
    }
}
