// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT compatibility tests.
//!
//! Access tokens are minted by the identity provider, not by us. These tests
//! encode tokens shaped the way the provider issues them (extra claims, no
//! email for phone sign-ins) and check the verifier accepts them.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sassy_coach::db::MemoryDb;
use sassy_coach::services::IdentityService;
use serde_json::json;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const SECRET: &[u8] = b"provider_jwt_secret_32_bytes_long";

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn provider_token(claims: serde_json::Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .expect("Failed to create JWT")
}

fn verifier() -> IdentityService {
    IdentityService::new(SECRET, "authenticated", Arc::new(MemoryDb::new()))
}

#[test]
fn test_provider_token_with_extra_claims() {
    let token = provider_token(json!({
        "sub": "8f14e45f-ceea-467a-9af0-1d2b3c4d5e6f",
        "aud": "authenticated",
        "exp": now() + 3600,
        "iat": now(),
        "email": "coachee@example.com",
        "role": "authenticated",
        "app_metadata": { "provider": "email" },
        "session_id": "abc123",
    }));

    let claims = verifier().verify(&token).expect("provider token should verify");

    assert_eq!(claims.sub, "8f14e45f-ceea-467a-9af0-1d2b3c4d5e6f");
    assert_eq!(claims.email.as_deref(), Some("coachee@example.com"));
}

#[test]
fn test_provider_token_without_email() {
    let token = provider_token(json!({
        "sub": "phone-user",
        "aud": "authenticated",
        "exp": now() + 3600,
        "phone": "+15550100",
    }));

    let claims = verifier().verify(&token).unwrap();

    assert_eq!(claims.sub, "phone-user");
    assert!(claims.email.is_none());
}

#[test]
fn test_missing_audience_is_rejected() {
    let token = provider_token(json!({
        "sub": "someone",
        "exp": now() + 3600,
    }));

    assert!(verifier().verify(&token).is_err());
}

#[test]
fn test_other_algorithm_is_rejected() {
    let token = encode(
        &Header::new(Algorithm::HS512),
        &json!({ "sub": "someone", "aud": "authenticated", "exp": now() + 3600 }),
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap();

    assert!(verifier().verify(&token).is_err());
}
