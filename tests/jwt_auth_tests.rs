// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication tests.
//!
//! These tests verify that tokens created by `create_jwt` can be decoded
//! with the claims layout the auth middleware expects.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sharenest::middleware::auth::{create_jwt, Claims};

const SIGNING_KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

#[test]
fn test_jwt_roundtrip() {
    let user_id = "Xb12uQ9fhsO3";

    let token = create_jwt(user_id, SIGNING_KEY).expect("Failed to create JWT");

    let key = DecodingKey::from_secret(SIGNING_KEY);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(&token, &key, &validation)
        .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, user_id);
    assert!(token_data.claims.iat > 0);
    assert!(token_data.claims.exp > token_data.claims.iat);
}

#[test]
fn test_jwt_expiration_is_future() {
    use std::time::{SystemTime, UNIX_EPOCH};

    let token = create_jwt("user-1", SIGNING_KEY).unwrap();

    let key = DecodingKey::from_secret(SIGNING_KEY);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false; // We'll check manually

    let token_data = decode::<Claims>(&token, &key, &validation).unwrap();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    // Token should expire at least 29 days in the future
    assert!(
        token_data.claims.exp > now + 86400 * 29,
        "Token expiration should be ~30 days in the future"
    );
}

#[test]
fn test_jwt_wrong_key_fails() {
    let token = create_jwt("user-1", SIGNING_KEY).unwrap();

    let key = DecodingKey::from_secret(b"a_completely_different_key_value");
    let validation = Validation::new(Algorithm::HS256);

    assert!(decode::<Claims>(&token, &key, &validation).is_err());
}
