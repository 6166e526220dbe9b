use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

/// Secret the test router verifies tokens with.
pub const TEST_JWT_SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";

fn sign(claims: serde_json::Value, secret: &str) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign test token")
}

/// Valid token for `username`, expiring in an hour.
pub fn make_token(username: &str) -> String {
    let exp = (Utc::now() + Duration::hours(1)).timestamp();
    sign(json!({ "username": username, "exp": exp }), TEST_JWT_SECRET)
}

pub fn expired_token(username: &str) -> String {
    let exp = (Utc::now() - Duration::hours(1)).timestamp();
    sign(json!({ "username": username, "exp": exp }), TEST_JWT_SECRET)
}

pub fn token_with_wrong_secret(username: &str) -> String {
    sign(json!({ "username": username }), "some-other-secret")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
