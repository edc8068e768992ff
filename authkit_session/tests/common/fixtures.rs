use authkit_session::AuthKitConfig;
use serde_json::{Value, json};

pub const MOCK_API_KEY: &str = "sk_test_integration";
pub const MOCK_CLIENT_ID: &str = "client_integration";
pub const COOKIE_PASSWORD: &str = "integration-cookie-password-0123456789";

pub const TEST_KEY_ID: &str = "test-key-1";
pub const TEST_KEY_PEM: &[u8] = include_bytes!("../fixtures/test_rsa_key.pem");
pub const TEST_JWKS: &str = include_str!("../fixtures/jwks.json");

pub fn config_for(base_url: &str) -> AuthKitConfig {
    AuthKitConfig::from_lookup(|key| match key {
        "WORKOS_API_KEY" => Some(MOCK_API_KEY.to_string()),
        "WORKOS_CLIENT_ID" => Some(MOCK_CLIENT_ID.to_string()),
        "WORKOS_COOKIE_PASSWORD" => Some(COOKIE_PASSWORD.to_string()),
        "WORKOS_REDIRECT_URI" => Some("http://localhost:3000/callback".to_string()),
        "WORKOS_API_BASE_URL" => Some(base_url.to_string()),
        _ => None,
    })
    .expect("test configuration should be valid")
}

pub fn user_json() -> Value {
    json!({
        "object": "user",
        "id": "user_01INTEGRATION",
        "email": "grace@example.com",
        "first_name": "Grace",
        "last_name": "Hopper",
        "email_verified": true,
        "profile_picture_url": null,
        "created_at": "2024-05-01T10:00:00.000Z",
        "updated_at": "2024-05-01T10:00:00.000Z"
    })
}
