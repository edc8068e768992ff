//! Axum-based mock of the WorkOS user management API
//!
//! Each test starts its own server on an ephemeral port, so tests never share
//! issued codes or refresh tokens.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::fixtures::{MOCK_API_KEY, MOCK_CLIENT_ID, TEST_JWKS, TEST_KEY_ID, TEST_KEY_PEM};

/// How the mock answers refresh grants
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshMode {
    Normal,
    ServerError,
}

#[derive(Clone)]
pub struct MockServerState {
    /// Authorization codes waiting to be exchanged, with the user they sign in
    codes: Arc<Mutex<HashMap<String, Value>>>,
    /// Live refresh tokens and their user
    refresh_tokens: Arc<Mutex<HashMap<String, Value>>>,
    refresh_mode: Arc<Mutex<RefreshMode>>,
    /// Lifetime of issued access tokens, negative to issue expired ones
    access_token_ttl: Arc<AtomicI64>,
    /// When false the JWKS endpoint answers 503
    jwks_available: Arc<AtomicBool>,
    issued: Arc<AtomicUsize>,
    pub jwks_requests: Arc<AtomicUsize>,
    pub refresh_requests: Arc<AtomicUsize>,
}

impl Default for MockServerState {
    fn default() -> Self {
        Self {
            codes: Arc::default(),
            refresh_tokens: Arc::default(),
            refresh_mode: Arc::new(Mutex::new(RefreshMode::Normal)),
            access_token_ttl: Arc::new(AtomicI64::new(300)),
            jwks_available: Arc::new(AtomicBool::new(true)),
            issued: Arc::default(),
            jwks_requests: Arc::default(),
            refresh_requests: Arc::default(),
        }
    }
}

impl MockServerState {
    pub fn add_code(&self, code: &str, user: Value) {
        self.codes.lock().unwrap().insert(code.to_string(), user);
    }

    pub fn set_access_token_ttl(&self, seconds: i64) {
        self.access_token_ttl.store(seconds, Ordering::SeqCst);
    }

    pub fn set_jwks_available(&self, available: bool) {
        self.jwks_available.store(available, Ordering::SeqCst);
    }

    pub fn set_refresh_mode(&self, mode: RefreshMode) {
        *self.refresh_mode.lock().unwrap() = mode;
    }

    /// Forget every refresh token, as if the sessions were revoked
    pub fn revoke_refresh_tokens(&self) {
        self.refresh_tokens.lock().unwrap().clear();
    }

    fn issue_tokens(&self, user: &Value) -> Value {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let sid = format!("session_{n:02}");
        let refresh_token = format!("rt_{n:02}");
        let exp = chrono::Utc::now().timestamp() + self.access_token_ttl.load(Ordering::SeqCst);

        let claims = json!({
            "sid": sid,
            "sub": user["id"],
            "exp": exp,
            "org_id": "org_01",
            "role": "member",
            "permissions": ["widgets:read"],
        });
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(TEST_KEY_ID.to_string());
        let key = EncodingKey::from_rsa_pem(TEST_KEY_PEM).expect("fixture key should load");
        let access_token = jsonwebtoken::encode(&header, &claims, &key).expect("token should encode");

        self.refresh_tokens
            .lock()
            .unwrap()
            .insert(refresh_token.clone(), user.clone());

        json!({
            "user": user,
            "organization_id": null,
            "access_token": access_token,
            "refresh_token": refresh_token,
            "authentication_method": "Password",
        })
    }
}

pub struct MockWorkos {
    pub base_url: String,
    pub state: MockServerState,
}

impl MockWorkos {
    pub async fn start() -> Self {
        let state = MockServerState::default();
        let app = Router::new()
            .route("/sso/jwks/{client_id}", get(jwks))
            .route("/user_management/authenticate", post(authenticate))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("bound address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }
}

fn error(status: StatusCode, code: &str, description: &str) -> Response {
    (
        status,
        Json(json!({"error": code, "error_description": description})),
    )
        .into_response()
}

async fn jwks(State(state): State<MockServerState>, Path(client_id): Path<String>) -> Response {
    state.jwks_requests.fetch_add(1, Ordering::SeqCst);
    if !state.jwks_available.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    if client_id != MOCK_CLIENT_ID {
        return StatusCode::NOT_FOUND.into_response();
    }
    let body: Value = serde_json::from_str(TEST_JWKS).expect("fixture JWKs should parse");
    Json(body).into_response()
}

async fn authenticate(State(state): State<MockServerState>, Json(body): Json<Value>) -> Response {
    if body["client_id"] != MOCK_CLIENT_ID || body["client_secret"] != MOCK_API_KEY {
        return error(StatusCode::UNAUTHORIZED, "invalid_client", "Invalid client secret.");
    }

    match body["grant_type"].as_str() {
        Some("authorization_code") => {
            let code = body["code"].as_str().unwrap_or_default();
            let user = state.codes.lock().unwrap().remove(code);
            match user {
                Some(user) => Json(state.issue_tokens(&user)).into_response(),
                None => error(
                    StatusCode::BAD_REQUEST,
                    "invalid_grant",
                    "The code is invalid or has expired.",
                ),
            }
        }
        Some("refresh_token") => {
            state.refresh_requests.fetch_add(1, Ordering::SeqCst);
            if *state.refresh_mode.lock().unwrap() == RefreshMode::ServerError {
                return error(StatusCode::INTERNAL_SERVER_ERROR, "server_error", "Try again.");
            }
            let token = body["refresh_token"].as_str().unwrap_or_default();
            // Refresh tokens are single use
            let user = state.refresh_tokens.lock().unwrap().remove(token);
            match user {
                Some(user) => Json(state.issue_tokens(&user)).into_response(),
                None => error(
                    StatusCode::BAD_REQUEST,
                    "invalid_grant",
                    "Refresh token already exchanged.",
                ),
            }
        }
        _ => error(
            StatusCode::BAD_REQUEST,
            "unsupported_grant_type",
            "Unsupported grant type.",
        ),
    }
}
