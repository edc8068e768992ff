use authkit_session::{
    AUTHKIT_PROVIDER, AuthResult, AuthorizationUrlRequest, CodeExchangeOptions, CookieDirective,
    FailureReason, GateAction, GateState, IdentityProvider, ProviderError, RefreshResult,
    SealedSession, WorkosClient, gate_request,
};
use std::sync::atomic::Ordering;

use crate::common::{COOKIE_PASSWORD, MOCK_CLIENT_ID, MockWorkos, RefreshMode, config_for, user_json};

fn sealing() -> CodeExchangeOptions {
    CodeExchangeOptions {
        seal_session: true,
        cookie_password: COOKIE_PASSWORD.to_string(),
    }
}

/// Start a mock provider and sign a user in, returning the sealed session
async fn signed_in() -> (MockWorkos, WorkosClient, SealedSession) {
    let mock = MockWorkos::start().await;
    let client = WorkosClient::new(&config_for(&mock.base_url)).expect("client should build");
    mock.state.add_code("code_ok", user_json());

    let exchange = client
        .authenticate_with_code("code_ok", &sealing())
        .await
        .expect("code exchange should succeed");
    let sealed = exchange
        .sealed_session
        .expect("sealing was requested");
    (mock, client, sealed)
}

#[tokio::test]
async fn test_code_exchange_then_authenticate() {
    let (mock, client, sealed) = signed_in().await;

    let result = client
        .load_sealed_session(&sealed, COOKIE_PASSWORD)
        .authenticate()
        .await;

    match result {
        AuthResult::Authenticated(session) => {
            assert_eq!(session.user.email, "grace@example.com");
            assert_eq!(session.session_id, "session_01");
            assert_eq!(session.organization_id.as_deref(), Some("org_01"));
            assert_eq!(session.role.as_deref(), Some("member"));
            assert_eq!(session.permissions, vec!["widgets:read".to_string()]);
        }
        other => panic!("Expected authenticated session, got {other:?}"),
    }
    assert_eq!(mock.state.jwks_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_code_exchange_without_sealing() {
    let mock = MockWorkos::start().await;
    let client = WorkosClient::new(&config_for(&mock.base_url)).expect("client should build");
    mock.state.add_code("code_ok", user_json());

    let exchange = client
        .authenticate_with_code(
            "code_ok",
            &CodeExchangeOptions {
                seal_session: false,
                cookie_password: COOKIE_PASSWORD.to_string(),
            },
        )
        .await
        .expect("code exchange should succeed");
    assert!(exchange.sealed_session.is_none());
    assert_eq!(exchange.user.id, "user_01INTEGRATION");
}

#[tokio::test]
async fn test_jwks_is_cached_between_requests() {
    let (mock, client, sealed) = signed_in().await;

    for _ in 0..3 {
        let result = client
            .load_sealed_session(&sealed, COOKIE_PASSWORD)
            .authenticate()
            .await;
        assert!(result.is_authenticated());
    }
    assert_eq!(mock.state.jwks_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unknown_code_is_rejected() {
    let mock = MockWorkos::start().await;
    let client = WorkosClient::new(&config_for(&mock.base_url)).expect("client should build");

    let result = client.authenticate_with_code("code_unknown", &sealing()).await;
    match result {
        Err(ProviderError::Api { status, code, .. }) => {
            assert_eq!(status, 400);
            assert_eq!(code, "invalid_grant");
        }
        other => panic!("Expected invalid_grant, got {other:?}"),
    }
}

#[tokio::test]
async fn test_codes_are_single_use() {
    let (_mock, client, _sealed) = signed_in().await;
    let result = client.authenticate_with_code("code_ok", &sealing()).await;
    assert!(matches!(result, Err(ProviderError::Api { status: 400, .. })));
}

#[tokio::test]
async fn test_wrong_api_key_is_rejected() {
    let mock = MockWorkos::start().await;
    let mut config = config_for(&mock.base_url);
    config.api_key = "sk_test_wrong".to_string();
    let client = WorkosClient::new(&config).expect("client should build");
    mock.state.add_code("code_ok", user_json());

    let result = client.authenticate_with_code("code_ok", &sealing()).await;
    assert!(matches!(result, Err(ProviderError::Api { status: 401, .. })));
}

#[tokio::test]
async fn test_expired_access_token_refreshes_to_valid_session() {
    let mock = MockWorkos::start().await;
    let client = WorkosClient::new(&config_for(&mock.base_url)).expect("client should build");
    mock.state.add_code("code_ok", user_json());
    mock.state.set_access_token_ttl(-3600);

    let sealed = client
        .authenticate_with_code("code_ok", &sealing())
        .await
        .expect("code exchange should succeed")
        .sealed_session
        .expect("sealing was requested");

    let handle = client.load_sealed_session(&sealed, COOKIE_PASSWORD);
    assert_eq!(handle.authenticate().await.reason(), Some(&FailureReason::Expired));

    mock.state.set_access_token_ttl(300);
    let refreshed = handle.refresh().await.expect("refresh should reach the provider");
    let new_sealed = match refreshed {
        RefreshResult::Refreshed {
            sealed_session,
            user,
        } => {
            assert_eq!(user.email, "grace@example.com");
            sealed_session
        }
        other => panic!("Expected refreshed session, got {other:?}"),
    };
    assert_ne!(new_sealed, sealed);

    let result = client
        .load_sealed_session(&new_sealed, COOKIE_PASSWORD)
        .authenticate()
        .await;
    assert!(result.is_authenticated());
    assert_eq!(mock.state.refresh_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_revoked_refresh_token_is_rejected() {
    let (mock, client, sealed) = signed_in().await;
    mock.state.revoke_refresh_tokens();

    let result = client
        .load_sealed_session(&sealed, COOKIE_PASSWORD)
        .refresh()
        .await
        .expect("the provider answered");
    assert_eq!(
        result,
        RefreshResult::Rejected(FailureReason::Other("invalid_grant".to_string()))
    );
}

#[tokio::test]
async fn test_provider_outage_during_refresh_is_an_error() {
    let (mock, client, sealed) = signed_in().await;
    mock.state.set_refresh_mode(RefreshMode::ServerError);

    let result = client
        .load_sealed_session(&sealed, COOKIE_PASSWORD)
        .refresh()
        .await;
    assert!(matches!(result, Err(ProviderError::Api { status: 500, .. })));
}

#[tokio::test]
async fn test_unreachable_provider_is_a_transport_error() {
    // Nothing listens on port 1
    let client =
        WorkosClient::new(&config_for("http://127.0.0.1:1")).expect("client should build");

    let result = client.authenticate_with_code("code_ok", &sealing()).await;
    assert!(matches!(result, Err(ProviderError::Transport(_))));
}

#[tokio::test]
async fn test_unreachable_jwks_reports_provider_unavailable() {
    let (_mock, _client, sealed) = signed_in().await;

    // Same cookie password, different (dead) provider
    let offline =
        WorkosClient::new(&config_for("http://127.0.0.1:1")).expect("client should build");
    let result = offline
        .load_sealed_session(&sealed, COOKIE_PASSWORD)
        .authenticate()
        .await;
    assert_eq!(result.reason(), Some(&FailureReason::ProviderUnavailable));
}

#[tokio::test]
async fn test_cookie_sealed_with_other_password_is_invalid() {
    let (_mock, client, sealed) = signed_in().await;

    let result = client
        .load_sealed_session(&sealed, "some-other-cookie-password-0123456789")
        .authenticate()
        .await;
    assert_eq!(result.reason(), Some(&FailureReason::InvalidSessionCookie));
}

#[tokio::test]
async fn test_logout_url_names_the_session() {
    let (mock, client, sealed) = signed_in().await;

    let url = client
        .load_sealed_session(&sealed, COOKIE_PASSWORD)
        .get_logout_url()
        .await
        .expect("authenticated session has a logout URL");
    assert_eq!(
        url,
        format!(
            "{}/user_management/sessions/logout?session_id=session_01",
            mock.base_url
        )
    );
}

#[tokio::test]
async fn test_authorization_url_points_at_provider() {
    let mock = MockWorkos::start().await;
    let client = WorkosClient::new(&config_for(&mock.base_url)).expect("client should build");

    let url = client
        .authorization_url(&AuthorizationUrlRequest {
            provider: AUTHKIT_PROVIDER.to_string(),
            redirect_uri: "http://localhost:3000/callback".to_string(),
            state: None,
        })
        .expect("url should build");
    assert!(url.starts_with(&format!("{}/user_management/authorize?", mock.base_url)));
    assert!(url.contains(&format!("client_id={MOCK_CLIENT_ID}")));
    assert!(url.contains("provider=authkit"));
}

#[tokio::test]
async fn test_jwks_outage_ends_at_login_instead_of_refreshing_again() {
    let (mock, client, sealed) = signed_in().await;
    mock.state.set_jwks_available(false);

    let decision = gate_request(&client, COOKIE_PASSWORD, Some(&sealed), "/account").await;

    assert_eq!(decision.state, GateState::RefreshFailed);
    assert_eq!(
        decision.action,
        GateAction::RedirectToLogin { clear_cookie: true }
    );
    assert_eq!(decision.cookie_directive(), Some(CookieDirective::Clear));
    assert_eq!(mock.state.refresh_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_jwks_outage_during_refresh_is_a_transport_error() {
    let (mock, client, sealed) = signed_in().await;
    mock.state.set_jwks_available(false);

    let result = client
        .load_sealed_session(&sealed, COOKIE_PASSWORD)
        .refresh()
        .await;
    assert!(matches!(result, Err(ProviderError::Transport(_))));
}

#[tokio::test]
async fn test_refresh_returning_expired_token_is_an_error() {
    let (mock, client, sealed) = signed_in().await;
    mock.state.set_access_token_ttl(-3600);

    let result = client
        .load_sealed_session(&sealed, COOKIE_PASSWORD)
        .refresh()
        .await;
    assert!(matches!(result, Err(ProviderError::Token(_))));
    assert_eq!(mock.state.refresh_requests.load(Ordering::SeqCst), 1);
}
