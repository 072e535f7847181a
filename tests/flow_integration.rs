//! Integration tests for the authorization handshake and the API facade.
//!
//! Every capability is scripted: `MockTransport` for HTTP, `ScriptedConsent`
//! for the user, `MemorySecretStore` for persistence.

use std::sync::Arc;

use birdhouse::api::{ApiEndpoints, ApiError, BirdHouse, TimelineQuery};
use birdhouse::auth::{
    AuthConfig, AuthError, AuthStatus, AuthorizationState, Authorizer, ConsentOutcome,
    CredentialStore, DeauthStatus, ScriptedConsent, DEFAULT_RECORD_NAME,
};
use birdhouse::oauth::ConsumerCredentials;
use birdhouse::secrets::{FailOn, MemorySecretStore, SecretStore};
use birdhouse::transport::mock::MockTransport;
use birdhouse::transport::{HttpMethod, TransportError, AUTHORIZATION};

// =============================================================================
// Test Fixtures
// =============================================================================

const RT_URL: &str = "https://api.example.com/oauth/request_token";
const AUTH_URL: &str = "https://api.example.com/oauth/authorize";
const AT_URL: &str = "https://api.example.com/oauth/access_token";
const HOME: &str = "https://api.example.com/1.1/statuses/home_timeline.json";
const UPDATE: &str = "https://api.example.com/1.1/statuses/update.json";

const RT_BODY: &str = "oauth_token=RT&oauth_token_secret=RS&oauth_callback_confirmed=true";
const AT_BODY: &str = "oauth_token=AT&oauth_token_secret=AS&user_id=42&screen_name=bird";

struct Harness {
    transport: MockTransport,
    consent: ScriptedConsent,
    memory: MemorySecretStore,
}

impl Harness {
    fn new() -> Self {
        Self {
            transport: MockTransport::new(),
            consent: ScriptedConsent::new(),
            memory: MemorySecretStore::new(),
        }
    }

    fn birdhouse(&self) -> BirdHouse {
        let authorizer = Authorizer::new(
            AuthConfig {
                request_token_url: RT_URL.into(),
                authorize_url: AUTH_URL.into(),
                access_token_url: AT_URL.into(),
                callback_url: Some("oob".into()),
            },
            ConsumerCredentials::new("CK", "CS"),
            Arc::new(self.transport.clone()),
            Arc::new(self.consent.clone()),
            CredentialStore::new(Arc::new(self.memory.clone())),
        );
        BirdHouse::new(
            authorizer,
            ApiEndpoints {
                home_timeline: HOME.into(),
                update_status: UPDATE.into(),
            },
        )
    }

    fn script_handshake(&self) {
        self.transport
            .respond(HttpMethod::Post, RT_URL, 200, RT_BODY)
            .respond(HttpMethod::Post, AT_URL, 200, AT_BODY);
        self.consent.push(ConsentOutcome::Redirected(
            "oob://callback?oauth_token=RT&oauth_verifier=V1".into(),
        ));
    }

    fn persisted(&self) -> Option<Vec<u8>> {
        self.memory.read(DEFAULT_RECORD_NAME).expect("read record")
    }
}

fn assert_clean_failure(harness: &Harness, birdhouse: &BirdHouse) {
    assert_eq!(birdhouse.state(), AuthorizationState::Unauthorized);
    assert!(!birdhouse.is_authorized());
    assert!(birdhouse.authorizer().credentials().request_token().is_none());
    assert!(birdhouse.authorizer().credentials().verifier().is_none());
    assert!(birdhouse.authorizer().credentials().access_token().is_none());
    assert!(harness.persisted().is_none());
}

// =============================================================================
// Handshake
// =============================================================================

#[tokio::test]
async fn handshake_persists_then_authorizes() {
    let harness = Harness::new();
    harness.script_handshake();
    let mut birdhouse = harness.birdhouse();

    let status = birdhouse.authorize().await.expect("authorize");

    assert_eq!(status, AuthStatus::Authorized);
    assert_eq!(birdhouse.state(), AuthorizationState::Authorized);
    assert_eq!(birdhouse.screen_name(), Some("bird"));

    let record: serde_json::Value =
        serde_json::from_slice(&harness.persisted().expect("persisted")).expect("json");
    assert_eq!(record["access_token"], "AT");
    assert_eq!(record["access_token_secret"], "AS");

    assert_eq!(
        harness.consent.shown(),
        vec![format!("{}?oauth_token=RT", AUTH_URL)]
    );
    assert_eq!(harness.transport.pending(), 0);
}

#[tokio::test]
async fn request_token_leg_uses_query_rendering() {
    let harness = Harness::new();
    harness.script_handshake();
    let mut birdhouse = harness.birdhouse();
    birdhouse.authorize().await.expect("authorize");

    let request = &harness.transport.requests_to(RT_URL)[0];
    assert!(request.header(AUTHORIZATION).is_none());
    assert!(request.url.contains("oauth_callback=oob"));
    assert!(request.url.contains("oauth_consumer_key=CK"));
    assert!(request.url.contains("oauth_signature="));
    assert!(!request.url.contains("oauth_token="));
}

#[tokio::test]
async fn access_token_leg_signs_with_request_token_and_verifier() {
    let harness = Harness::new();
    harness.script_handshake();
    let mut birdhouse = harness.birdhouse();
    birdhouse.authorize().await.expect("authorize");

    let request = &harness.transport.requests_to(AT_URL)[0];
    let header = request.header(AUTHORIZATION).expect("authorization header");
    assert!(header.starts_with("OAuth "));
    assert!(header.contains("oauth_token=\"RT\""));
    assert!(header.contains("oauth_verifier=\"V1\""));
    assert!(!header.contains("oauth_callback"));
}

#[tokio::test]
async fn request_token_leg_failure() {
    let harness = Harness::new();
    harness
        .transport
        .fail(HttpMethod::Post, RT_URL, TransportError::Timeout);
    let mut birdhouse = harness.birdhouse();

    let err = birdhouse.authorize().await.unwrap_err();

    assert_eq!(err, AuthError::Transport(TransportError::Timeout));
    assert!(err.is_transient());
    assert!(harness.consent.shown().is_empty());
    assert_clean_failure(&harness, &birdhouse);
}

#[tokio::test]
async fn request_token_response_without_pair() {
    let harness = Harness::new();
    harness
        .transport
        .respond(HttpMethod::Post, RT_URL, 200, "oauth_callback_confirmed=true");
    let mut birdhouse = harness.birdhouse();

    let err = birdhouse.authorize().await.unwrap_err();

    assert!(matches!(err, AuthError::Protocol(_)));
    assert!(err.needs_reauth());
    assert_clean_failure(&harness, &birdhouse);
}

#[tokio::test]
async fn consent_denied() {
    let harness = Harness::new();
    harness
        .transport
        .respond(HttpMethod::Post, RT_URL, 200, RT_BODY);
    harness.consent.push(ConsentOutcome::Denied);
    let mut birdhouse = harness.birdhouse();

    let err = birdhouse.authorize().await.unwrap_err();

    assert_eq!(err, AuthError::ConsentDenied);
    assert!(harness.transport.requests_to(AT_URL).is_empty());
    assert_clean_failure(&harness, &birdhouse);
}

#[tokio::test]
async fn redirect_with_foreign_token_is_denial() {
    let harness = Harness::new();
    harness
        .transport
        .respond(HttpMethod::Post, RT_URL, 200, RT_BODY);
    harness.consent.push(ConsentOutcome::Redirected(
        "oob://callback?oauth_token=SOMEONE_ELSE&oauth_verifier=V1".into(),
    ));
    let mut birdhouse = harness.birdhouse();

    let err = birdhouse.authorize().await.unwrap_err();

    assert_eq!(err, AuthError::ConsentDenied);
    assert!(harness.transport.requests_to(AT_URL).is_empty());
    assert_clean_failure(&harness, &birdhouse);
}

#[tokio::test]
async fn pin_outcome_is_accepted() {
    let harness = Harness::new();
    harness
        .transport
        .respond(HttpMethod::Post, RT_URL, 200, RT_BODY)
        .respond(HttpMethod::Post, AT_URL, 200, AT_BODY);
    harness.consent.push(ConsentOutcome::Pin(" 9876543 ".into()));
    let mut birdhouse = harness.birdhouse();

    birdhouse.authorize().await.expect("authorize");

    let request = &harness.transport.requests_to(AT_URL)[0];
    let header = request.header(AUTHORIZATION).expect("authorization header");
    assert!(header.contains("oauth_verifier=\"9876543\""));
}

#[tokio::test]
async fn access_token_leg_rejected() {
    let harness = Harness::new();
    harness
        .transport
        .respond(HttpMethod::Post, RT_URL, 200, RT_BODY)
        .respond(HttpMethod::Post, AT_URL, 401, "Invalid verifier");
    harness.consent.push(ConsentOutcome::Redirected(
        "oob://callback?oauth_token=RT&oauth_verifier=V1".into(),
    ));
    let mut birdhouse = harness.birdhouse();

    let err = birdhouse.authorize().await.unwrap_err();

    assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
    assert!(err.needs_reauth());
    assert!(!err.is_transient());
    assert_clean_failure(&harness, &birdhouse);
}

#[tokio::test]
async fn request_token_leg_rejected() {
    let harness = Harness::new();
    harness
        .transport
        .respond(HttpMethod::Post, RT_URL, 401, "Failed to validate oauth signature\n");
    let mut birdhouse = harness.birdhouse();

    let err = birdhouse.authorize().await.unwrap_err();

    match &err {
        AuthError::Rejected { leg, status, body } => {
            assert_eq!(*leg, "request-token");
            assert_eq!(*status, 401);
            assert_eq!(body, "Failed to validate oauth signature");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.status(), Some(401));
    assert!(!err.is_transient());
    assert!(!err.needs_reauth());
    assert!(harness.transport.requests_to(AT_URL).is_empty());
    assert_clean_failure(&harness, &birdhouse);
}

#[tokio::test]
async fn request_token_leg_unavailable_is_transient() {
    let harness = Harness::new();
    harness
        .transport
        .respond(HttpMethod::Post, RT_URL, 503, "over capacity");
    let mut birdhouse = harness.birdhouse();

    let err = birdhouse.authorize().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.is_transient());
    assert_clean_failure(&harness, &birdhouse);
}

#[tokio::test]
async fn persist_failure_leaves_unauthorized() {
    let harness = Harness::new();
    harness.script_handshake();
    harness.memory.fail_on(FailOn::Write);
    let mut birdhouse = harness.birdhouse();

    let err = birdhouse.authorize().await.unwrap_err();

    assert!(matches!(err, AuthError::Persistence(_)));
    harness.memory.clear_failure();
    assert_clean_failure(&harness, &birdhouse);
}

#[tokio::test]
async fn retry_after_failure_runs_fresh_handshake() {
    let harness = Harness::new();
    harness
        .transport
        .fail(HttpMethod::Post, RT_URL, TransportError::Network("reset".into()));
    let mut birdhouse = harness.birdhouse();
    assert!(birdhouse.authorize().await.is_err());

    harness.script_handshake();
    let status = birdhouse.authorize().await.expect("second attempt");

    assert_eq!(status, AuthStatus::Authorized);
    assert_eq!(harness.transport.requests_to(RT_URL).len(), 2);
}

#[tokio::test]
async fn new_session_restores_persisted_token() {
    let harness = Harness::new();
    harness.script_handshake();
    harness.birdhouse().authorize().await.expect("authorize");

    let mut second = harness.birdhouse();
    assert!(second.is_authorized());
    assert_eq!(
        second.authorize().await.expect("authorize"),
        AuthStatus::AlreadyAuthorized
    );
    assert_eq!(harness.transport.requests_to(RT_URL).len(), 1);
}

#[tokio::test]
async fn deauthorize_removes_record() {
    let harness = Harness::new();
    harness.script_handshake();
    let mut birdhouse = harness.birdhouse();
    birdhouse.authorize().await.expect("authorize");

    assert_eq!(birdhouse.deauthorize(), DeauthStatus::Deauthorized);
    assert!(!birdhouse.is_authorized());
    assert!(harness.persisted().is_none());
    assert_eq!(birdhouse.deauthorize(), DeauthStatus::AlreadyDeauthorized);
}

#[tokio::test]
async fn deauthorize_survives_delete_failure() {
    let harness = Harness::new();
    harness.script_handshake();
    let mut birdhouse = harness.birdhouse();
    birdhouse.authorize().await.expect("authorize");

    harness.memory.fail_on(FailOn::Delete);
    assert_eq!(birdhouse.deauthorize(), DeauthStatus::Deauthorized);
    assert_eq!(birdhouse.state(), AuthorizationState::Unauthorized);
}

// =============================================================================
// API calls
// =============================================================================

#[tokio::test]
async fn call_authorizes_first() {
    let harness = Harness::new();
    harness.script_handshake();
    harness
        .transport
        .respond(HttpMethod::Get, HOME, 200, r#"[{"id_str":"1","text":"hi"}]"#);
    let mut birdhouse = harness.birdhouse();

    let timeline = birdhouse
        .get_timeline(&TimelineQuery {
            count: Some(2),
            ..Default::default()
        })
        .await
        .expect("timeline");

    assert_eq!(timeline.len(), 1);
    assert!(birdhouse.is_authorized());

    let urls: Vec<String> = harness
        .transport
        .requests()
        .iter()
        .map(|r| r.url_without_query().to_string())
        .collect();
    assert_eq!(urls, vec![RT_URL, AT_URL, HOME]);

    let api_request = &harness.transport.requests_to(HOME)[0];
    assert!(api_request.url.ends_with("?count=2"));
    let header = api_request.header(AUTHORIZATION).expect("authorization header");
    assert!(header.contains("oauth_token=\"AT\""));
}

#[tokio::test]
async fn call_with_denied_consent_never_reaches_api() {
    let harness = Harness::new();
    harness
        .transport
        .respond(HttpMethod::Post, RT_URL, 200, RT_BODY);
    harness.consent.push(ConsentOutcome::Denied);
    let mut birdhouse = harness.birdhouse();

    let err = birdhouse
        .call(HOME, HttpMethod::Get, &[])
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::Auth(AuthError::ConsentDenied));
    assert!(harness.transport.requests_to(HOME).is_empty());
}

#[tokio::test]
async fn unauthorized_response_keeps_session() {
    let harness = Harness::new();
    harness.script_handshake();
    harness
        .transport
        .respond(HttpMethod::Post, UPDATE, 401, r#"{"errors":[{"code":89}]}"#);
    let mut birdhouse = harness.birdhouse();

    let err = birdhouse.post_status("hello").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(birdhouse.state(), AuthorizationState::Authorized);
    assert!(harness.persisted().is_some());
    assert_eq!(harness.transport.requests_to(RT_URL).len(), 1);
}

#[tokio::test]
async fn invalid_status_fails_before_any_io() {
    let harness = Harness::new();
    let mut birdhouse = harness.birdhouse();

    let too_long = "x".repeat(281);
    for text in ["", "   ", too_long.as_str()] {
        let err = birdhouse.post_status(text).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidStatus(_)), "{:?}", text);
    }

    assert!(harness.transport.requests().is_empty());
    assert!(harness.consent.shown().is_empty());
}
