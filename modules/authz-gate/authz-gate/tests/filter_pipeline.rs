//! Full-pipeline tests: axum router + authorization middleware + mocked
//! decision clients behind a real handle pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use authz_gate::{
    AuthenticatedPrincipal, AuthzGateState, RouteEntry, RouteTable, Service, SessionTokenStore,
    StoredAccessToken, authz_middleware,
};
use authz_gate_sdk::{
    AuthorizationRequest, DecisionClient, DecisionClientError, DecisionToken, TokenIntrospection,
};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::any;
use handle_pool::{HandleFactory, Pool, PoolConfig};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// How the mock decision clients behave.
#[derive(Clone, Copy)]
enum Behavior {
    Allow,
    AllowSlow,
    Deny,
    TransportError,
}

/// Counters shared by every mock client the factory hands out.
#[derive(Default)]
struct Telemetry {
    authorize_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

struct MockClient {
    behavior: Behavior,
    telemetry: Arc<Telemetry>,
}

#[async_trait]
impl DecisionClient for MockClient {
    async fn authorize(
        &self,
        _access_token: &str,
        _request: &AuthorizationRequest,
    ) -> Result<DecisionToken, DecisionClientError> {
        self.telemetry.authorize_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.telemetry.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.telemetry
            .peak_in_flight
            .fetch_max(current, Ordering::SeqCst);

        let result = match self.behavior {
            Behavior::Allow => Ok(DecisionToken::new("rpt".to_owned())),
            Behavior::AllowSlow => {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(DecisionToken::new("rpt".to_owned()))
            }
            Behavior::Deny => Err(DecisionClientError::Denied),
            Behavior::TransportError => {
                Err(DecisionClientError::Transport("connection reset".to_owned()))
            }
        };

        self.telemetry.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn introspect(
        &self,
        _token: &DecisionToken,
    ) -> Result<TokenIntrospection, DecisionClientError> {
        Ok(TokenIntrospection { active: true })
    }
}

struct MockFactory {
    behavior: Behavior,
    telemetry: Arc<Telemetry>,
}

#[async_trait]
impl HandleFactory<Box<dyn DecisionClient>> for MockFactory {
    async fn create(&self) -> anyhow::Result<Box<dyn DecisionClient>> {
        Ok(Box::new(MockClient {
            behavior: self.behavior,
            telemetry: self.telemetry.clone(),
        }))
    }
}

struct StaticStore(Option<StoredAccessToken>);

#[async_trait]
impl SessionTokenStore for StaticStore {
    async fn load_token(
        &self,
        _registration_id: &str,
        _principal_name: &str,
    ) -> Option<StoredAccessToken> {
        self.0.clone()
    }
}

struct App {
    router: Router,
    pool: Pool<Box<dyn DecisionClient>>,
    telemetry: Arc<Telemetry>,
    routed: Arc<AtomicUsize>,
}

fn app(behavior: Behavior, max_total: usize, stored: Option<StoredAccessToken>) -> App {
    let telemetry = Arc::new(Telemetry::default());
    let pool = Pool::new(
        PoolConfig {
            max_total,
            acquire_timeout: None,
        },
        MockFactory {
            behavior,
            telemetry: telemetry.clone(),
        },
    );
    let routes = Arc::new(ArcSwap::from_pointee(RouteTable::new(vec![RouteEntry {
        prefix: "/api/".to_owned(),
        service_id: "core-banking".to_owned(),
    }])));
    let service = Service::new(pool.clone(), Arc::new(StaticStore(stored)), routes);
    let state = AuthzGateState::new(Arc::new(service));

    let routed = Arc::new(AtomicUsize::new(0));
    let downstream = routed.clone();
    let router = Router::new()
        .route(
            "/{*rest}",
            any(move || {
                let downstream = downstream.clone();
                async move {
                    downstream.fetch_add(1, Ordering::SeqCst);
                    "routed"
                }
            }),
        )
        .layer(axum::middleware::from_fn_with_state(state, authz_middleware));

    App {
        router,
        pool,
        telemetry,
        routed,
    }
}

fn request(method: &str, path: &str, principal: Option<AuthenticatedPrincipal>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(principal) = principal {
        builder = builder.extension(principal);
    }
    builder.body(Body::empty()).unwrap()
}

fn bearer(token: &str) -> Option<AuthenticatedPrincipal> {
    Some(AuthenticatedPrincipal::Bearer {
        token: token.to_owned(),
    })
}

#[tokio::test]
async fn authorized_request_reaches_the_backend_untouched() {
    let app = app(Behavior::Allow, 2, None);

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/accounts/123", bearer("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.routed.load(Ordering::SeqCst), 1);
    assert_eq!(app.telemetry.authorize_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn denial_is_a_bare_403_and_suppresses_routing() {
    let app = app(Behavior::Deny, 2, None);

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/accounts/123", bearer("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    // Uniform denial surface: no body, no detail.
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());
    assert_eq!(app.routed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_principal_denies() {
    let app = app(Behavior::Allow, 2, None);

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/accounts/123", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.routed.load(Ordering::SeqCst), 0);
    // Denied before any remote call was attempted.
    assert_eq!(app.telemetry.authorize_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn session_principal_without_stored_token_denies() {
    let app = app(Behavior::Allow, 2, None);
    let principal = Some(AuthenticatedPrincipal::Session {
        registration_id: "oidc".to_owned(),
        name: "alice".to_owned(),
    });

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/accounts/123", principal))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn session_principal_with_stored_token_is_allowed() {
    let stored = StoredAccessToken {
        value: "stored-token".to_owned(),
        token_type: "Bearer".to_owned(),
        expires_at: None,
    };
    let app = app(Behavior::Allow, 2, Some(stored));
    let principal = Some(AuthenticatedPrincipal::Session {
        registration_id: "oidc".to_owned(),
        name: "alice".to_owned(),
    });

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/accounts/123", principal))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unroutable_path_denies() {
    let app = app(Behavior::Allow, 2, None);

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/elsewhere/accounts/123", bearer("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.telemetry.authorize_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unmapped_method_denies() {
    let app = app(Behavior::Allow, 2, None);

    let response = app
        .router
        .clone()
        .oneshot(request("PATCH", "/api/accounts/123", bearer("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.telemetry.authorize_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn transport_error_denies_and_returns_the_handle() {
    let app = app(Behavior::TransportError, 2, None);

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/accounts/123", bearer("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.routed.load(Ordering::SeqCst), 0);
    // The handle survived the failed call and is idle again.
    assert_eq!(app.pool.idle_len(), 1);
}

#[tokio::test]
async fn burst_beyond_pool_capacity_blocks_instead_of_denying() {
    // min_idle=2 sizing: hard cap of 4 handles for 5 concurrent requests.
    let app = app(Behavior::AllowSlow, 4, None);

    let call = |app: &App| {
        let router = app.router.clone();
        async move {
            router
                .oneshot(request("GET", "/api/accounts/123", bearer("abc")))
                .await
                .unwrap()
        }
    };

    let (r1, r2, r3, r4, r5) = tokio::join!(
        call(&app),
        call(&app),
        call(&app),
        call(&app),
        call(&app)
    );

    // Nobody was denied for pool pressure alone.
    for response in [r1, r2, r3, r4, r5] {
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(app.routed.load(Ordering::SeqCst), 5);
    assert_eq!(app.telemetry.authorize_calls.load(Ordering::SeqCst), 5);
    // The fifth caller waited for a handle rather than growing the pool.
    assert!(app.telemetry.peak_in_flight.load(Ordering::SeqCst) <= 4);
    assert!(app.pool.idle_len() <= 4);
}
