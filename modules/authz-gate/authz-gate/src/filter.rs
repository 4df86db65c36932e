//! Pre-routing authorization filter.
//!
//! The filter runs on every request, after the identity layer has attached
//! the caller's [`AuthenticatedPrincipal`] and before the proxy picks a
//! backend — mount it last among the pre-routing layers. On denial it
//! answers `403 Forbidden` and the request never reaches routing; on
//! approval it forwards the request untouched.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use handle_pool::{Pool, PoolConfig};

use crate::client::UmaClientFactory;
use crate::config::{AuthzGateConfig, IssuerEndpoints};
use crate::domain::Service;
use crate::principal::{AuthenticatedPrincipal, SessionTokenStore};
use crate::routes::RouteTable;

/// Shared state for the authorization middleware.
#[derive(Clone)]
pub struct AuthzGateState {
    service: Arc<Service>,
}

impl AuthzGateState {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }

    /// Wire the full gate from configuration: issuer endpoints, client
    /// factory, bounded handle pool, and the pipeline service.
    ///
    /// Nothing here touches the network; decision clients are created
    /// lazily once requests arrive.
    ///
    /// # Errors
    ///
    /// Configuration errors only, e.g. a malformed issuer URL.
    pub fn from_config(
        cfg: &AuthzGateConfig,
        token_store: Arc<dyn SessionTokenStore>,
        routes: Arc<ArcSwap<RouteTable>>,
    ) -> anyhow::Result<Self> {
        let endpoints = IssuerEndpoints::parse(&cfg.issuer_url)?;
        let factory =
            UmaClientFactory::new(endpoints, cfg.client_id.clone(), cfg.client_secret.clone());
        let pool = Pool::new(
            PoolConfig {
                max_total: cfg.pool.max_total(),
                acquire_timeout: cfg.pool.acquire_timeout(),
            },
            factory,
        );
        Ok(Self::new(Arc::new(Service::new(pool, token_store, routes))))
    }
}

/// Authorization middleware enforcing the decision pipeline on every request.
///
/// For each request:
/// 1. Reads the [`AuthenticatedPrincipal`] extension (absent counts as
///    unsupported)
/// 2. Runs the decision pipeline against the remote authorization server
/// 3. Forwards the request unchanged on approval; answers `403 Forbidden`
///    and drops the request on denial — every pipeline failure mode denies
pub async fn authz_middleware(
    State(state): State<AuthzGateState>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().as_str().to_owned();
    let path = req.uri().path().to_owned();
    let principal = req
        .extensions()
        .get::<AuthenticatedPrincipal>()
        .cloned()
        .unwrap_or(AuthenticatedPrincipal::Unsupported);

    match state
        .service
        .authorize_request(&method, &path, &principal)
        .await
    {
        Ok(()) => {
            tracing::debug!(endpoint = %path, "access control: authorized access");
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!(endpoint = %path, error = ?err, "access control: denied access");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}
