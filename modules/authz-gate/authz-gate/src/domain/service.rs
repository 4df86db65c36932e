//! Per-request authorization pipeline.

use std::sync::Arc;

use arc_swap::ArcSwap;
use authz_gate_sdk::{AuthorizationRequest, DecisionClient, PermissionScope};
use handle_pool::{Pool, PoolError};

use crate::domain::DomainError;
use crate::principal::{AuthenticatedPrincipal, SessionTokenStore, extract_access_token};
use crate::routes::RouteTable;

/// Boxed decision client as leased out by the pool.
pub type PooledDecisionClient = Box<dyn DecisionClient>;

/// Sequences the authorization pipeline for each request and enforces
/// fail-closed semantics.
///
/// Safe for concurrent use: the pool is the only shared mutable state, and
/// a leased handle belongs to exactly one in-flight request.
pub struct Service {
    pool: Pool<PooledDecisionClient>,
    token_store: Arc<dyn SessionTokenStore>,
    routes: Arc<ArcSwap<RouteTable>>,
}

impl Service {
    #[must_use]
    pub fn new(
        pool: Pool<PooledDecisionClient>,
        token_store: Arc<dyn SessionTokenStore>,
        routes: Arc<ArcSwap<RouteTable>>,
    ) -> Self {
        Self {
            pool,
            token_store,
            routes,
        }
    }

    /// Run the full decision pipeline for one request.
    ///
    /// Single attempt, no retries: the first step that cannot complete
    /// becomes the error the caller denies with. The pooled handle is held
    /// across the remote calls and returned on every exit path, including
    /// errors.
    ///
    /// # Errors
    ///
    /// One [`DomainError`] per failure mode; see the variant docs. All of
    /// them must be surfaced to the caller as a plain denial.
    pub async fn authorize_request(
        &self,
        method: &str,
        path: &str,
        principal: &AuthenticatedPrincipal,
    ) -> Result<(), DomainError> {
        let client = self.pool.acquire().await.map_err(|e| match e {
            PoolError::CreateFailed(_) => DomainError::RemoteCallFailed(e.to_string()),
            PoolError::AcquireTimeout(_) | PoolError::Closed => DomainError::PoolExhausted(e),
        })?;

        let token = extract_access_token(principal, self.token_store.as_ref()).await?;

        let resource_id = self
            .routes
            .load()
            .resolve(path)
            .ok_or(DomainError::ResourceUnresolved)?;

        let scope = PermissionScope::from_http_method(method)
            .ok_or_else(|| DomainError::ScopeUnmapped(method.to_owned()))?;

        let request = AuthorizationRequest { resource_id, scope };

        let decision = client.authorize(&token, &request).await?;

        // The decision token proves nothing until the server stands behind
        // it under introspection.
        let introspection = client.introspect(&decision).await?;
        if !introspection.active {
            return Err(DomainError::DecisionRejected);
        }

        Ok(())
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}
