//! Client trait for the remote policy server.

use async_trait::async_trait;

use crate::error::DecisionClientError;
use crate::models::{AuthorizationRequest, DecisionToken, TokenIntrospection};

/// Handle used to ask the remote policy server for an authorization decision
/// and to introspect the resulting decision token.
///
/// Handles are stateful and meant to be leased to one in-flight request at a
/// time (the gate pools them); implementations only need `Send + Sync`, not
/// internal per-request synchronization.
#[async_trait]
pub trait DecisionClient: Send + Sync {
    /// Ask the policy server whether the caller behind `access_token` may
    /// perform the requested operation.
    ///
    /// A successful answer is a decision token that must still be
    /// introspected before it is trusted.
    ///
    /// # Errors
    ///
    /// - `Denied` when the server explicitly refuses the permission
    /// - `Transport` when the server cannot be reached
    /// - `Protocol` when the server answers outside the expected protocol
    async fn authorize(
        &self,
        access_token: &str,
        request: &AuthorizationRequest,
    ) -> Result<DecisionToken, DecisionClientError>;

    /// Introspect a decision token previously returned by
    /// [`authorize`](Self::authorize).
    ///
    /// # Errors
    ///
    /// - `Transport` when the server cannot be reached
    /// - `Protocol` when the server answers outside the expected protocol
    async fn introspect(
        &self,
        token: &DecisionToken,
    ) -> Result<TokenIntrospection, DecisionClientError>;
}
