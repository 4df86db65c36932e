//! Error taxonomy for the authorization pipeline.

use authz_gate_sdk::DecisionClientError;
use handle_pool::PoolError;
use thiserror::Error;

/// Everything that can stop the pipeline short of an allow.
///
/// Every variant collapses to the same outward observable — HTTP 403 with
/// nothing else — so callers cannot probe policy internals. The variants
/// exist so operators can tell the failure modes apart in logs.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No access token could be extracted for the caller.
    #[error("no access token available for the caller")]
    TokenAbsent,

    /// The request path matches no route, or the match yields no usable
    /// resource identifier.
    #[error("request path resolves to no protected resource")]
    ResourceUnresolved,

    /// The HTTP method maps to no permission scope.
    #[error("no permission scope mapped for HTTP method {0}")]
    ScopeUnmapped(String),

    /// No decision-client handle became available.
    #[error("decision client pool exhausted")]
    PoolExhausted(#[source] PoolError),

    /// Talking to the authorization server failed.
    #[error("authorization check could not be completed: {0}")]
    RemoteCallFailed(String),

    /// The authorization server answered, and the answer was no.
    #[error("authorization server rejected the requested access")]
    DecisionRejected,
}

impl From<DecisionClientError> for DomainError {
    fn from(err: DecisionClientError) -> Self {
        match err {
            DecisionClientError::Denied => Self::DecisionRejected,
            DecisionClientError::Transport(_) | DecisionClientError::Protocol(_) => {
                Self::RemoteCallFailed(err.to_string())
            }
        }
    }
}
