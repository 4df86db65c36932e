//! Error types for decision clients.

use thiserror::Error;

/// Failure modes of a remote decision-client call.
#[derive(Debug, Error)]
pub enum DecisionClientError {
    /// The policy server could not be reached.
    #[error("transport error talking to the authorization server: {0}")]
    Transport(String),

    /// The policy server answered outside the expected protocol.
    #[error("unexpected response from the authorization server: {0}")]
    Protocol(String),

    /// The policy server explicitly refused the requested permissions.
    #[error("authorization server denied the requested permissions")]
    Denied,
}
