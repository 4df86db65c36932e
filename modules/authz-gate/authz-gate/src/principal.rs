//! Caller identity variants and access-token extraction.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::domain::DomainError;

/// Authenticated caller identity, attached to the request by the identity
/// layer before this filter runs.
///
/// The gate never authenticates anybody; it only reads, once per request,
/// the token whichever authentication mechanism produced.
#[derive(Debug, Clone)]
pub enum AuthenticatedPrincipal {
    /// Login-session identity. The access token is not on the request; it
    /// lives in the session token store under `(registration_id, name)`.
    Session {
        /// Client registration the login ran against.
        registration_id: String,
        /// Principal name within that registration.
        name: String,
    },
    /// The caller presented the bearer token directly on the request.
    Bearer {
        /// Raw bearer token value.
        token: String,
    },
    /// Any principal the gate does not know how to extract a token from.
    /// Kept as an explicit arm so new identity mechanisms deny loudly
    /// instead of silently yielding no token.
    Unsupported,
}

/// Access token as stored by the identity layer for session-backed logins.
#[derive(Debug, Clone)]
pub struct StoredAccessToken {
    /// The bearer token value.
    pub value: String,
    /// Token type as issued, typically `Bearer`.
    pub token_type: String,
    /// Expiry recorded at issue/refresh time. Carried for operability only;
    /// the decision path does not consult it — the authorization server is
    /// the authority on token validity.
    pub expires_at: Option<OffsetDateTime>,
}

/// Read-side interface to the session/token store owned by the identity
/// collaborator.
#[async_trait]
pub trait SessionTokenStore: Send + Sync {
    /// Look up the stored access token for a session-backed login.
    ///
    /// `None` means no authorized client is stored for the key — the token
    /// expired or the login never completed.
    async fn load_token(
        &self,
        registration_id: &str,
        principal_name: &str,
    ) -> Option<StoredAccessToken>;
}

/// Extract the caller's access token from whichever authentication
/// representation produced it.
///
/// Session-backed principals go through the token store; bearer principals
/// carry the token themselves and never touch the store.
///
/// # Errors
///
/// [`DomainError::TokenAbsent`] when the principal carries no extractable
/// token: a session login with nothing stored, or an unsupported variant.
pub async fn extract_access_token(
    principal: &AuthenticatedPrincipal,
    store: &dyn SessionTokenStore,
) -> Result<String, DomainError> {
    match principal {
        AuthenticatedPrincipal::Session {
            registration_id,
            name,
        } => store
            .load_token(registration_id, name)
            .await
            .map(|token| token.value)
            .ok_or(DomainError::TokenAbsent),
        AuthenticatedPrincipal::Bearer { token } => Ok(token.clone()),
        AuthenticatedPrincipal::Unsupported => Err(DomainError::TokenAbsent),
    }
}
