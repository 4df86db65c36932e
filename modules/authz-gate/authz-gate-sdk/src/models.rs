//! Domain models for the authorization decision pipeline.

use serde::{Deserialize, Serialize};

/// Abstract action category a request attempts against a resource.
///
/// The wire form is the upper-case scope name the policy server stores
/// permissions under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionScope {
    Create,
    Update,
    View,
    Delete,
}

impl PermissionScope {
    /// Map an HTTP method to its permission scope.
    ///
    /// Pure and case-insensitive. Methods outside POST/PUT/GET/DELETE have
    /// no mapping; callers must treat `None` as a denial, never as a scope.
    #[must_use]
    pub fn from_http_method(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "POST" => Some(Self::Create),
            "PUT" => Some(Self::Update),
            "GET" => Some(Self::View),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Wire name of the scope.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::View => "VIEW",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for PermissionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission check sent to the policy server.
///
/// Built fresh for every request and never reused across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Logical name of the protected entity, derived from the request path.
    pub resource_id: String,
    /// Action category the caller is attempting.
    pub scope: PermissionScope,
}

impl AuthorizationRequest {
    /// `resource#SCOPE` permission form understood by the policy server.
    #[must_use]
    pub fn permission(&self) -> String {
        format!("{}#{}", self.resource_id, self.scope)
    }
}

/// Opaque decision token returned by a successful `authorize` call.
///
/// Not proof of anything on its own — it must be introspected before the
/// decision is trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionToken(String);

impl DecisionToken {
    #[must_use]
    pub fn new(raw: String) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Introspection outcome for a decision token.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TokenIntrospection {
    /// Whether the policy server still stands behind the decision.
    pub active: bool,
}
