//! Configuration for the authz gate.

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Gate configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthzGateConfig {
    /// Issuer endpoint of the authorization server, e.g.
    /// `https://sso.example.com/auth/realms/payments`.
    pub issuer_url: String,

    /// Client the gate authenticates as when talking to the server.
    pub client_id: String,

    /// Client secret for the introspection endpoint.
    pub client_secret: SecretString,

    /// Decision-client pool sizing.
    #[serde(default)]
    pub pool: PoolSizing,
}

/// Decision-client pool sizing knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSizing {
    /// Idle handle count the pool is sized around. The hard cap is twice
    /// this value, the proportion needed to absorb request bursts while
    /// bounding the remote-client footprint.
    pub min_idle: usize,

    /// Optional deadline in milliseconds for waiting on a free handle.
    /// Unset means a saturated pool blocks the request until a handle is
    /// returned.
    pub acquire_timeout_ms: Option<u64>,
}

impl Default for PoolSizing {
    fn default() -> Self {
        Self {
            min_idle: 4,
            acquire_timeout_ms: None,
        }
    }
}

impl PoolSizing {
    /// Hard cap on concurrently outstanding handles.
    #[must_use]
    pub fn max_total(&self) -> usize {
        self.min_idle * 2
    }

    #[must_use]
    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout_ms.map(Duration::from_millis)
    }
}

/// Authorization-server endpoints derived from the issuer URL.
///
/// The issuer carries both the server base and the realm in its path: the
/// realm is the last path segment, the server base keeps only the first.
/// `https://sso.example.com/auth/realms/payments` decomposes into base
/// `https://sso.example.com/auth` and realm `payments`.
#[derive(Debug, Clone)]
pub struct IssuerEndpoints {
    /// Token endpoint the permission grant is posted to.
    pub token_url: String,
    /// Introspection endpoint decision tokens are verified against.
    pub introspection_url: String,
}

impl IssuerEndpoints {
    /// Decompose an issuer URL into the token and introspection endpoints.
    ///
    /// # Errors
    ///
    /// When the issuer URL does not parse or carries no path segments to
    /// derive the realm and server base from.
    pub fn parse(issuer_url: &str) -> anyhow::Result<Self> {
        let url = Url::parse(issuer_url)?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|path| path.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let (Some(first), Some(realm)) = (segments.first(), segments.last()) else {
            anyhow::bail!("issuer URL `{issuer_url}` has no path to derive realm and server base");
        };

        let base = format!("{}://{}/{first}", url.scheme(), url.authority());
        Ok(Self {
            token_url: format!("{base}/realms/{realm}/protocol/openid-connect/token"),
            introspection_url: format!(
                "{base}/realms/{realm}/protocol/openid-connect/token/introspect"
            ),
        })
    }
}
