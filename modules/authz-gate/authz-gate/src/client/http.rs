//! HTTP decision client speaking the authorization server's UMA grant flow.

use std::time::Duration;

use async_trait::async_trait;
use authz_gate_sdk::{
    AuthorizationRequest, DecisionClient, DecisionClientError, DecisionToken, TokenIntrospection,
};
use handle_pool::HandleFactory;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::IssuerEndpoints;
use crate::domain::PooledDecisionClient;

const UMA_TICKET_GRANT: &str = "urn:ietf:params:oauth:grant-type:uma-ticket";
const RPT_TOKEN_HINT: &str = "requesting_party_token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Successful token-endpoint answer carrying the requesting-party token.
#[derive(Debug, Deserialize)]
struct RptResponse {
    access_token: String,
}

/// Decision client backed by the authorization server's HTTP endpoints.
///
/// One instance per pooled handle, built once by the factory from static
/// configuration. `authorize` exchanges the caller's token for a
/// requesting-party token through the UMA grant; `introspect` verifies that
/// token with the gate's own client credentials.
pub struct UmaDecisionClient {
    http: reqwest::Client,
    endpoints: IssuerEndpoints,
    client_id: String,
    client_secret: SecretString,
}

impl UmaDecisionClient {
    /// Build a client against the given endpoints.
    ///
    /// # Errors
    ///
    /// When the underlying HTTP client cannot be constructed.
    pub fn new(
        endpoints: IssuerEndpoints,
        client_id: String,
        client_secret: SecretString,
    ) -> Result<Self, DecisionClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DecisionClientError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoints,
            client_id,
            client_secret,
        })
    }
}

#[async_trait]
impl DecisionClient for UmaDecisionClient {
    async fn authorize(
        &self,
        access_token: &str,
        request: &AuthorizationRequest,
    ) -> Result<DecisionToken, DecisionClientError> {
        let permission = request.permission();
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .bearer_auth(access_token)
            .form(&[
                ("grant_type", UMA_TICKET_GRANT),
                ("audience", self.client_id.as_str()),
                ("permission", permission.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DecisionClientError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(DecisionClientError::Denied);
        }
        if !status.is_success() {
            return Err(DecisionClientError::Protocol(format!(
                "token endpoint answered {status}"
            )));
        }

        let rpt: RptResponse = response
            .json()
            .await
            .map_err(|e| DecisionClientError::Protocol(e.to_string()))?;
        Ok(DecisionToken::new(rpt.access_token))
    }

    async fn introspect(
        &self,
        token: &DecisionToken,
    ) -> Result<TokenIntrospection, DecisionClientError> {
        let response = self
            .http
            .post(&self.endpoints.introspection_url)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&[
                ("token_type_hint", RPT_TOKEN_HINT),
                ("token", token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DecisionClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DecisionClientError::Protocol(format!(
                "introspection endpoint answered {status}"
            )));
        }

        response
            .json::<TokenIntrospection>()
            .await
            .map_err(|e| DecisionClientError::Protocol(e.to_string()))
    }
}

/// Builds ready-to-use decision clients for the handle pool.
///
/// Holds static configuration only; nothing here runs per request, and
/// handles need no reset when they come back to the pool.
pub struct UmaClientFactory {
    endpoints: IssuerEndpoints,
    client_id: String,
    client_secret: SecretString,
}

impl UmaClientFactory {
    #[must_use]
    pub fn new(endpoints: IssuerEndpoints, client_id: String, client_secret: SecretString) -> Self {
        Self {
            endpoints,
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl HandleFactory<PooledDecisionClient> for UmaClientFactory {
    async fn create(&self) -> anyhow::Result<PooledDecisionClient> {
        let client = UmaDecisionClient::new(
            self.endpoints.clone(),
            self.client_id.clone(),
            self.client_secret.clone(),
        )?;
        Ok(Box::new(client))
    }
}
