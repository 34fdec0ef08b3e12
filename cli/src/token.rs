//! OAuth2 client-credentials token provider.
//!
//! Posts `grant_type=client_credentials` as a form to
//! `{authority}/{tenant}/oauth2/token` and turns the JSON answer into an
//! `AccessToken`.

use std::time::{Duration, SystemTime};

use catalog_core::{AccessToken, ApiError, TokenProvider, TokenRequest};
use serde::Deserialize;
use tracing::{debug, instrument};
use ureq::Agent;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<ExpiresIn>,
}

/// Azure AD v1 sends `expires_in` as a string, most other servers as a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(u64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> Option<u64> {
        match self {
            ExpiresIn::Seconds(s) => Some(*s),
            ExpiresIn::Text(t) => t.trim().parse().ok(),
        }
    }
}

pub struct ClientCredentialsProvider {
    agent: Agent,
    token_endpoint: String,
    tenant: String,
    client_secret: String,
}

impl ClientCredentialsProvider {
    pub fn new(authority: &str, tenant: &str, client_secret: &str) -> Self {
        let agent = Agent::config_builder().http_status_as_error(false).build().new_agent();
        Self {
            agent,
            token_endpoint: format!("{}/{tenant}/oauth2/token", authority.trim_end_matches('/')),
            tenant: tenant.to_string(),
            client_secret: client_secret.to_string(),
        }
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }
}

impl TokenProvider for ClientCredentialsProvider {
    #[instrument(skip_all, fields(endpoint = %self.token_endpoint, client_id = %request.client_id))]
    fn acquire_token(&mut self, request: &TokenRequest) -> Result<AccessToken, ApiError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", request.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("resource", request.resource.as_str()),
        ];
        let mut response = self
            .agent
            .post(&self.token_endpoint)
            .send_form(params)
            .map_err(|e| ApiError::Token(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Token(e.to_string()))?;
        if status != 200 {
            return Err(ApiError::Token(format!("HTTP {status}: {body}")));
        }

        let token = parse_token_response(&body, &self.tenant, SystemTime::now())?;
        debug!(expires_at = ?token.expires_at, "token acquired");
        Ok(token)
    }
}

fn parse_token_response(body: &str, tenant: &str, now: SystemTime) -> Result<AccessToken, ApiError> {
    let parsed: TokenResponse = serde_json::from_str(body).map_err(|e| ApiError::Token(e.to_string()))?;
    let token = AccessToken::new(parsed.access_token, tenant);
    Ok(match parsed.expires_in.as_ref().and_then(ExpiresIn::seconds) {
        Some(secs) => token.expiring_at(now + Duration::from_secs(secs)),
        None => token,
    })
}
