use crate::config::GraphConfig;
use crate::error::Error;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Acquire an app-only token with the client-credentials flow.
pub fn acquire_app_token(http: &Client, config: &GraphConfig) -> Result<String, Error> {
    if config.client_secret.is_empty() {
        return Err(Error::Auth(
            "client secret is empty; set ADLID_GRAPH__CLIENT_SECRET".to_string(),
        ));
    }
    if config.tenant_id.is_empty() || config.client_id.is_empty() {
        return Err(Error::Auth("tenant_id and client_id must be configured".to_string()));
    }

    let url = format!(
        "{}/{}/oauth2/v2.0/token",
        config.authority_base.trim_end_matches('/'),
        config.tenant_id
    );
    debug!("Requesting app token from {}", url);

    let resp = http
        .post(&url)
        .timeout(Duration::from_secs(30))
        .form(&[
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("scope", config.scope.as_str()),
            ("grant_type", "client_credentials"),
        ])
        .send()?;

    let status = resp.status();
    if !status.is_success() {
        let detail = resp.text().unwrap_or_default();
        return Err(Error::Auth(format!(
            "token request failed with status {}: {}",
            status.as_u16(),
            detail
        )));
    }

    let token: TokenResponse = resp.json()?;
    info!(expires_in = ?token.expires_in, "Acquired app-only access token");
    Ok(token.access_token)
}
