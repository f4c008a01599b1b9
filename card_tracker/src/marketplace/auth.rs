//! OAuth client-credentials flow

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::time::{Duration, Instant};

use super::MarketplaceClient;
use crate::error::{Result, TrackerError};

const OAUTH_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";

/// Tokens are refreshed this long before eBay says they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub(crate) struct AccessToken {
    pub(crate) value: String,
    pub(crate) refresh_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.refresh_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl MarketplaceClient {
    /// A valid application token, fetching a new one only when needed
    pub(crate) async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            log::debug!("Reusing cached eBay access token");
            return Ok(token.value.clone());
        }

        let credentials = self
            .credentials
            .as_ref()
            .ok_or(TrackerError::MissingCredentials("EBAY_CLIENT_ID / EBAY_CLIENT_SECRET"))?;
        let basic = STANDARD.encode(format!(
            "{}:{}",
            credentials.client_id, credentials.client_secret
        ));

        let url = format!("{}/identity/v1/oauth2/token", self.base_url);
        log::debug!("Requesting eBay access token from {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Basic {}", basic))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!(
                "grant_type=client_credentials&scope={}",
                urlencoding::encode(OAUTH_SCOPE)
            ))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("eBay OAuth failed ({}): {}", status, body);
            return Err(TrackerError::HttpStatus(status));
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        log::info!("Obtained eBay access token (valid for {}s)", lifetime.as_secs());

        *cached = Some(AccessToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }
}
