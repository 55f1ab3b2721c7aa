//! HTTP client for the identifier minting endpoint

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::config::MinterConfig;
use crate::mint::MintError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_HEADER: &str = "api-key";

/// Transient failures are retried this many times before giving up
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Minimal descriptor registered with a minted identifier
#[derive(Debug, Clone, Serialize)]
pub struct Erc {
    pub who: String,
    pub what: String,
    pub when: String,
}

#[derive(Debug, Serialize)]
struct MintRequest<'a> {
    who: &'a str,
    what: &'a str,
    when: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    prefix: &'a str,
}

#[derive(Debug, Deserialize)]
struct MintResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    id: &'a str,
}

/// Client for the minting service
pub struct MintClient {
    http: reqwest::Client,
    config: MinterConfig,
}

impl MintClient {
    pub fn new(config: MinterConfig) -> Result<Self, MintError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MintError::Network(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Mint one identifier for the given descriptor.
    ///
    /// Transport errors and 5xx responses are retried with a short linear
    /// backoff; 4xx responses fail immediately since a bad key or endpoint
    /// is not transient.
    pub async fn mint(&self, erc: &Erc) -> Result<String, MintError> {
        let request = MintRequest {
            who: &erc.who,
            what: &erc.what,
            when: &erc.when,
            prefix: &self.config.prefix,
        };

        let mut last_error = MintError::Network("no attempts made".to_string());
        for attempt in 1..=MAX_ATTEMPTS {
            tracing::debug!(endpoint = %self.config.endpoint, attempt, "requesting identifier");
            match self.try_mint(&request).await {
                Ok(id) => return Ok(id),
                Err(error) if error.is_transient() && attempt < MAX_ATTEMPTS => {
                    tracing::debug!(%error, attempt, "mint attempt failed; retrying");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    last_error = error;
                }
                Err(error) => return Err(error),
            }
        }
        Err(last_error)
    }

    async fn try_mint(&self, request: &MintRequest<'_>) -> Result<String, MintError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| MintError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MintError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(MintError::Api(status.as_u16(), body));
        }

        // JSON `{"id": "..."}` is the documented shape; tolerate a bare
        // identifier body from older service versions
        let id = serde_json::from_str::<MintResponse>(&body)
            .map(|r| r.id)
            .unwrap_or_else(|_| body.trim().to_string());
        if id.is_empty() {
            return Err(MintError::Parse("empty identifier in response".to_string()));
        }
        Ok(id)
    }

    /// Delete a minted identifier; the rollback path of legacy exports
    pub async fn delete(&self, id: &str) -> Result<(), MintError> {
        let response = self
            .http
            .delete(&self.config.endpoint)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&DeleteRequest { id })
            .send()
            .await
            .map_err(|e| MintError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MintError::Api(status.as_u16(), body));
        }
        Ok(())
    }
}
