use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use crate::core::config::Config;
use crate::core::errors::{LookupError, LookupResult};
use crate::core::types::DictionaryResult;
use crate::utils::Metrics;

/// Remote dictionary endpoints the gateway depends on
#[async_trait]
pub trait DictionaryApi: Send + Sync {
    /// Supported pair codes, e.g. `["en-es", "en-fr"]`
    async fn get_langs(&self) -> LookupResult<Vec<String>>;

    /// Dictionary entry for `text` in direction `lang`
    async fn lookup(&self, text: &str, lang: &str) -> LookupResult<DictionaryResult>;
}

/// Yandex Dictionary HTTP client.
///
/// Every call is a single attempt: no retries, no backoff.
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    metrics: Option<Metrics>,
}

impl ApiClient {
    pub fn new(config: &Config, metrics: Option<Metrics>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.api_timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.api_url().to_string(),
            api_key: config.api_key().to_string(),
            metrics,
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}{}", self.base_url, name)
    }

    /// Send one GET and decode the JSON body, recording the call in metrics
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> LookupResult<T> {
        let start = Instant::now();
        let result = self.send(endpoint, params).await;

        if let Some(ref m) = self.metrics {
            m.record_api_call(result.is_ok(), start.elapsed());
        }

        result
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> LookupResult<T> {
        let response = self
            .http_client
            .get(self.endpoint(endpoint))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} failed with status {}: {}", endpoint, status, body);
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            LookupError::InvalidResponse(format!("{} returned undecodable body: {}", endpoint, e))
        })
    }
}

#[async_trait]
impl DictionaryApi for ApiClient {
    #[instrument(skip(self))]
    async fn get_langs(&self) -> LookupResult<Vec<String>> {
        debug!("Fetching supported language pairs");
        self.get_json("getLangs", &[("key", self.api_key.as_str())])
            .await
    }

    #[instrument(skip(self))]
    async fn lookup(&self, text: &str, lang: &str) -> LookupResult<DictionaryResult> {
        debug!("Looking up {:?} ({})", text, lang);
        self.get_json(
            "lookup",
            &[("key", self.api_key.as_str()), ("lang", lang), ("text", text)],
        )
        .await
    }
}
