use tracing::{debug, info, warn};

use crate::api::{QueryPayload, ServicesResponse};
use crate::core::config::data::Config;
use crate::core::config::io::RetryPolicy;
use crate::core::error::{ClientError, NetworkError};
use crate::utils::url::{construct_api_url, normalize_base_url};

/// Fetches the service catalog and configuration from the backend.
///
/// No caching: callers keep the returned [`Config`] for the session.
#[derive(Clone)]
pub struct ConfigClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl ConfigClient {
    pub fn new(client: reqwest::Client, base_url: &str, retry: RetryPolicy) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
            retry,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Same client pointed at another backend address.
    pub fn with_base_url(&self, base_url: &str) -> Self {
        Self::new(self.client.clone(), base_url, self.retry)
    }

    pub async fn fetch_config(&self) -> Result<Config, ClientError> {
        let url = construct_api_url(&self.base_url, "config");
        let config = self
            .get_json::<Config>(&url)
            .await
            .map_err(ClientError::ConfigLoad)?;
        info!(services = config.services.len(), "config fetched");
        Ok(config)
    }

    pub async fn fetch_services(&self) -> Result<Vec<String>, ClientError> {
        let url = construct_api_url(&self.base_url, "services");
        let response = self
            .get_json::<ServicesResponse>(&url)
            .await
            .map_err(ClientError::ServiceList)?;
        info!(services = ?response.services, "services fetched");
        Ok(dedup_preserving_order(response.services))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, NetworkError> {
        let response = get_with_retry(&self.client, url, self.retry).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| NetworkError::transport(url, format!("invalid response body: {err}")))
    }
}

/// GET with a fixed number of attempts and a fixed delay between them.
/// Any non-success status counts as a failed attempt.
pub async fn get_with_retry(
    client: &reqwest::Client,
    url: &str,
    retry: RetryPolicy,
) -> Result<reqwest::Response, NetworkError> {
    let attempts = retry.attempts.max(1);
    let mut attempt = 1;
    loop {
        let error = match client.get(url).send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => NetworkError::status(url, response.status()),
            Err(err) => NetworkError::transport(url, err.to_string()),
        };
        warn!(attempt, url, error = %error, "fetch attempt failed");
        if attempt >= attempts {
            return Err(error);
        }
        attempt += 1;
        tokio::time::sleep(retry.delay).await;
    }
}

/// POST the payload to the query endpoint. Non-2xx is an error.
pub async fn query_service(
    client: &reqwest::Client,
    endpoint: &str,
    payload: &QueryPayload,
) -> Result<reqwest::Response, NetworkError> {
    debug!(?payload, "sending payload");
    let response = client
        .post(endpoint)
        .header("Content-Type", "application/json")
        .json(payload)
        .send()
        .await
        .map_err(|err| NetworkError::transport(endpoint, err.to_string()))?;

    if !response.status().is_success() {
        return Err(NetworkError::status(endpoint, response.status()));
    }
    Ok(response)
}

fn dedup_preserving_order(services: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    services
        .into_iter()
        .filter(|service| seen.insert(service.clone()))
        .collect()
}
