//! HTTP seam between the catalog client and the network.

use std::{future::Future, time::Duration};

use serde_json::Value;
use tracing::debug;

use crate::error::CatalogError;

/// Issues `GET` requests against the catalog and returns the decoded JSON body.
///
/// `path` is relative to the catalog base URL (for example `games/42`).
pub trait Transport: Send + Sync + 'static {
    /// Fetch `path` with the given query parameters.
    fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<Value, CatalogError>> + Send;
}

/// [`Transport`] backed by `reqwest`, appending the API key to every request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    /// Build a transport for `base_url` authenticated with `api_key`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CatalogError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("chimix/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CatalogError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, CatalogError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(endpoint = %path, "Requesting catalog");

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|source| CatalogError::Transport {
                endpoint: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| CatalogError::Transport {
                endpoint: path.to_string(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| CatalogError::Decode {
            endpoint: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_transport_needs_a_key() {
        let err = HttpTransport::new("https://example.test/api", "  ", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, CatalogError::MissingApiKey));

        let transport =
            HttpTransport::new("https://example.test/api/", "abc", Duration::from_secs(1))
                .unwrap();
        assert_eq!(transport.base_url, "https://example.test/api");
    }
}
