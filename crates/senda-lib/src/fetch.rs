//! Page-fetch service client
//!
//! Production [`PageFetcher`] built on a public CORS-bypass proxy: the proxy
//! fetches an arbitrary URL on our behalf and wraps the raw markup in a JSON
//! envelope. Treated as a black box; rate-limit-prone and best-effort.

use crate::enrich::{FetchError, PageFetcher};
use serde::Deserialize;

const PROXY_ENDPOINT: &str = "https://api.allorigins.win/get";

/// JSON envelope returned by the proxy
#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    #[serde(default)]
    contents: String,
}

/// Fetches pages through the AllOrigins proxy
#[derive(Clone, Debug, Default)]
pub struct AllOriginsFetcher {
    client: reqwest::Client,
}

impl AllOriginsFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageFetcher for AllOriginsFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let proxied = reqwest::Url::parse_with_params(PROXY_ENDPOINT, &[("url", url)])
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        tracing::debug!(target_url = url, "fetching page through proxy");
        let response = self.client.get(proxied).send().await?.error_for_status()?;
        let envelope: ProxyEnvelope = response.json().await?;
        Ok(envelope.contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_tolerates_missing_contents() {
        let envelope: ProxyEnvelope = serde_json::from_str("{}").unwrap();
        assert_eq!(envelope.contents, "");

        let envelope: ProxyEnvelope =
            serde_json::from_str("{\"contents\":\"<html></html>\",\"status\":{}}").unwrap();
        assert_eq!(envelope.contents, "<html></html>");
    }
}
