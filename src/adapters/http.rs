use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use url::Url;

/// Returns the URL when `location` names an `http`/`https` resource.
pub fn remote_url(location: &str) -> Option<Url> {
    Url::parse(location)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Fetches a dataset over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        tracing::debug!("Making request to: {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| EtlError::source_unavailable(url.as_str(), e))?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);
        if !status.is_success() {
            return Err(EtlError::source_unavailable(
                url.as_str(),
                format!("server answered {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EtlError::source_unavailable(url.as_str(), e))?;
        Ok(body.to_vec())
    }
}
