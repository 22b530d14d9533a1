use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use reqwest::Client;

use super::DescriptorFetcher;
use crate::error::TransportError;

/// HTTP implementation of [`DescriptorFetcher`] backed by `reqwest`.
///
/// Issues a single GET per fetch. A 404 maps to [`TransportError::NotFound`],
/// any other non-success status to [`TransportError::Status`].
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default `reqwest` client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher that reuses an existing client (connection pool,
    /// proxy settings, default headers).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DescriptorFetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Bytes, TransportError> {
        let response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound(location.to_string()));
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                url: location.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))
    }

    fn name(&self) -> &str {
        "http"
    }
}
