//! Descriptor transport.
//!
//! The engine needs exactly one piece of remote data per image: the pyramid
//! descriptor. [`DescriptorFetcher`] abstracts where it comes from;
//! [`HttpFetcher`] and [`FileFetcher`] cover the two common cases and
//! [`RoutingFetcher`] picks between them by looking at the location.

mod fetcher;
mod file_fetcher;
mod http_fetcher;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TransportError;

pub use fetcher::DescriptorFetcher;
pub use file_fetcher::FileFetcher;
pub use http_fetcher::HttpFetcher;

/// Fetcher that sends `http://` and `https://` locations to [`HttpFetcher`]
/// and everything else to [`FileFetcher`].
#[derive(Clone, Default)]
pub struct RoutingFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl RoutingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `location` would be fetched over HTTP.
    pub fn is_remote(location: &str) -> bool {
        location.starts_with("http://") || location.starts_with("https://")
    }
}

#[async_trait]
impl DescriptorFetcher for RoutingFetcher {
    async fn fetch(&self, location: &str) -> Result<Bytes, TransportError> {
        if Self::is_remote(location) {
            self.http.fetch(location).await
        } else {
            self.file.fetch(location).await
        }
    }

    fn name(&self) -> &str {
        "routing"
    }
}
