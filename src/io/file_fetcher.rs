use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use super::DescriptorFetcher;
use crate::error::TransportError;

/// Local filesystem implementation of [`DescriptorFetcher`].
///
/// Accepts plain paths as well as `file://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl FileFetcher {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a location string to a filesystem path.
    pub fn resolve(location: &str) -> Result<PathBuf, TransportError> {
        if location.starts_with("file://") {
            let url = Url::parse(location).map_err(|e| TransportError::Io(e.to_string()))?;
            return url
                .to_file_path()
                .map_err(|_| TransportError::Io(format!("Not a local file URL: {}", location)));
        }
        Ok(PathBuf::from(location))
    }
}

#[async_trait]
impl DescriptorFetcher for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<Bytes, TransportError> {
        let path = Self::resolve(location)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(TransportError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(TransportError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}
