use async_trait::async_trait;
use bytes::Bytes;

use crate::error::TransportError;

/// Trait for retrieving a pyramid descriptor document.
///
/// This is the only asynchronous seam in the engine: a pyramid source calls
/// it exactly once per successful configuration. Implementations decide how
/// a location string maps to bytes (HTTP, local disk, in-memory fixtures).
///
/// Retrying is the implementation's business; the engine treats any error
/// as terminal for the source that issued the request.
#[async_trait]
pub trait DescriptorFetcher: Send + Sync {
    /// Fetch the raw bytes stored at `location`.
    async fn fetch(&self, location: &str) -> Result<Bytes, TransportError>;

    /// Short name for log output.
    fn name(&self) -> &str;
}
