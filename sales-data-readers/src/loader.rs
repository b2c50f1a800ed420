//! Byte loading from local paths and HTTP(S) URLs

use std::io::ErrorKind;

use crate::common::Locator;
use crate::error::{Error, Result};

/// Retrieves the raw bytes behind a [`Locator`]
#[derive(Debug, Clone, Default)]
pub struct Loader {
    #[cfg(feature = "http")]
    client: reqwest::Client,
}

impl Loader {
    /// Create a loader with a default HTTP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the whole resource into memory
    ///
    /// A missing local file or a non-success HTTP status is reported as
    /// [`Error::SourceUnavailable`].
    pub async fn load(&self, locator: &Locator) -> Result<Vec<u8>> {
        if locator.is_remote() {
            return self.load_remote(locator).await;
        }

        match tokio::fs::read(locator.as_str()).await {
            Ok(bytes) => {
                tracing::debug!(%locator, bytes = bytes.len(), "loaded local file");
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::SourceUnavailable(format!(
                "{locator} does not exist"
            ))),
            Err(e) => Err(Error::Io(e)),
        }
    }

    #[cfg(feature = "http")]
    async fn load_remote(&self, locator: &Locator) -> Result<Vec<u8>> {
        let response = self.client.get(locator.as_str()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!("{locator} returned {status}")));
        }

        let bytes = response.bytes().await?;
        tracing::debug!(%locator, bytes = bytes.len(), "downloaded remote file");
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "http"))]
    async fn load_remote(&self, locator: &Locator) -> Result<Vec<u8>> {
        Err(Error::SourceUnavailable(format!(
            "{locator} is remote but HTTP support is disabled"
        )))
    }
}
