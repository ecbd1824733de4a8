//! Asset retrieval seam.
//!
//! The manager talks to storage through a small trait so tests can hand
//! it an in-memory source. Production fetching is HTTP with a HEAD
//! existence probe before the full download.

use crate::error::SceneError;

#[allow(async_fn_in_trait)]
pub trait AssetFetcher {
    /// Lightweight probe confirming the asset is retrievable. Must not
    /// download the asset body.
    async fn exists(&self, url: &str) -> bool;

    /// Download the asset. `on_progress` receives a percentage
    /// (0.0..=100.0) whenever the transfer exposes a total size; when it
    /// does not, no progress is reported at all.
    async fn fetch(
        &self,
        url: &str,
        on_progress: &mut dyn FnMut(f32),
    ) -> Result<Vec<u8>, SceneError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl AssetFetcher for HttpFetcher {
    async fn exists(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn fetch(
        &self,
        url: &str,
        on_progress: &mut dyn FnMut(f32),
    ) -> Result<Vec<u8>, SceneError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| SceneError::Fetch(err.to_string()))?;

        if !response.status().is_success() {
            return Err(SceneError::Fetch(format!(
                "download failed with status {}",
                response.status()
            )));
        }

        let total = response.content_length().filter(|total| *total > 0);
        let mut data = Vec::with_capacity(total.unwrap_or(0) as usize);

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| SceneError::Fetch(err.to_string()))?
        {
            data.extend_from_slice(&chunk);
            if let Some(total) = total {
                on_progress(data.len() as f32 / total as f32 * 100.0);
            }
        }

        Ok(data)
    }
}
