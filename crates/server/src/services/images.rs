//! Image upload to the external asset host.
//!
//! The storefront sends 1-5 data-URL images with each product save. When an
//! asset host is configured they are forwarded and the hosted URLs come
//! back; when it is not configured, or the host is unreachable, the input is
//! echoed so a product save never fails on its images.

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::AssetHostConfig;

/// Minimum images per upload request.
pub const MIN_UPLOAD_IMAGES: usize = 1;
/// Maximum images per upload request.
pub const MAX_UPLOAD_IMAGES: usize = 5;

/// Upload errors surfaced to the client.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Image count outside the 1-5 bound.
    #[error("expected between {MIN_UPLOAD_IMAGES} and {MAX_UPLOAD_IMAGES} images, got {got}")]
    InvalidCount { got: usize },
}

#[derive(Serialize)]
struct UploadRequest<'a> {
    images: &'a [String],
}

#[derive(Deserialize)]
struct UploadResponse {
    urls: Vec<String>,
}

/// Forwards image uploads to the configured asset host.
#[derive(Clone)]
pub struct ImageService {
    http: reqwest::Client,
    host: Option<AssetHostConfig>,
}

impl ImageService {
    /// Create a new image service.
    #[must_use]
    pub fn new(host: Option<AssetHostConfig>) -> Self {
        Self {
            http: reqwest::Client::new(),
            host,
        }
    }

    /// Upload 1-5 images, returning their hosted URLs.
    ///
    /// Degrades gracefully: an unconfigured or unreachable host echoes the
    /// input back instead of failing the request.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::InvalidCount` when the count is outside 1-5;
    /// no upload is attempted in that case.
    pub async fn upload(&self, images: Vec<String>) -> Result<Vec<String>, ImageError> {
        if images.len() < MIN_UPLOAD_IMAGES || images.len() > MAX_UPLOAD_IMAGES {
            return Err(ImageError::InvalidCount { got: images.len() });
        }

        let Some(host) = &self.host else {
            return Ok(images);
        };

        match self.forward(host, &images).await {
            Ok(urls) => Ok(urls),
            Err(e) => {
                tracing::warn!(error = %e, "asset host upload failed, echoing input");
                Ok(images)
            }
        }
    }

    async fn forward(
        &self,
        host: &AssetHostConfig,
        images: &[String],
    ) -> Result<Vec<String>, reqwest::Error> {
        let response = self
            .http
            .post(&host.url)
            .bearer_auth(host.key.expose_secret())
            .json(&UploadRequest { images })
            .send()
            .await?
            .error_for_status()?
            .json::<UploadResponse>()
            .await?;

        Ok(response.urls)
    }
}
