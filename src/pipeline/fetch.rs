//! HTTP access to the rendering service.
//!
//! Two endpoints are used:
//!
//! ```text
//! GET {base}/meta/{token}?cache={stamp}
//! GET {base}/to-image/{token}-{page}.{ext}?cache={stamp}&size={px}
//! ```
//!
//! The `cache` stamp defeats the service's CDN cache so an edited resume is
//! never served stale. It is fixed once per download so all requests of one
//! run hit the same rendering.

use crate::config::{DownloadConfig, ImageExtension};
use crate::error::Resume2PdfError;
use crate::pipeline::metadata::{parse_metadata, ResumeMetadata};
use crate::progress::ProgressCallback;
use crate::token::RenderingToken;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info};

/// Cache-busting stamp: UTC time with centisecond precision, e.g.
/// `2024-05-01T09:30:12.34Z`.
pub fn cache_date(now: DateTime<Utc>) -> String {
    format!(
        "{}.{:02}Z",
        now.format("%Y-%m-%dT%H:%M:%S"),
        now.timestamp_subsec_millis() / 10
    )
}

/// URL of the metadata document for `token`.
pub fn metadata_url(base: &str, token: &RenderingToken, cache_date: &str) -> String {
    format!("{base}/meta/{token}?cache={cache_date}")
}

/// URL of the rendered image of page `page_id` (1-indexed).
pub fn image_url(
    base: &str,
    token: &RenderingToken,
    page_id: usize,
    extension: ImageExtension,
    cache_date: &str,
    image_size: u32,
) -> String {
    format!(
        "{base}/to-image/{token}-{page_id}.{}?cache={cache_date}&size={image_size}",
        extension.as_str()
    )
}

/// A thin client bound to one download's settings and cache stamp.
pub struct ResumeClient {
    http: reqwest::Client,
    base_url: String,
    extension: ImageExtension,
    image_size: u32,
    timeout_secs: u64,
    cache_date: String,
}

impl ResumeClient {
    /// Build a client for `config` using the current time as cache stamp.
    pub fn new(config: &DownloadConfig) -> Result<Self, Resume2PdfError> {
        Self::with_cache_date(config, cache_date(Utc::now()))
    }

    pub fn with_cache_date(
        config: &DownloadConfig,
        cache_date: String,
    ) -> Result<Self, Resume2PdfError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Resume2PdfError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            extension: config.extension,
            image_size: config.image_size,
            timeout_secs: config.timeout_secs,
            cache_date,
        })
    }

    pub fn cache_date(&self) -> &str {
        &self.cache_date
    }

    /// Fetch and validate the metadata document.
    pub async fn fetch_metadata(
        &self,
        token: &RenderingToken,
    ) -> Result<ResumeMetadata, Resume2PdfError> {
        let url = metadata_url(&self.base_url, token, &self.cache_date);
        info!("Fetching metadata for {}", token);
        let body = self.get(&url, token).await?;
        let metadata = parse_metadata(token, &body)?;
        debug!(
            "Metadata: {} pages, {} links",
            metadata.page_count(),
            metadata.link_count()
        );
        Ok(metadata)
    }

    /// Fetch one page image using the client's configured format and size.
    pub async fn fetch_page_image(
        &self,
        token: &RenderingToken,
        page_id: usize,
    ) -> Result<Vec<u8>, Resume2PdfError> {
        self.fetch_image_with(token, page_id, self.extension, self.image_size)
            .await
    }

    /// Fetch one page image with an explicit format and size.
    pub async fn fetch_image_with(
        &self,
        token: &RenderingToken,
        page_id: usize,
        extension: ImageExtension,
        image_size: u32,
    ) -> Result<Vec<u8>, Resume2PdfError> {
        let url = image_url(
            &self.base_url,
            token,
            page_id,
            extension,
            &self.cache_date,
            image_size,
        );
        self.get(&url, token).await
    }

    /// Fetch pages `1..=total` one at a time, in order.
    pub async fn fetch_images(
        &self,
        token: &RenderingToken,
        total: usize,
        progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Vec<u8>>, Resume2PdfError> {
        let mut images = Vec::with_capacity(total);
        for page_id in 1..=total {
            if let Some(cb) = progress {
                cb.on_page_start(page_id, total);
            }
            let bytes = self.fetch_page_image(token, page_id).await?;
            debug!("Page {}/{}: {} bytes", page_id, total, bytes.len());
            if let Some(cb) = progress {
                cb.on_page_complete(page_id, total, bytes.len());
            }
            images.push(bytes);
        }
        Ok(images)
    }

    /// GET `url` and return the body of a 200 response.
    async fn get(&self, url: &str, token: &RenderingToken) -> Result<Vec<u8>, Resume2PdfError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(Resume2PdfError::ResumeNotFound {
                    token: token.to_string(),
                })
            }
            status => {
                return Err(Resume2PdfError::DownloadFailed {
                    url: url.to_string(),
                    status: Some(status.as_u16()),
                    reason: format!("Server returned status {}", status.as_u16()),
                })
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(url, e))?;
        Ok(bytes.to_vec())
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> Resume2PdfError {
        if e.is_timeout() {
            Resume2PdfError::DownloadTimeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            Resume2PdfError::DownloadFailed {
                url: url.to_string(),
                status: None,
                reason: format!("Network error: {e}"),
            }
        }
    }
}
