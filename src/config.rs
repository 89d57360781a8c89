//! Configuration types for resume downloads.
//!
//! All download behaviour is controlled through [`DownloadConfig`], built via
//! its [`DownloadConfigBuilder`]. Setters store values as given (apart from
//! trimming a trailing `/` off the base URL) and
//! [`DownloadConfigBuilder::build`] rejects the invalid ones.

use crate::error::Resume2PdfError;
use crate::progress::ProgressCallback;
use crate::token::RenderingToken;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Root of the public rendering service.
pub const DEFAULT_BASE_URL: &str = "https://ssr.resume.tools";

/// The service serves images only to browser-looking clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/136.0.0.0 Safari/537.36";

/// Minimum image width requested for lossless output.
pub const MAX_QUALITY_MIN_IMAGE_SIZE: u32 = 4500;

/// Configuration for a resume download.
///
/// Built via [`DownloadConfig::builder()`] or using
/// [`DownloadConfig::default()`].
///
/// # Example
/// ```rust
/// use resume2pdf::{DownloadConfig, PageSize, Quality};
///
/// let config = DownloadConfig::builder()
///     .page_size(PageSize::Letter)
///     .quality(Quality::High)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct DownloadConfig {
    /// Requested image width in pixels. Default: 3000.
    ///
    /// The service renders each page at this width. Larger images give
    /// sharper text at the cost of download size.
    pub image_size: u32,

    /// Image format requested from the service. Default: JPEG.
    pub extension: ImageExtension,

    /// Target page box of the assembled PDF. Default: A4.
    pub page_size: PageSize,

    /// Compression applied to page images before embedding. Default: Max.
    pub quality: Quality,

    /// Root URL of the rendering service. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Per-request timeout in seconds. Default: 30.
    pub timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Optional progress callback, see [`crate::progress`].
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            image_size: 3000,
            extension: ImageExtension::default(),
            page_size: PageSize::default(),
            quality: Quality::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DownloadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadConfig")
            .field("image_size", &self.image_size)
            .field("extension", &self.extension)
            .field("page_size", &self.page_size)
            .field("quality", &self.quality)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn DownloadProgressCallback>"),
            )
            .finish()
    }
}

impl DownloadConfig {
    /// Create a new builder for `DownloadConfig`.
    pub fn builder() -> DownloadConfigBuilder {
        DownloadConfigBuilder {
            config: Self::default(),
        }
    }

    /// The settings actually sent to the service.
    ///
    /// Lossless output only makes sense from a lossless source, so
    /// [`Quality::Max`] forces PNG and at least
    /// [`MAX_QUALITY_MIN_IMAGE_SIZE`] pixels of width.
    pub fn effective(&self) -> Self {
        let mut c = self.clone();
        if c.quality == Quality::Max {
            c.extension = ImageExtension::Png;
            c.image_size = c.image_size.max(MAX_QUALITY_MIN_IMAGE_SIZE);
        }
        c
    }

    /// Key identifying the PDF this config produces for `token`.
    pub fn cache_key(&self, token: &RenderingToken) -> String {
        let c = self.effective();
        format!(
            "{}:{}:{}:{}:{}",
            token,
            c.image_size,
            c.extension.as_str(),
            c.page_size.as_str(),
            c.quality.as_str()
        )
    }
}

/// Builder for [`DownloadConfig`].
#[derive(Debug)]
pub struct DownloadConfigBuilder {
    config: DownloadConfig,
}

impl DownloadConfigBuilder {
    pub fn image_size(mut self, px: u32) -> Self {
        self.config.image_size = px;
        self
    }

    pub fn extension(mut self, ext: ImageExtension) -> Self {
        self.config.extension = ext;
        self
    }

    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn quality(mut self, q: Quality) -> Self {
        self.config.quality = q;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DownloadConfig, Resume2PdfError> {
        let c = &self.config;
        if c.image_size == 0 {
            return Err(Resume2PdfError::InvalidConfig(
                "Image size must be greater than 0".into(),
            ));
        }
        if c.timeout_secs == 0 {
            return Err(Resume2PdfError::InvalidConfig(
                "Timeout must be at least 1 second".into(),
            ));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(Resume2PdfError::InvalidConfig(format!(
                "Base URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Image format requested from the rendering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageExtension {
    #[default]
    Jpeg,
    Png,
    Webp,
}

impl ImageExtension {
    /// File extension used in the image URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageExtension::Jpeg => "jpeg",
            ImageExtension::Png => "png",
            ImageExtension::Webp => "webp",
        }
    }
}

/// Page box of the assembled PDF.
///
/// Dimensions are in points (72 points = 1 inch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// Keep the page size reported by the service.
    Original,
    /// 210 mm × 297 mm = 595 × 842 pt. (default)
    #[default]
    A4,
    /// 8.5" × 11" = 612 × 792 pt.
    Letter,
    /// 8.5" × 14" = 612 × 1008 pt.
    Legal,
}

impl PageSize {
    /// `(width, height)` in points, or `None` for [`PageSize::Original`].
    pub fn dimensions(&self) -> Option<(f64, f64)> {
        match self {
            PageSize::Original => None,
            PageSize::A4 => Some((595.0, 842.0)),
            PageSize::Letter => Some((612.0, 792.0)),
            PageSize::Legal => Some((612.0, 1008.0)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::Original => "original",
            PageSize::A4 => "a4",
            PageSize::Letter => "letter",
            PageSize::Legal => "legal",
        }
    }
}

/// Compression applied to page images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// JPEG 50 %.
    Low,
    /// JPEG 75 %.
    Medium,
    /// JPEG 95 %.
    High,
    /// Lossless. (default)
    #[default]
    Max,
}

impl Quality {
    /// JPEG quality for lossy tiers, `None` for [`Quality::Max`].
    pub fn jpeg_quality(&self) -> Option<u8> {
        match self {
            Quality::Low => Some(50),
            Quality::Medium => Some(75),
            Quality::High => Some(95),
            Quality::Max => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Low => "low",
            Quality::Medium => "medium",
            Quality::High => "high",
            Quality::Max => "max",
        }
    }
}
