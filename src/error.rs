//! Error types for the resume2pdf library.
//!
//! Every failure is fatal for the download it belongs to: the service either
//! hands back a complete resume or the whole request is abandoned. There is
//! no per-page partial result, so a single [`Resume2PdfError`] enum covers
//! the entire pipeline.
//!
//! Messages are written to be shown to the end user as-is (CLI stderr, a
//! toast, an HTTP error body). [`Resume2PdfError::status_code`] and
//! [`Resume2PdfError::kind`] give hosts a stable classification on top.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the resume2pdf library.
#[derive(Debug, Error)]
pub enum Resume2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The rendering token is not 24 alphanumeric characters.
    #[error("Invalid token format: '{token}'. Token must be a 24-character alphanumeric string.")]
    InvalidToken { token: String },

    /// The service has no resume for this token (HTTP 404 or empty page list).
    #[error("Resume not found for token: '{token}'. Please verify the token is correct.")]
    ResumeNotFound { token: String },

    // ── Fetch errors ──────────────────────────────────────────────────────
    /// A request failed at the transport level or returned a non-200 status.
    #[error("Download failed for '{url}': {reason}")]
    DownloadFailed {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// A request exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'. Please try again.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The metadata document could not be understood.
    #[error("Invalid resume metadata: {detail}")]
    InvalidMetadata { detail: String },

    /// Metadata announced a different number of pages than were fetched.
    #[error("Page count mismatch: metadata lists {expected} pages but {actual} images were fetched")]
    PageCountMismatch { expected: usize, actual: usize },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// A page image could not be decoded or re-encoded.
    #[error("Image for page {page} could not be processed: {detail}")]
    ImageDecodeFailed { page: usize, detail: String },

    /// lopdf failed to build or serialise the document.
    #[error("PDF generation failed: {0}")]
    PdfGenerationFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Resume2PdfError {
    /// HTTP status class a web front-end should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidToken { .. } | Self::InvalidConfig(_) => 400,
            Self::ResumeNotFound { .. } => 404,
            Self::DownloadFailed { .. }
            | Self::DownloadTimeout { .. }
            | Self::InvalidMetadata { .. }
            | Self::PageCountMismatch { .. } => 502,
            Self::ImageDecodeFailed { .. }
            | Self::PdfGenerationFailed(_)
            | Self::OutputWriteFailed { .. }
            | Self::Internal(_) => 500,
        }
    }

    /// Stable snake_case label, e.g. for a JSON `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidToken { .. } => "invalid_token",
            Self::ResumeNotFound { .. } => "resume_not_found",
            Self::DownloadFailed { .. } | Self::DownloadTimeout { .. } => "download_failed",
            Self::InvalidMetadata { .. } | Self::PageCountMismatch { .. } => "invalid_metadata",
            Self::ImageDecodeFailed { .. } | Self::PdfGenerationFailed(_) => {
                "pdf_generation_failed"
            }
            Self::OutputWriteFailed { .. } => "output_write_failed",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Upstream HTTP status, when the failure came from a response.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::DownloadFailed { status, .. } => *status,
            Self::ResumeNotFound { .. } => Some(404),
            _ => None,
        }
    }
}

impl From<lopdf::Error> for Resume2PdfError {
    fn from(e: lopdf::Error) -> Self {
        Self::PdfGenerationFailed(e.to_string())
    }
}
