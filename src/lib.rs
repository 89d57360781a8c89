//! # resume2pdf
//!
//! Download a resume rendered by the resume.io rendering service as a single
//! PDF, with the resume's hyperlinks still clickable.
//!
//! The service exposes a resume only as one raster image per page plus a
//! metadata document listing each page's size and link hotspots. This crate
//! fetches both, places every image on a PDF page of the chosen size, and
//! lays `/Link` annotations over the hotspots.
//!
//! ## Pipeline Overview
//!
//! ```text
//! token
//!  │
//!  ├─ 1. Validate  24 alphanumeric characters
//!  ├─ 2. Metadata  GET /meta/{token}  → pages, viewports, links
//!  ├─ 3. Images    GET /to-image/{token}-{n}.{ext}, one page at a time
//!  ├─ 4. Encode    lossless RGB or JPEG 50/75/95
//!  ├─ 5. Layout    fit & center into the page box, rescale links
//!  └─ 6. Compose   lopdf document → bytes / file
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume2pdf::{download_to_file, DownloadConfig, PageSize};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DownloadConfig::builder()
//!         .page_size(PageSize::Letter)
//!         .build()?;
//!     let stats = download_to_file("AbCdEf0123456789GhIjKlMn", "resume.pdf", &config).await?;
//!     eprintln!("{} pages, {} links", stats.total_pages, stats.total_links);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cache;
pub mod config;
pub mod download;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod token;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cache::{CacheStats, PdfCache};
pub use config::{DownloadConfig, DownloadConfigBuilder, ImageExtension, PageSize, Quality};
pub use download::{
    download, download_sync, download_to_file, download_with_cache, inspect, preview, save_pdf,
};
pub use error::Resume2PdfError;
pub use output::{DownloadStats, PageSummary, ResumePdf};
pub use pipeline::metadata::{LinkRect, PageMetadata, ResumeMetadata, Viewport};
pub use progress::{DownloadProgressCallback, NoopProgressCallback, ProgressCallback};
pub use token::RenderingToken;
