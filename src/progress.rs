//! Progress-callback trait for per-page download events.
//!
//! Inject an [`Arc<dyn DownloadProgressCallback>`] via
//! [`crate::config::DownloadConfigBuilder::progress_callback`] to receive
//! events as the pipeline fetches each page and assembles the PDF.
//!
//! Callers forward events wherever their host wants them: a terminal
//! progress bar, a job-status record, a log line. The library knows nothing
//! about how the host reports progress.
//!
//! # Example
//!
//! ```rust
//! use resume2pdf::{DownloadConfig, DownloadProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     fetched: AtomicUsize,
//! }
//!
//! impl DownloadProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, bytes: usize) {
//!         self.fetched.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} fetched ({} bytes)", page_num, total_pages, bytes);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { fetched: AtomicUsize::new(0) });
//!
//! let config = DownloadConfig::builder()
//!     .progress_callback(counter as Arc<dyn DownloadProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the download pipeline as it works through a resume.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Pages are fetched sequentially, so page events
/// arrive in order, but the assembly step runs on a blocking thread and
/// implementations must still be `Send + Sync`.
pub trait DownloadProgressCallback: Send + Sync {
    /// Called once the metadata is known, before any image is fetched.
    fn on_download_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before the image request for a page is sent.
    ///
    /// * `page_num`   : 1-indexed page number
    /// * `total_pages`: pages in the resume
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page image has been downloaded.
    ///
    /// * `bytes`: size of the downloaded image body
    fn on_page_complete(&self, page_num: usize, total_pages: usize, bytes: usize) {
        let _ = (page_num, total_pages, bytes);
    }

    /// Called once all images are in memory and PDF assembly begins.
    fn on_assembly_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called once the PDF has been produced.
    ///
    /// * `pdf_bytes`: size of the serialised PDF
    fn on_download_complete(&self, total_pages: usize, pdf_bytes: usize) {
        let _ = (total_pages, pdf_bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DownloadProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DownloadConfig`].
pub type ProgressCallback = Arc<dyn DownloadProgressCallback>;
