//! Result types returned by the download entry points.

use crate::token::RenderingToken;
use serde::Serialize;

/// A downloaded resume.
#[derive(Debug, Clone, Serialize)]
pub struct ResumePdf {
    pub token: RenderingToken,
    /// The serialised PDF. Omitted from JSON output.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub pages: Vec<PageSummary>,
    pub stats: DownloadStats,
}

/// Facts about one assembled page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    /// 1-indexed page number.
    pub page_num: usize,
    pub width_pt: f64,
    pub height_pt: f64,
    /// Link annotations placed on the page.
    pub links: usize,
    /// Size of the embedded image data.
    pub image_bytes: usize,
}

/// Timings and sizes for one download.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DownloadStats {
    pub total_pages: usize,
    pub total_links: usize,
    /// Sum of downloaded image bodies.
    pub image_bytes: usize,
    pub pdf_bytes: usize,
    pub fetch_duration_ms: u64,
    pub compose_duration_ms: u64,
    pub total_duration_ms: u64,
    /// True when the PDF came from a [`crate::cache::PdfCache`].
    pub cached: bool,
}
