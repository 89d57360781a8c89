//! Resume metadata returned by the rendering service.
//!
//! The `/meta/{token}` endpoint answers with one entry per rendered page:
//! the page's viewport in points and the hyperlink hotspots laid over it.
//! Link rectangles use the PDF convention (origin bottom-left), so they can
//! be scaled straight into page space.

use crate::error::Resume2PdfError;
use crate::token::RenderingToken;
use serde::{Deserialize, Serialize};

/// Page size reported by the service, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// A hyperlink hotspot in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRect {
    pub url: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Metadata for one rendered page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub viewport: Viewport,
    #[serde(default)]
    pub links: Vec<LinkRect>,
}

/// The full metadata document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeMetadata {
    #[serde(default)]
    pub pages: Vec<PageMetadata>,
}

impl ResumeMetadata {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn link_count(&self) -> usize {
        self.pages.iter().map(|p| p.links.len()).sum()
    }
}

/// Decode and validate a metadata response body.
///
/// An empty page list means the service does not know the token and is
/// reported as [`Resume2PdfError::ResumeNotFound`].
pub fn parse_metadata(
    token: &RenderingToken,
    body: &[u8],
) -> Result<ResumeMetadata, Resume2PdfError> {
    let metadata: ResumeMetadata =
        serde_json::from_slice(body).map_err(|e| Resume2PdfError::InvalidMetadata {
            detail: e.to_string(),
        })?;

    if metadata.pages.is_empty() {
        return Err(Resume2PdfError::ResumeNotFound {
            token: token.to_string(),
        });
    }

    for (i, page) in metadata.pages.iter().enumerate() {
        let vp = page.viewport;
        if !(vp.width > 0.0 && vp.height > 0.0) {
            return Err(Resume2PdfError::InvalidMetadata {
                detail: format!(
                    "page {} has a non-positive viewport ({} × {})",
                    i + 1,
                    vp.width,
                    vp.height
                ),
            });
        }
    }

    Ok(metadata)
}
