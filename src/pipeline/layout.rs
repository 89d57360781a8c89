//! Page geometry: where each image lands on its PDF page and where the
//! link hotspots go.
//!
//! All functions here are pure arithmetic in points (1/72 inch).
//!
//! ```text
//!   image px ──natural_page_size──▶ natural box ──fit_and_center──▶ target box
//!   viewport link ──────────────LinkTransform─────────────────────▶ page rect
//! ```

use crate::config::PageSize;
use crate::pipeline::metadata::{LinkRect, Viewport};

/// Lowest resolution assumed for a downloaded image.
pub const MIN_DPI: u32 = 72;

/// A width × height box in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub width: f64,
    pub height: f64,
}

impl PageBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in page space, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// `[llx lly urx ury]` as used by `/Rect` and `/MediaBox`.
    pub fn to_pdf_array(&self) -> [f64; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }
}

/// Where scaled content sits inside its page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// The final page box (MediaBox).
    pub page: PageBox,
    /// Uniform scale applied to the content.
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Placement {
    /// Content drawn at its natural size on a page of the same size.
    pub fn identity(content: PageBox) -> Self {
        Self {
            page: content,
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// The rectangle the content occupies on the page.
    pub fn content_rect(&self, content: PageBox) -> Rect {
        Rect {
            x: self.offset_x,
            y: self.offset_y,
            width: content.width * self.scale,
            height: content.height * self.scale,
        }
    }
}

/// Resolution of an image whose width spans `viewport_width` points.
pub fn image_dpi(image_width_px: u32, viewport_width: f64) -> u32 {
    let dpi = (image_width_px as f64 / viewport_width * 72.0).floor();
    if dpi.is_finite() && dpi > MIN_DPI as f64 {
        dpi as u32
    } else {
        MIN_DPI
    }
}

/// The page box an image occupies at its own resolution.
///
/// The resolution is derived from the viewport width so the page comes out
/// (nearly) the size the service reported, never upsampled below 72 dpi.
pub fn natural_page_size(image_width_px: u32, image_height_px: u32, viewport: Viewport) -> PageBox {
    let dpi = image_dpi(image_width_px, viewport.width) as f64;
    PageBox::new(
        image_width_px as f64 * 72.0 / dpi,
        image_height_px as f64 * 72.0 / dpi,
    )
}

/// Scale `content` uniformly to fit inside `target` and centre it.
pub fn fit_and_center(content: PageBox, target: PageBox) -> Placement {
    let scale = (target.width / content.width).min(target.height / content.height);
    let scaled_w = content.width * scale;
    let scaled_h = content.height * scale;
    Placement {
        page: target,
        scale,
        offset_x: (target.width - scaled_w) / 2.0,
        offset_y: (target.height - scaled_h) / 2.0,
    }
}

/// Placement of `content` for the configured page size.
pub fn place(content: PageBox, page_size: PageSize) -> Placement {
    match page_size.dimensions() {
        Some((w, h)) => fit_and_center(content, PageBox::new(w, h)),
        None => Placement::identity(content),
    }
}

/// Linear map from viewport coordinates to page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl LinkTransform {
    /// Rescale by the height ratio between the natural page and the
    /// viewport, then apply the placement's scale and centring offsets.
    pub fn new(natural: PageBox, viewport: Viewport, placement: &Placement) -> Self {
        let height_ratio = natural.height / viewport.height;
        Self {
            scale: height_ratio * placement.scale,
            offset_x: placement.offset_x,
            offset_y: placement.offset_y,
        }
    }

    pub fn apply(&self, link: &LinkRect) -> Rect {
        Rect {
            x: link.x * self.scale + self.offset_x,
            y: link.y * self.scale + self.offset_y,
            width: link.width * self.scale,
            height: link.height * self.scale,
        }
    }
}
