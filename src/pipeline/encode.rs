//! Image preparation: downloaded bytes → samples ready to embed in a PDF.
//!
//! PDF readers decode two image encodings natively that matter here:
//! `DCTDecode` (plain JPEG bytes) and raw samples behind `FlateDecode`.
//! Lossy quality tiers re-encode to JPEG so the file shrinks; the lossless
//! tier keeps 8-bit RGB samples and lets Flate do the compression.

use crate::config::Quality;
use crate::error::Resume2PdfError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use tracing::debug;

/// How [`PageImage::data`] is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    /// Baseline JPEG bytes, embedded verbatim with `/DCTDecode`.
    Dct,
    /// Uncompressed 8-bit RGB samples, Flate-compressed on embed.
    RawRgb,
}

/// A page image ready for embedding.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub encoding: ImageEncoding,
}

/// Decode `bytes` (page `page`, 1-indexed) and encode it for `quality`.
pub fn prepare_page(
    page: usize,
    bytes: &[u8],
    quality: Quality,
) -> Result<PageImage, Resume2PdfError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| Resume2PdfError::ImageDecodeFailed {
        page,
        detail: e.to_string(),
    })?;
    let rgb = flatten_onto_white(&decoded);
    let (width, height) = rgb.dimensions();

    let prepared = match quality.jpeg_quality() {
        Some(q) => {
            let mut buf = Vec::new();
            JpegEncoder::new_with_quality(&mut buf, q)
                .encode_image(&rgb)
                .map_err(|e| Resume2PdfError::ImageDecodeFailed {
                    page,
                    detail: format!("JPEG encoding failed: {e}"),
                })?;
            PageImage {
                width,
                height,
                data: buf,
                encoding: ImageEncoding::Dct,
            }
        }
        None => PageImage {
            width,
            height,
            data: rgb.into_raw(),
            encoding: ImageEncoding::RawRgb,
        },
    };

    debug!(
        "Page {}: {}×{} px, {} bytes ({:?})",
        page,
        width,
        height,
        prepared.data.len(),
        prepared.encoding
    );
    Ok(prepared)
}

/// Drop the alpha channel by compositing over a white page.
fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let a = a as u16;
            ((c as u16 * a + 255 * (255 - a) + 127) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}
