//! PDF assembly: one page per image, link annotations on top.
//!
//! Each page is built from three objects:
//!
//! * an image XObject (`/DCTDecode` JPEG or Flate-compressed RGB samples),
//! * a content stream drawing it: `q w 0 0 h x y cm /Im0 Do Q`,
//! * one `/Link` annotation per hotspot, with a `/URI` action.
//!
//! Object numbering, cross-reference table and serialisation are left to
//! `lopdf`.

use crate::config::PageSize;
use crate::error::Resume2PdfError;
use crate::output::PageSummary;
use crate::pipeline::encode::{ImageEncoding, PageImage};
use crate::pipeline::layout::{self, LinkTransform, Rect};
use crate::pipeline::metadata::PageMetadata;
use crate::token::RenderingToken;
use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

const IMAGE_NAME: &str = "Im0";
const PRODUCER: &str = concat!("resume2pdf ", env!("CARGO_PKG_VERSION"));

/// The serialised document plus per-page facts for reporting.
#[derive(Debug)]
pub struct ComposedPdf {
    pub bytes: Vec<u8>,
    pub pages: Vec<PageSummary>,
}

/// Assemble `pages` into a PDF laid out for `page_size`.
pub fn compose_pdf(
    token: &RenderingToken,
    pages: Vec<(PageMetadata, PageImage)>,
    page_size: PageSize,
) -> Result<ComposedPdf, Resume2PdfError> {
    if pages.is_empty() {
        return Err(Resume2PdfError::PdfGenerationFailed(
            "no pages to assemble".into(),
        ));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(pages.len());
    let mut summaries = Vec::with_capacity(pages.len());

    for (i, (meta, image)) in pages.into_iter().enumerate() {
        let page_num = i + 1;
        let natural = layout::natural_page_size(image.width, image.height, meta.viewport);
        let placement = layout::place(natural, page_size);
        let drawn = placement.content_rect(natural);
        let links = LinkTransform::new(natural, meta.viewport, &placement);

        let image_bytes = image.data.len();
        let image_id = doc.add_object(image_stream(image)?);
        let content_id = doc.add_object(draw_stream(&drawn)?);

        let annots: Vec<Object> = meta
            .links
            .iter()
            .map(|link| {
                let rect = links.apply(link);
                Object::Reference(doc.add_object(link_annotation(&link.url, &rect)))
            })
            .collect();

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => pdf_array(&[0.0, 0.0, placement.page.width, placement.page.height]),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { IMAGE_NAME => image_id },
            },
        };
        if !annots.is_empty() {
            page.set("Annots", annots);
        }
        kids.push(Object::Reference(doc.add_object(page)));

        debug!(
            "Page {}: {:.1}×{:.1} pt, scale {:.4}, {} links",
            page_num,
            placement.page.width,
            placement.page.height,
            placement.scale,
            meta.links.len()
        );
        summaries.push(PageSummary {
            page_num,
            width_pt: placement.page.width,
            height_pt: placement.page.height,
            links: meta.links.len(),
            image_bytes,
        });
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = add_info(&mut doc, token);
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| Resume2PdfError::PdfGenerationFailed(format!("serialisation: {e}")))?;

    Ok(ComposedPdf {
        bytes,
        pages: summaries,
    })
}

fn image_stream(image: PageImage) -> Result<Stream, Resume2PdfError> {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    match image.encoding {
        ImageEncoding::Dct => {
            dict.set("Filter", "DCTDecode");
            Ok(Stream::new(dict, image.data).with_compression(false))
        }
        ImageEncoding::RawRgb => {
            let mut stream = Stream::new(dict, image.data);
            stream.compress()?;
            Ok(stream)
        }
    }
}

fn draw_stream(drawn: &Rect) -> Result<Stream, Resume2PdfError> {
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(drawn.width),
                    real(0.0),
                    real(0.0),
                    real(drawn.height),
                    real(drawn.x),
                    real(drawn.y),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let mut stream = Stream::new(Dictionary::new(), content.encode()?);
    stream.compress()?;
    Ok(stream)
}

fn link_annotation(url: &str, rect: &Rect) -> Dictionary {
    dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => pdf_array(&rect.to_pdf_array()),
        "Border" => vec![0.into(), 0.into(), 0.into()],
        "A" => dictionary! {
            "Type" => "Action",
            "S" => "URI",
            "URI" => Object::string_literal(url),
        },
    }
}

fn add_info(doc: &mut Document, token: &RenderingToken) -> ObjectId {
    let created = Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
    doc.add_object(dictionary! {
        "Title" => Object::string_literal(token.as_str()),
        "Producer" => Object::string_literal(PRODUCER),
        "CreationDate" => Object::string_literal(created),
    })
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn pdf_array(values: &[f64]) -> Vec<Object> {
    values.iter().copied().map(real).collect()
}
