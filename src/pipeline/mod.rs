//! Pipeline stages for turning a rendered resume into a PDF.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ metadata ──▶ encode ──▶ layout ──▶ compose
//! (HTTP)     (JSON)      (image)    (points)   (lopdf)
//! ```
//!
//! 1. [`fetch`]   : metadata and page images from the rendering service,
//!    images one at a time in page order
//! 2. [`metadata`]: decode the page list; an empty list means "not found"
//! 3. [`encode`]  : decode each image and re-encode it for the quality tier
//! 4. [`layout`]  : fit-and-center page boxes and link rectangle mapping
//! 5. [`compose`] : build and serialise the PDF document

pub mod compose;
pub mod encode;
pub mod fetch;
pub mod layout;
pub mod metadata;
