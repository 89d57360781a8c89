//! Download entry points.
//!
//! [`download`] runs the whole pipeline and returns the PDF in memory;
//! the other functions are thin variations on it (save to file, blocking,
//! cached, metadata only, first-page preview).

use crate::cache::PdfCache;
use crate::config::{DownloadConfig, ImageExtension};
use crate::error::Resume2PdfError;
use crate::output::{DownloadStats, ResumePdf};
use crate::pipeline::compose::{compose_pdf, ComposedPdf};
use crate::pipeline::encode::prepare_page;
use crate::pipeline::fetch::ResumeClient;
use crate::pipeline::metadata::ResumeMetadata;
use crate::token::RenderingToken;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Width of the image returned by [`preview`].
pub const PREVIEW_IMAGE_SIZE: u32 = 800;

/// Download the resume identified by `token` and assemble it into a PDF.
///
/// # Errors
/// - [`Resume2PdfError::InvalidToken`] before any request is made
/// - [`Resume2PdfError::ResumeNotFound`] on a 404 or an empty page list
/// - [`Resume2PdfError::DownloadFailed`] / [`Resume2PdfError::DownloadTimeout`]
///   for any other failed request
/// - [`Resume2PdfError::ImageDecodeFailed`] / [`Resume2PdfError::PdfGenerationFailed`]
///   during assembly
pub async fn download(
    token: impl AsRef<str>,
    config: &DownloadConfig,
) -> Result<ResumePdf, Resume2PdfError> {
    let total_start = Instant::now();
    let token = RenderingToken::parse(token.as_ref())?;
    let config = config.effective();
    info!(
        "Downloading resume {} ({}px {}, {} page, {} quality)",
        token,
        config.image_size,
        config.extension.as_str(),
        config.page_size.as_str(),
        config.quality.as_str()
    );

    // ── Step 1: Fetch metadata ───────────────────────────────────────────
    let fetch_start = Instant::now();
    let client = ResumeClient::new(&config)?;
    let metadata = client.fetch_metadata(&token).await?;
    let total_pages = metadata.page_count();

    if let Some(ref cb) = config.progress_callback {
        cb.on_download_start(total_pages);
    }

    // ── Step 2: Fetch page images, one at a time ─────────────────────────
    let images = client
        .fetch_images(&token, total_pages, config.progress_callback.as_ref())
        .await?;
    let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;
    let image_bytes: usize = images.iter().map(Vec::len).sum();
    info!(
        "Fetched {} pages ({} bytes) in {}ms",
        total_pages, image_bytes, fetch_duration_ms
    );

    // ── Step 3: Assemble the PDF ─────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_assembly_start(total_pages);
    }
    let compose_start = Instant::now();
    let total_links = metadata.link_count();
    let composed = assemble(token.clone(), metadata, images, &config).await?;
    let compose_duration_ms = compose_start.elapsed().as_millis() as u64;

    let stats = DownloadStats {
        total_pages,
        total_links,
        image_bytes,
        pdf_bytes: composed.bytes.len(),
        fetch_duration_ms,
        compose_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        cached: false,
    };

    info!(
        "Resume {} complete: {} pages, {} links, {} bytes, {}ms total",
        token, total_pages, total_links, stats.pdf_bytes, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_download_complete(total_pages, stats.pdf_bytes);
    }

    Ok(ResumePdf {
        token,
        bytes: composed.bytes,
        pages: composed.pages,
        stats,
    })
}

/// Like [`download`], but serve and populate `cache`.
pub async fn download_with_cache(
    token: impl AsRef<str>,
    config: &DownloadConfig,
    cache: &PdfCache,
) -> Result<ResumePdf, Resume2PdfError> {
    let parsed = RenderingToken::parse(token.as_ref())?;
    let key = config.cache_key(&parsed);

    if let Some(mut hit) = cache.get(&key) {
        debug!("Cache hit: {}", key);
        hit.stats.cached = true;
        return Ok(hit);
    }

    let pdf = download(parsed.as_str(), config).await?;
    cache.insert(key, pdf.clone());
    Ok(pdf)
}

/// Download a resume and write it to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn download_to_file(
    token: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &DownloadConfig,
) -> Result<DownloadStats, Resume2PdfError> {
    let pdf = download(token, config).await?;
    save_pdf(&pdf.bytes, output_path.as_ref()).await?;
    Ok(pdf.stats)
}

/// Synchronous wrapper around [`download`].
///
/// Creates a temporary tokio runtime internally.
pub fn download_sync(
    token: impl AsRef<str>,
    config: &DownloadConfig,
) -> Result<ResumePdf, Resume2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Resume2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(download(token, config))
}

/// Fetch the resume's metadata without downloading any image.
pub async fn inspect(
    token: impl AsRef<str>,
    config: &DownloadConfig,
) -> Result<ResumeMetadata, Resume2PdfError> {
    let token = RenderingToken::parse(token.as_ref())?;
    ResumeClient::new(config)?.fetch_metadata(&token).await
}

/// Fetch a small JPEG of the first page.
///
/// The metadata is fetched first so an unknown token is reported as
/// [`Resume2PdfError::ResumeNotFound`] rather than as an image error.
pub async fn preview(
    token: impl AsRef<str>,
    config: &DownloadConfig,
) -> Result<Vec<u8>, Resume2PdfError> {
    let token = RenderingToken::parse(token.as_ref())?;
    let client = ResumeClient::new(config)?;
    client.fetch_metadata(&token).await?;
    client
        .fetch_image_with(&token, 1, ImageExtension::Jpeg, PREVIEW_IMAGE_SIZE)
        .await
}

/// Write `bytes` to `path` atomically, creating parent directories.
pub async fn save_pdf(bytes: &[u8], path: &Path) -> Result<(), Resume2PdfError> {
    let write_err = |source| Resume2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Decode, re-encode and compose on a blocking thread; image codecs and
/// Flate compression are CPU-bound.
async fn assemble(
    token: RenderingToken,
    metadata: ResumeMetadata,
    images: Vec<Vec<u8>>,
    config: &DownloadConfig,
) -> Result<ComposedPdf, Resume2PdfError> {
    if images.len() != metadata.page_count() {
        return Err(Resume2PdfError::PageCountMismatch {
            expected: metadata.page_count(),
            actual: images.len(),
        });
    }
    let quality = config.quality;
    let page_size = config.page_size;

    tokio::task::spawn_blocking(move || {
        let pages = metadata
            .pages
            .into_iter()
            .zip(images.iter())
            .enumerate()
            .map(|(i, (meta, bytes))| Ok((meta, prepare_page(i + 1, bytes, quality)?)))
            .collect::<Result<Vec<_>, Resume2PdfError>>()?;
        compose_pdf(&token, pages, page_size)
    })
    .await
    .map_err(|e| Resume2PdfError::Internal(format!("assembly task failed: {e}")))?
}
