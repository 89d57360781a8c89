//! Integration tests against an in-process stand-in for the rendering
//! service.
//!
//! The stub serves `/meta/:token` and `/to-image/:file` on an ephemeral
//! port, generating page images on the fly, and records every request it
//! receives so tests can assert on URLs and ordering.
//!
//! Run with:
//!   cargo test --test service -- --nocapture

use axum::extract::{Path, RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use image::{ImageFormat, Rgb, RgbImage};
use lopdf::{Document, Object};
use resume2pdf::{
    download, download_to_file, download_with_cache, inspect, preview, DownloadConfig,
    DownloadProgressCallback, ImageExtension, PageSize, PdfCache, Quality, Resume2PdfError,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

const TOKEN: &str = "AbCdEf0123456789GhIjKlMn";
const EMPTY_TOKEN: &str = "EmptyEmptyEmptyEmpty0000";
const BROKEN_TOKEN: &str = "Broken000000000000000000";
const SLOW_TOKEN: &str = "Slow00000000000000000000";

// ── Stub service ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Stub {
    /// Metadata document per token; unknown tokens get a 404.
    resumes: HashMap<String, Value>,
    /// `path?query` of every request, in arrival order.
    requests: Mutex<Vec<String>>,
}

impl Stub {
    fn record(&self, path: String, query: Option<String>) {
        let line = match query {
            Some(q) => format!("{path}?{q}"),
            None => path,
        };
        self.requests.lock().unwrap().push(line);
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn meta(
    State(stub): State<Arc<Stub>>,
    Path(token): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    stub.record(format!("/meta/{token}"), query);
    if token == BROKEN_TOKEN {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    if token == SLOW_TOKEN {
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    }
    match stub.resumes.get(&token) {
        Some(doc) => axum::Json(doc.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn to_image(
    State(stub): State<Arc<Stub>>,
    Path(file): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    stub.record(format!("/to-image/{file}"), query);

    // {token}-{page}.{ext}
    let Some((stem, ext)) = file.rsplit_once('.') else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let Some((token, page)) = stem.rsplit_once('-') else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let (Some(doc), Ok(page)) = (stub.resumes.get(token), page.parse::<usize>()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(vp) = doc["pages"].get(page.wrapping_sub(1)).map(|p| &p["viewport"]) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    // Twice the viewport, like a 144 dpi rendering.
    let width = (vp["width"].as_f64().unwrap_or(100.0) * 2.0) as u32;
    let height = (vp["height"].as_f64().unwrap_or(100.0) * 2.0) as u32;
    let format = match ext {
        "png" => ImageFormat::Png,
        "jpeg" => ImageFormat::Jpeg,
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    let shade = (page * 40 % 255) as u8;
    let img = RgbImage::from_pixel(width, height, Rgb([shade, 128, 255 - shade]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();

    (
        [(header::CONTENT_TYPE, format!("image/{ext}"))],
        buf.into_inner(),
    )
        .into_response()
}

fn sample_resumes() -> HashMap<String, Value> {
    let mut resumes = HashMap::new();
    resumes.insert(
        TOKEN.to_string(),
        json!({
            "pages": [
                {
                    "viewport": { "width": 595.0, "height": 842.0 },
                    "links": [
                        { "url": "https://example.com/portfolio", "x": 50.0, "y": 700.0, "width": 120.0, "height": 14.0 },
                        { "url": "mailto:jane@example.com", "x": 50.0, "y": 680.0, "width": 140.0, "height": 14.0 }
                    ]
                },
                {
                    "viewport": { "width": 595.0, "height": 842.0 },
                    "links": []
                },
                {
                    "viewport": { "width": 595.0, "height": 842.0 }
                }
            ]
        }),
    );
    resumes.insert(EMPTY_TOKEN.to_string(), json!({ "pages": [] }));
    resumes
}

/// Start the stub on an ephemeral port and return it with its base URL.
async fn start_stub() -> (Arc<Stub>, String) {
    let stub = Arc::new(Stub {
        resumes: sample_resumes(),
        ..Default::default()
    });
    let app = Router::new()
        .route("/meta/:token", get(meta))
        .route("/to-image/:file", get(to_image))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (stub, format!("http://{addr}"))
}

fn config_for(base_url: &str) -> DownloadConfig {
    DownloadConfig::builder()
        .base_url(base_url)
        .extension(ImageExtension::Jpeg)
        .quality(Quality::Medium)
        .image_size(1200)
        .timeout_secs(10)
        .build()
        .unwrap()
}

// ── PDF inspection helpers ───────────────────────────────────────────────────

fn as_f64(obj: &Object) -> f64 {
    match obj {
        Object::Integer(i) => *i as f64,
        Object::Real(r) => *r as f64,
        other => panic!("not a number: {other:?}"),
    }
}

fn media_box(doc: &Document, page_id: lopdf::ObjectId) -> Vec<f64> {
    let page = doc.get_dictionary(page_id).unwrap();
    page.get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(as_f64)
        .collect()
}

fn link_uris(doc: &Document, page_id: lopdf::ObjectId) -> Vec<String> {
    let page = doc.get_dictionary(page_id).unwrap();
    let Ok(annots) = page.get(b"Annots") else {
        return vec![];
    };
    let annots = match annots {
        Object::Reference(id) => doc.get_object(*id).unwrap().as_array().unwrap().clone(),
        other => other.as_array().unwrap().clone(),
    };
    annots
        .iter()
        .map(|a| {
            let annot = match a {
                Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
                other => other.as_dict().unwrap(),
            };
            assert_eq!(annot.get(b"Subtype").unwrap().as_name().unwrap(), b"Link");
            let action = annot.get(b"A").unwrap().as_dict().unwrap();
            let uri = action.get(b"URI").unwrap().as_str().unwrap();
            String::from_utf8_lossy(uri).into_owned()
        })
        .collect()
}

// ── Recording progress callback ──────────────────────────────────────────────

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl RecordingCallback {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl DownloadProgressCallback for RecordingCallback {
    fn on_download_start(&self, total_pages: usize) {
        self.push(format!("start {total_pages}"));
    }
    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.push(format!("page-start {page_num}"));
    }
    fn on_page_complete(&self, page_num: usize, _total: usize, _bytes: usize) {
        self.push(format!("page-done {page_num}"));
    }
    fn on_assembly_start(&self, _total_pages: usize) {
        self.push("assemble".into());
    }
    fn on_download_complete(&self, total_pages: usize, _pdf_bytes: usize) {
        self.push(format!("done {total_pages}"));
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn downloads_every_page_with_links() {
    let (stub, base) = start_stub().await;
    let config = DownloadConfig::builder()
        .base_url(&base)
        .extension(ImageExtension::Jpeg)
        .quality(Quality::Medium)
        .page_size(PageSize::Letter)
        .build()
        .unwrap();

    let pdf = download(TOKEN, &config).await.unwrap();
    assert_eq!(pdf.stats.total_pages, 3);
    assert_eq!(pdf.stats.total_links, 2);
    assert!(!pdf.stats.cached);
    assert_eq!(pdf.pages.len(), 3);
    assert_eq!(pdf.pages[0].links, 2);
    assert!(pdf.bytes.starts_with(b"%PDF-"));

    let doc = Document::load_mem(&pdf.bytes).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 3);

    let first = pages[&1];
    let mb = media_box(&doc, first);
    assert!((mb[2] - 612.0).abs() < 0.01 && (mb[3] - 792.0).abs() < 0.01);
    assert_eq!(
        link_uris(&doc, first),
        vec!["https://example.com/portfolio", "mailto:jane@example.com"]
    );
    assert!(link_uris(&doc, pages[&2]).is_empty());

    // one metadata request, then one image request per page
    let requests = stub.requests();
    assert_eq!(requests.len(), 4);
    assert!(requests[0].starts_with(&format!("/meta/{TOKEN}?cache=")));
    for (i, req) in requests[1..].iter().enumerate() {
        assert!(
            req.starts_with(&format!("/to-image/{TOKEN}-{}.jpeg?cache=", i + 1)),
            "unexpected request {req}"
        );
    }
}

#[tokio::test]
async fn all_requests_share_one_cache_stamp() {
    let (stub, base) = start_stub().await;
    download(TOKEN, &config_for(&base)).await.unwrap();

    let stamps: Vec<String> = stub
        .requests()
        .iter()
        .map(|r| {
            let query = r.split_once('?').unwrap().1;
            query
                .split('&')
                .find_map(|kv| kv.strip_prefix("cache="))
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(stamps.len(), 4);
    assert!(stamps.iter().all(|s| s == &stamps[0]));
    assert!(stamps[0].ends_with('Z'));
}

#[tokio::test]
async fn max_quality_requests_large_png() {
    let (stub, base) = start_stub().await;
    let config = DownloadConfig::builder()
        .base_url(&base)
        .extension(ImageExtension::Jpeg)
        .image_size(1000)
        .quality(Quality::Max)
        .build()
        .unwrap();

    let pdf = download(TOKEN, &config).await.unwrap();
    assert_eq!(pdf.stats.total_pages, 3);

    let image_requests: Vec<String> = stub
        .requests()
        .into_iter()
        .filter(|r| r.starts_with("/to-image/"))
        .collect();
    assert_eq!(image_requests.len(), 3);
    for req in &image_requests {
        assert!(req.contains(".png?"), "expected png: {req}");
        assert!(req.ends_with("&size=4500"), "expected size 4500: {req}");
    }

    // lossless pages are Flate-compressed RGB, never DCT
    let doc = Document::load_mem(&pdf.bytes).unwrap();
    let has_dct = doc.objects.values().any(|obj| {
        obj.as_stream()
            .ok()
            .and_then(|s| s.dict.get(b"Filter").ok())
            .and_then(|f| f.as_name().ok())
            == Some(b"DCTDecode".as_slice())
    });
    assert!(!has_dct);
}

#[tokio::test]
async fn original_page_size_keeps_natural_box() {
    let (_stub, base) = start_stub().await;
    let config = DownloadConfig::builder()
        .base_url(&base)
        .extension(ImageExtension::Png)
        .quality(Quality::High)
        .page_size(PageSize::Original)
        .build()
        .unwrap();

    let pdf = download(TOKEN, &config).await.unwrap();
    // 1190 px wide over a 595 pt viewport: 144 dpi, so back to 595 × 842 pt
    for page in &pdf.pages {
        assert!((page.width_pt - 595.0).abs() < 1.0, "{}", page.width_pt);
        assert!((page.height_pt - 842.0).abs() < 1.0, "{}", page.height_pt);
    }
}

#[tokio::test]
async fn pages_are_fetched_sequentially_in_order() {
    let (_stub, base) = start_stub().await;
    let recorder = Arc::new(RecordingCallback::default());
    let config = DownloadConfig::builder()
        .base_url(&base)
        .extension(ImageExtension::Jpeg)
        .quality(Quality::Low)
        .progress_callback(recorder.clone() as Arc<dyn DownloadProgressCallback>)
        .build()
        .unwrap();

    download(TOKEN, &config).await.unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start 3",
            "page-start 1",
            "page-done 1",
            "page-start 2",
            "page-done 2",
            "page-start 3",
            "page-done 3",
            "assemble",
            "done 3",
        ]
    );
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let (stub, base) = start_stub().await;
    let err = download("Unknown00000000000000000", &config_for(&base))
        .await
        .unwrap_err();
    assert!(matches!(err, Resume2PdfError::ResumeNotFound { .. }));
    assert_eq!(err.status_code(), 404);
    // no image requested after the metadata miss
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn empty_page_list_is_not_found() {
    let (stub, base) = start_stub().await;
    let err = download(EMPTY_TOKEN, &config_for(&base)).await.unwrap_err();
    assert!(matches!(err, Resume2PdfError::ResumeNotFound { .. }));
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn server_error_is_download_failure() {
    let (_stub, base) = start_stub().await;
    let err = download(BROKEN_TOKEN, &config_for(&base))
        .await
        .unwrap_err();
    match err {
        Resume2PdfError::DownloadFailed { status, ref url, .. } => {
            assert_eq!(status, Some(500));
            assert!(url.contains(BROKEN_TOKEN));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn slow_service_times_out() {
    let (_stub, base) = start_stub().await;
    let config = DownloadConfig::builder()
        .base_url(&base)
        .timeout_secs(1)
        .build()
        .unwrap();

    let err = download(SLOW_TOKEN, &config).await.unwrap_err();
    match err {
        Resume2PdfError::DownloadTimeout { secs, ref url } => {
            assert_eq!(secs, 1);
            assert!(url.contains(&format!("/meta/{SLOW_TOKEN}")));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_service_is_download_failure() {
    // bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = download(TOKEN, &config_for(&format!("http://{addr}")))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Resume2PdfError::DownloadFailed { status: None, .. }
    ));
}

#[tokio::test]
async fn cached_download_skips_the_service() {
    let (stub, base) = start_stub().await;
    let config = config_for(&base);
    let cache = PdfCache::default();

    let first = download_with_cache(TOKEN, &config, &cache).await.unwrap();
    assert!(!first.stats.cached);
    let after_first = stub.requests().len();

    let second = download_with_cache(TOKEN, &config, &cache).await.unwrap();
    assert!(second.stats.cached);
    assert_eq!(second.bytes, first.bytes);
    assert_eq!(stub.requests().len(), after_first);

    // a different page size is a different entry
    let letter = DownloadConfig::builder()
        .base_url(&base)
        .extension(ImageExtension::Jpeg)
        .quality(Quality::Medium)
        .image_size(1200)
        .page_size(PageSize::Letter)
        .build()
        .unwrap();
    let third = download_with_cache(TOKEN, &letter, &cache).await.unwrap();
    assert!(!third.stats.cached);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn download_to_file_writes_pdf() {
    let (_stub, base) = start_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/resume.pdf");

    let stats = download_to_file(TOKEN, &path, &config_for(&base))
        .await
        .unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), stats.pdf_bytes);
    assert_eq!(Document::load_mem(&bytes).unwrap().get_pages().len(), 3);
}

#[tokio::test]
async fn inspect_fetches_metadata_only() {
    let (stub, base) = start_stub().await;
    let meta = inspect(format!("  {TOKEN}\n"), &config_for(&base))
        .await
        .unwrap();
    assert_eq!(meta.page_count(), 3);
    assert_eq!(meta.link_count(), 2);
    assert_eq!(meta.pages[0].links[1].url, "mailto:jane@example.com");
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn preview_returns_small_first_page_jpeg() {
    let (stub, base) = start_stub().await;
    let jpeg = preview(TOKEN, &config_for(&base)).await.unwrap();
    assert_eq!(
        image::guess_format(&jpeg).unwrap(),
        image::ImageFormat::Jpeg
    );

    let requests = stub.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].starts_with(&format!("/to-image/{TOKEN}-1.jpeg?")));
    assert!(requests[1].ends_with("&size=800"));
}
