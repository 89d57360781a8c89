//! CLI binary for resume2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `DownloadConfig`, runs the download and saves the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use resume2pdf::{
    download, inspect, preview, save_pdf, DownloadConfig, DownloadProgressCallback,
    ImageExtension, PageSize, ProgressCallback, Quality,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while metadata is fetched, then a
/// page counter while images download, then a spinner during assembly.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Fetching metadata…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    /// Remove the bar so an error message is not drawn over a live spinner.
    fn abandon(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl DownloadProgressCallback for CliProgressCallback {
    fn on_download_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>2}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Fetching");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Resume has {total_pages} pages"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, bytes: usize) {
        self.bar.println(format!(
            "  {} Page {:>2}/{:<2}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{:>8} KiB", bytes / 1024)),
        ));
        self.bar.inc(1);
    }

    fn on_assembly_start(&self, _total_pages: usize) {
        self.bar.set_prefix("Assembling");
        self.bar.set_message("building PDF…");
    }

    fn on_download_complete(&self, total_pages: usize, pdf_bytes: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages assembled  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!("{} KiB", pdf_bytes / 1024)),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Download to <token>.pdf in the current directory
  resume2pdf AbCdEf0123456789GhIjKlMn

  # US Letter, smaller file
  resume2pdf --page-size letter --quality medium AbCdEf0123456789GhIjKlMn -o cv.pdf

  # Keep the page size the service reports
  resume2pdf --page-size original AbCdEf0123456789GhIjKlMn

  # Show page sizes and links without downloading images
  resume2pdf --inspect-only --json AbCdEf0123456789GhIjKlMn

  # Save a small JPEG of the first page
  resume2pdf --preview first-page.jpg AbCdEf0123456789GhIjKlMn

WHERE IS MY TOKEN?
  The rendering token is the 24-character id in the resume's share/download
  link on resume.io.

QUALITY:
  low      JPEG 50 %
  medium   JPEG 75 %
  high     JPEG 95 %
  max      lossless (forces PNG images of at least 4500 px)
"#;

/// Download a resume.io resume as a PDF with working links.
#[derive(Parser, Debug)]
#[command(
    name = "resume2pdf",
    version,
    about = "Download a resume.io resume as a PDF with working links",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// 24-character rendering token.
    token: String,

    /// Write the PDF to this file. Default: <token>.pdf.
    #[arg(short, long, env = "RESUME2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Requested image width in pixels.
    #[arg(long, env = "RESUME2PDF_IMAGE_SIZE", default_value_t = 3000,
          value_parser = clap::value_parser!(u32).range(1..))]
    image_size: u32,

    /// Image format requested from the service.
    #[arg(long, env = "RESUME2PDF_EXTENSION", value_enum, default_value = "jpeg")]
    extension: ExtensionArg,

    /// Page size of the PDF.
    #[arg(long, env = "RESUME2PDF_PAGE_SIZE", value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Image quality.
    #[arg(long, env = "RESUME2PDF_QUALITY", value_enum, default_value = "max")]
    quality: QualityArg,

    /// Per-request timeout in seconds.
    #[arg(long, env = "RESUME2PDF_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Rendering service root URL.
    #[arg(long, env = "RESUME2PDF_BASE_URL", default_value = resume2pdf::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Print resume metadata only, no download.
    #[arg(long)]
    inspect_only: bool,

    /// Save a JPEG preview of the first page to this file and exit.
    #[arg(long, value_name = "FILE")]
    preview: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, env = "RESUME2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "RESUME2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RESUME2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RESUME2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ExtensionArg {
    Jpeg,
    Png,
    Webp,
}

impl From<ExtensionArg> for ImageExtension {
    fn from(v: ExtensionArg) -> Self {
        match v {
            ExtensionArg::Jpeg => ImageExtension::Jpeg,
            ExtensionArg::Png => ImageExtension::Png,
            ExtensionArg::Webp => ImageExtension::Webp,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum PageSizeArg {
    Original,
    A4,
    Letter,
    Legal,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::Original => PageSize::Original,
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::Legal => PageSize::Legal,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum QualityArg {
    Low,
    Medium,
    High,
    Max,
}

impl From<QualityArg> for Quality {
    fn from(v: QualityArg) -> Self {
        match v {
            QualityArg::Low => Quality::Low,
            QualityArg::Medium => Quality::Medium,
            QualityArg::High => Quality::High,
            QualityArg::Max => Quality::Max,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; --verbose brings them back.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let config = build_config(&cli, None)?;
        let meta = inspect(&cli.token, &config)
            .await
            .context("Failed to fetch resume metadata")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("Token:   {}", cli.token.trim());
            println!("Pages:   {}", meta.page_count());
            for (i, page) in meta.pages.iter().enumerate() {
                println!(
                    "  Page {}: {} × {} pt, {} links",
                    i + 1,
                    page.viewport.width,
                    page.viewport.height,
                    page.links.len()
                );
                for link in &page.links {
                    println!("    {}", link.url);
                }
            }
        }
        return Ok(());
    }

    // ── Preview mode ─────────────────────────────────────────────────────
    if let Some(ref path) = cli.preview {
        let config = build_config(&cli, None)?;
        let jpeg = preview(&cli.token, &config)
            .await
            .context("Failed to fetch preview")?;
        tokio::fs::write(path, &jpeg)
            .await
            .with_context(|| format!("Failed to write preview to {}", path.display()))?;
        if !cli.quiet {
            eprintln!("{} preview  →  {}", green("✔"), bold(&path.display().to_string()));
        }
        return Ok(());
    }

    // ── Download ─────────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let progress_cb = progress
        .clone()
        .map(|p| p as Arc<dyn DownloadProgressCallback>);
    let config = build_config(&cli, progress_cb)?;

    let pdf = match download(&cli.token, &config).await {
        Ok(pdf) => pdf,
        Err(e) => {
            if let Some(ref p) = progress {
                p.abandon();
            }
            return Err(e).context("Download failed");
        }
    };

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.pdf", pdf.token)));
    save_pdf(&pdf.bytes, &output_path)
        .await
        .context("Failed to save PDF")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&pdf).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} pages  {} links  {}ms  →  {}",
            green("✔"),
            pdf.stats.total_pages,
            pdf.stats.total_links,
            pdf.stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `DownloadConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<DownloadConfig> {
    let mut builder = DownloadConfig::builder()
        .image_size(cli.image_size)
        .extension(cli.extension.clone().into())
        .page_size(cli.page_size.clone().into())
        .quality(cli.quality.clone().into())
        .timeout_secs(cli.timeout)
        .base_url(cli.base_url.clone());

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
