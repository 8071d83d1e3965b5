//! CLI binary for cvpress.
//!
//! A thin shim over the library crate that loads a record, lays out the
//! previews, maps CLI flags to `AssemblyConfig` and writes the PDF.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use cvpress::pipeline::capture::capture_surface;
use cvpress::{
    default_filename, generate_to_dir, plan, render_previews, AssemblyConfig,
    AssemblyProgressCallback, BitmapSurface, CvRecord, DocumentKind, DocumentSource,
    ProgressCallback, StatusSignal, SurfaceRegistry, Theme,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while a surface is being captured,
/// one log line per captured and paginated source.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_generation_start
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:24.green/238}] {pos}/{len}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl AssemblyProgressCallback for CliProgressCallback {
    fn on_generation_start(&self, kind: DocumentKind, source_count: usize) {
        self.bar.set_length(source_count as u64);
        self.bar.set_prefix("Capturing");
        self.bar.set_message(kind.to_string());
    }

    fn on_source_captured(&self, handle: &str, width: u32, height: u32) {
        self.bar.println(format!(
            "  {} {:<22} {}",
            green("✓"),
            handle,
            dim(&format!("{width}×{height} px")),
        ));
    }

    fn on_source_paginated(&self, handle: &str, page_count: usize) {
        self.bar.println(format!(
            "  {} {:<22} {}",
            cyan("▤"),
            handle,
            dim(&format!("{page_count} page(s)")),
        ));
        self.bar.inc(1);
    }

    fn on_generation_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} page(s) written",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }

    fn on_generation_failed(&self, _error: &str) {
        self.bar.abandon();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # CV and cover letter in one PDF, in the current directory
  cvpress record.json

  # CV only, classic theme, into ./out
  cvpress record.json --kind cv --theme classic -o out

  # Use browser screenshots instead of the built-in previews
  cvpress record.json --cv-image cv.png --cover-letter-image letter.png

  # Show how the pages would break, without writing anything
  cvpress record.json --plan-only --json

  # Keep the captured rasters for inspection
  cvpress record.json --dump-snapshots snapshots/

RECORD FORMAT:
  A JSON object with camelCase keys: personalInfo, careerObjective,
  workExperience[], education[], skills[], certifications[], jobType,
  nationalService. Missing sections default to empty.

ENVIRONMENT VARIABLES:
  CVPRESS_KIND            Default for --kind
  CVPRESS_OUTPUT_DIR      Default for --output-dir
  CVPRESS_THEME           Default for --theme
  CVPRESS_SCALE           Default for --scale
  RUST_LOG                Override the log filter (e.g. cvpress=debug)
"#;

/// Assemble CV and cover-letter previews into paginated A4 PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "cvpress",
    version,
    about = "Assemble CV and cover-letter previews into paginated A4 PDFs",
    long_about = "Lay out a CV and cover letter from a JSON record, capture each preview at 2× and \
tile the snapshots across as many A4 pages as they need. Both documents can be combined into one \
file, the CV first.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the JSON record.
    record: PathBuf,

    /// Which document to produce.
    #[arg(short, long, env = "CVPRESS_KIND", value_enum, default_value = "both")]
    kind: KindArg,

    /// Directory to write the PDF into.
    #[arg(short, long = "output-dir", env = "CVPRESS_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Output file name. Default: `{full name}_CV.pdf`, `_Cover_Letter.pdf` or `_Documents.pdf`.
    #[arg(long, env = "CVPRESS_FILENAME")]
    filename: Option<String>,

    /// Preview theme.
    #[arg(long, env = "CVPRESS_THEME", value_enum, default_value = "modern")]
    theme: ThemeArg,

    /// Use this PNG/JPEG as the CV preview instead of the built-in layout.
    #[arg(long, env = "CVPRESS_CV_IMAGE")]
    cv_image: Option<PathBuf>,

    /// Use this PNG/JPEG as the cover-letter preview instead of the built-in layout.
    #[arg(long, env = "CVPRESS_COVER_LETTER_IMAGE")]
    cover_letter_image: Option<PathBuf>,

    /// Capture oversampling factor (1–4).
    #[arg(long, env = "CVPRESS_SCALE", default_value_t = 2,
          value_parser = clap::value_parser!(u32).range(1..=4))]
    scale: u32,

    /// Per-surface capture timeout in seconds. Default: none.
    #[arg(long, env = "CVPRESS_CAPTURE_TIMEOUT")]
    timeout: Option<u64>,

    /// Date printed on the cover letter (YYYY-MM-DD). Default: today.
    #[arg(long, env = "CVPRESS_DATE", value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Print the page placement plan only; write nothing.
    #[arg(long)]
    plan_only: bool,

    /// Print a JSON summary (plan or run statistics) on stdout.
    #[arg(long, env = "CVPRESS_JSON")]
    json: bool,

    /// Also save each captured raster as PNG into this directory.
    #[arg(long, env = "CVPRESS_DUMP_SNAPSHOTS")]
    dump_snapshots: Option<PathBuf>,

    /// Disable progress output.
    #[arg(long, env = "CVPRESS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CVPRESS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CVPRESS_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Cv,
    CoverLetter,
    Both,
}

impl From<KindArg> for DocumentKind {
    fn from(v: KindArg) -> Self {
        match v {
            KindArg::Cv => DocumentKind::Cv,
            KindArg::CoverLetter => DocumentKind::CoverLetter,
            KindArg::Both => DocumentKind::Both,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ThemeArg {
    Modern,
    Classic,
}

impl From<ThemeArg> for Theme {
    fn from(v: ThemeArg) -> Self {
        match v {
            ThemeArg::Modern => Theme::Modern,
            ThemeArg::Classic => Theme::Classic,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress lines carry everything a user needs; library INFO logs
    // only show up when progress is off.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.plan_only;
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

    // ── Load record and lay out previews ─────────────────────────────────
    let record = CvRecord::from_path(&cli.record)
        .with_context(|| format!("Failed to load record from {:?}", cli.record))?;
    let kind = DocumentKind::from(cli.kind);
    let date = cli
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let previews = build_previews(&cli, &record, date)?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn AssemblyProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, &record, progress_cb)?;

    // ── Plan-only mode ───────────────────────────────────────────────────
    if cli.plan_only {
        let plan = plan(kind, &previews, &config).context("Failed to plan pages")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("Failed to serialise plan")?
            );
        } else {
            for source in &plan.sources {
                println!(
                    "{:<22} {:>5}×{:<6} px  {:>8.1} mm  {} page(s)",
                    source.handle.as_str(),
                    source.width_px,
                    source.height_px,
                    source.scaled_height_mm,
                    source.page_count
                );
            }
            println!("Total: {} page(s)", plan.page_count());
        }
        return Ok(());
    }

    // ── Optional raster dump ─────────────────────────────────────────────
    if let Some(ref dir) = cli.dump_snapshots {
        dump_snapshots(kind, &previews, &config, dir).await?;
    }

    // ── Generate ─────────────────────────────────────────────────────────
    let filename = cli
        .filename
        .clone()
        .unwrap_or_else(|| default_filename(kind, &record.personal_info.full_name));
    let status = StatusSignal::new();

    let (path, stats) = match generate_to_dir(
        kind,
        &filename,
        &cli.output_dir,
        &previews,
        &config,
        &status,
    )
    .await
    {
        Ok(done) => done,
        Err(e) => {
            if !cli.quiet {
                eprintln!("{} {}", red("✘"), e.user_message());
            }
            return Err(anyhow::Error::new(e).context("Generation failed"));
        }
    };

    if cli.json {
        let summary = serde_json::json!({
            "path": path,
            "stats": stats,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} page(s)  {}ms  →  {}",
            green("✔"),
            stats.total_pages,
            stats.total_duration_ms,
            bold(&path.display().to_string()),
        );
    }

    Ok(())
}

/// Lay out the built-in previews, then swap in any screenshots given on the
/// command line.
fn build_previews(cli: &Cli, record: &CvRecord, date: NaiveDate) -> Result<SurfaceRegistry> {
    let mut previews = render_previews(record, cli.theme.into(), date);
    let overrides = [
        (DocumentSource::Cv, cli.cv_image.as_ref()),
        (DocumentSource::CoverLetter, cli.cover_letter_image.as_ref()),
    ];
    for (source, image) in overrides {
        if let Some(path) = image {
            let bitmap = BitmapSurface::open(path)
                .with_context(|| format!("Failed to load preview image {:?}", path))?;
            info!("Using {:?} as the {} preview", path, source.handle());
            previews.insert(source.handle(), Arc::new(bitmap));
        }
    }
    Ok(previews)
}

/// Map CLI args to `AssemblyConfig`.
fn build_config(
    cli: &Cli,
    record: &CvRecord,
    progress: Option<ProgressCallback>,
) -> Result<AssemblyConfig> {
    let mut builder = AssemblyConfig::builder().capture_scale(cli.scale);

    let name = record.personal_info.full_name.trim();
    if !name.is_empty() {
        builder = builder.author(name);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.capture_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Capture every source of `kind` and save it as `{handle}.png` under `dir`.
async fn dump_snapshots(
    kind: DocumentKind,
    previews: &SurfaceRegistry,
    config: &AssemblyConfig,
    dir: &Path,
) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {:?}", dir))?;
    for source in kind.sources() {
        let handle = source.handle();
        let raster = capture_surface(previews, &handle, config)
            .await
            .with_context(|| format!("Failed to capture '{}'", handle))?;
        let png = raster.encode_png().context("Failed to encode snapshot")?;
        let path = dir.join(format!("{}.png", handle));
        tokio::fs::write(&path, png)
            .await
            .with_context(|| format!("Failed to write {:?}", path))?;
        info!("Saved snapshot {}", path.display());
    }
    Ok(())
}
