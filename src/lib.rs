//! # cvpress
//!
//! Turn rendered CV and cover-letter previews into paginated A4 PDFs.
//!
//! ## How it works
//!
//! A preview is laid out once as a single tall surface. Instead of
//! re-typesetting it for print, this crate snapshots the surface at 2× and
//! tiles that raster across as many A4 pages as it needs. What the user saw
//! on screen is exactly what lands on paper, page breaks included.
//!
//! ## Pipeline Overview
//!
//! ```text
//! CvRecord
//!  │
//!  ├─ 1. View      lay out the CV / cover-letter preview surfaces
//!  ├─ 2. Capture   snapshot each surface at 2× (spawn_blocking)
//!  ├─ 3. Paginate  scale to 210 mm wide, slice into 297 mm page windows
//!  ├─ 4. Encode    flatten onto white, deflate RGB samples
//!  └─ 5. Write     one XObject per image, one page per placement (lopdf)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cvpress::{default_filename, generate, render_previews, AssemblyConfig, CvRecord,
//!     DocumentKind, StatusSignal, Theme};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let record = CvRecord::from_path("record.json")?;
//!     let today = chrono::Local::now().date_naive();
//!     let previews = render_previews(&record, Theme::Modern, today);
//!
//!     let kind = DocumentKind::Both;
//!     let filename = default_filename(kind, &record.personal_info.full_name);
//!     let config = AssemblyConfig::builder()
//!         .author(record.personal_info.full_name.clone())
//!         .build()?;
//!     let status = StatusSignal::new();
//!
//!     let artifact = generate(kind, filename, &previews, &config, &status).await?;
//!     std::fs::write(&artifact.filename, &artifact.bytes)?;
//!     eprintln!("{} pages", artifact.page_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cvpress` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! cvpress = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod status;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assemble::{generate, generate_sync, generate_to_dir, plan};
pub use config::{
    AssemblyConfig, AssemblyConfigBuilder, DocumentKind, DocumentSource, PageGeometry,
};
pub use error::{CvPressError, DOWNLOAD_FAILED_MESSAGE};
pub use output::{default_filename, AssemblyStats, DocumentArtifact, SourceStats};
pub use pipeline::capture::RasterImage;
pub use pipeline::paginate::{paginate, paginate_all, ImageExtent, Placement, PlacementPlan};
pub use progress::{AssemblyProgressCallback, NoopProgressCallback, ProgressCallback};
pub use record::{CvRecord, Education, EntryId, NationalService, PersonalInfo, WorkExperience};
pub use status::{GeneratingGuard, StatusObserver, StatusSignal};
pub use view::{
    render_previews, BitmapSurface, DocumentSurface, Surface, SurfaceHandle, SurfaceProvider,
    SurfaceRegistry, Theme,
};
