//! Document assembly entry points.
//!
//! A generation request runs the pipeline once, start to finish:
//!
//! ```text
//! for each source of the kind, in order:
//!     capture (await) ──▶ append to placement plan
//! encode + write (blocking pool) ──▶ DocumentArtifact
//! ```
//!
//! Failures are atomic. Any error from any stage aborts the whole request and
//! nothing is returned or written; a `both` request whose cover letter is
//! missing yields no CV-only file either. The [`StatusSignal`] is raised for
//! the lifetime of the request and lowered on every exit path.

use crate::config::{AssemblyConfig, DocumentKind};
use crate::error::CvPressError;
use crate::output::{AssemblyStats, DocumentArtifact, SourceStats};
use crate::pipeline::capture::{capture_surface, RasterImage};
use crate::pipeline::encode::encode_rgb_flate;
use crate::pipeline::paginate::{ImageExtent, PlacementPlan};
use crate::pipeline::write::{write_pdf, DocumentMetadata};
use crate::status::StatusSignal;
use crate::view::SurfaceProvider;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Generate the document for `kind` and return it in memory.
///
/// This is the primary entry point for the library. The status signal is
/// lowered before the completion or failure callback fires.
///
/// # Arguments
/// * `kind`     — which document(s) to produce
/// * `filename` — download name stored on the artifact
/// * `provider` — resolves the preview surfaces at capture time
/// * `config`   — page geometry, capture scale, metadata, progress callback
/// * `status`   — raised while the request runs
///
/// # Errors
/// - `SurfaceNotFound` if any surface of `kind` is not rendered
/// - `CaptureFailed` / `CaptureTimeout` if a surface cannot be painted
/// - `InvalidGeometry` if a capture has zero width or height
/// - `EncodeFailed` if the PDF cannot be serialised
pub async fn generate(
    kind: DocumentKind,
    filename: impl Into<String>,
    provider: &dyn SurfaceProvider,
    config: &AssemblyConfig,
    status: &StatusSignal,
) -> Result<DocumentArtifact, CvPressError> {
    let generating = status.begin();
    let result = assemble(kind, filename.into(), provider, config).await;
    drop(generating);
    report(config, &result, DocumentArtifact::page_count);
    result
}

/// Generate the document for `kind` and write it to `dir/filename`.
///
/// Uses atomic write (temp file + rename) so a failed request never leaves a
/// partial or truncated PDF behind. The status signal stays raised until the
/// file is in place.
///
/// # Errors
/// Everything [`generate`] returns, plus `InvalidConfig` when `filename` is
/// not a plain file name and `OutputWriteFailed` on I/O errors.
pub async fn generate_to_dir(
    kind: DocumentKind,
    filename: &str,
    dir: impl AsRef<Path>,
    provider: &dyn SurfaceProvider,
    config: &AssemblyConfig,
    status: &StatusSignal,
) -> Result<(PathBuf, AssemblyStats), CvPressError> {
    let generating = status.begin();
    let dir = dir.as_ref();
    let result = async {
        let path = output_path(dir, filename)?;
        let DocumentArtifact { bytes, stats, .. } =
            assemble(kind, filename.to_string(), provider, config).await?;
        deliver(bytes, path.clone()).await?;
        info!("Wrote {} ({} page(s))", path.display(), stats.total_pages);
        Ok::<_, CvPressError>((path, stats))
    }
    .await;
    drop(generating);
    report(config, &result, |(_, stats)| stats.total_pages);
    result
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    kind: DocumentKind,
    filename: impl Into<String>,
    provider: &dyn SurfaceProvider,
    config: &AssemblyConfig,
    status: &StatusSignal,
) -> Result<DocumentArtifact, CvPressError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CvPressError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(kind, filename, provider, config, status))
}

/// Compute the placement plan for `kind` without painting or writing.
///
/// Uses each surface's laid-out extent at `config.capture_scale`, so the
/// result matches what [`generate`] would produce for the same surfaces.
/// Does not touch the status signal.
///
/// # Errors
/// `SurfaceNotFound` for a missing surface, `CaptureFailed` when an extent
/// overflows at the capture scale, `InvalidGeometry` for a zero extent.
pub fn plan(
    kind: DocumentKind,
    provider: &dyn SurfaceProvider,
    config: &AssemblyConfig,
) -> Result<PlacementPlan, CvPressError> {
    let mut plan = PlacementPlan::new(config.page);
    for source in kind.sources() {
        let handle = source.handle();
        let surface = provider
            .resolve(&handle)
            .ok_or_else(|| CvPressError::SurfaceNotFound {
                handle: handle.to_string(),
            })?;
        let (w, h) = surface.extent();
        let scale = config.capture_scale;
        let (sw, sh) = w
            .checked_mul(scale)
            .zip(h.checked_mul(scale))
            .ok_or_else(|| CvPressError::CaptureFailed {
                handle: handle.to_string(),
                detail: format!("{w}x{h} surface overflows at {scale}x"),
            })?;
        plan.push_image(&ImageExtent::new(handle, sw, sh))?;
    }
    Ok(plan)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run capture → paginate → write for one request.
async fn assemble(
    kind: DocumentKind,
    filename: String,
    provider: &dyn SurfaceProvider,
    config: &AssemblyConfig,
) -> Result<DocumentArtifact, CvPressError> {
    let total_start = Instant::now();
    let sources = kind.sources();
    info!("Generating {} ({} source(s)) → {}", kind, sources.len(), filename);

    if let Some(ref cb) = config.progress_callback {
        cb.on_generation_start(kind, sources.len());
    }

    // ── Step 1: Capture and paginate each source, in output order ────────
    let capture_start = Instant::now();
    let mut plan = PlacementPlan::new(config.page);
    let mut rasters: Vec<RasterImage> = Vec::with_capacity(sources.len());
    let mut source_stats = Vec::with_capacity(sources.len());
    for source in sources {
        let raster = capture_surface(provider, &source.handle(), config).await?;
        if let Some(ref cb) = config.progress_callback {
            cb.on_source_captured(raster.handle().as_str(), raster.width(), raster.height());
        }

        let page_count = plan.push_image(&ImageExtent::from(&raster))?;
        debug!("'{}' spans {} page(s)", raster.handle(), page_count);
        if let Some(ref cb) = config.progress_callback {
            cb.on_source_paginated(raster.handle().as_str(), page_count);
        }

        source_stats.push(SourceStats {
            handle: raster.handle().clone(),
            width_px: raster.width(),
            height_px: raster.height(),
            page_count,
        });
        rasters.push(raster);
    }
    let capture_duration_ms = capture_start.elapsed().as_millis() as u64;

    // ── Step 2: Encode and serialise the PDF ─────────────────────────────
    let write_start = Instant::now();
    let metadata = DocumentMetadata {
        title: Some(
            config
                .title
                .clone()
                .unwrap_or_else(|| default_title(kind).to_string()),
        ),
        author: config.author.clone(),
    };
    let total_pages = plan.page_count();
    let bytes = tokio::task::spawn_blocking(move || {
        let images = rasters
            .iter()
            .map(|r| encode_rgb_flate(r.pixels()))
            .collect::<Result<Vec<_>, _>>()?;
        write_pdf(&images, &plan, &metadata)
    })
    .await
    .map_err(|e| CvPressError::Internal(format!("Write task panicked: {}", e)))??;
    let write_duration_ms = write_start.elapsed().as_millis() as u64;

    let stats = AssemblyStats {
        kind,
        total_pages,
        sources: source_stats,
        output_bytes: bytes.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        capture_duration_ms,
        write_duration_ms,
    };
    info!(
        "Generated {}: {} page(s), {} bytes, {}ms total",
        kind, total_pages, stats.output_bytes, stats.total_duration_ms
    );

    Ok(DocumentArtifact {
        filename,
        bytes,
        stats,
    })
}

/// Fire the terminal progress event for `result`.
fn report<T>(
    config: &AssemblyConfig,
    result: &Result<T, CvPressError>,
    pages: impl Fn(&T) -> usize,
) {
    match result {
        Ok(value) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_generation_complete(pages(value));
            }
        }
        Err(e) => {
            warn!("Generation failed: {}", e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_generation_failed(&e.to_string());
            }
        }
    }
}

fn default_title(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Cv => "Curriculum Vitae",
        DocumentKind::CoverLetter => "Cover Letter",
        DocumentKind::Both => "Curriculum Vitae and Cover Letter",
    }
}

/// `dir/filename`, refusing names that would land outside `dir`.
fn output_path(dir: &Path, filename: &str) -> Result<PathBuf, CvPressError> {
    let plain = Path::new(filename)
        .file_name()
        .map(|name| name == filename)
        .unwrap_or(false);
    if !plain {
        return Err(CvPressError::InvalidConfig(format!(
            "Output filename '{}' must be a plain file name",
            filename
        )));
    }
    Ok(dir.join(filename))
}

/// Write `bytes` to `path` via a sibling temp file and a rename.
///
/// The temp file lives in the target directory so the rename never crosses
/// filesystems; it is removed if any step fails.
async fn deliver(bytes: Vec<u8>, path: PathBuf) -> Result<(), CvPressError> {
    tokio::task::spawn_blocking(move || {
        let write_failed = |source| CvPressError::OutputWriteFailed {
            path: path.clone(),
            source,
        };
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent).map_err(write_failed)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_failed)?;
        tmp.write_all(&bytes).map_err(write_failed)?;
        tmp.as_file().sync_all().map_err(write_failed)?;
        tmp.persist(&path).map_err(|e| write_failed(e.error))?;
        Ok::<(), CvPressError>(())
    })
    .await
    .map_err(|e| CvPressError::Internal(format!("Delivery task panicked: {}", e)))?
}
