//! Surface capture: snapshot a rendered surface into a [`RasterImage`].
//!
//! ## Why spawn_blocking?
//!
//! Painting a tall surface at 2× touches millions of pixels. The paint runs
//! on tokio's blocking pool so the worker threads stay free; awaiting the
//! join handle is the one suspension point of a generation request.
//!
//! The handle is resolved at call time. A surface that is missing when the
//! capture starts fails the whole request with `SurfaceNotFound`.

use crate::config::AssemblyConfig;
use crate::error::CvPressError;
use crate::view::{SurfaceHandle, SurfaceProvider};
use image::RgbaImage;
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, info};

/// An immutable snapshot of a surface at a fixed oversampling scale.
#[derive(Debug, Clone)]
pub struct RasterImage {
    handle: SurfaceHandle,
    scale: u32,
    pixels: RgbaImage,
}

impl RasterImage {
    pub fn new(handle: SurfaceHandle, scale: u32, pixels: RgbaImage) -> Self {
        Self {
            handle,
            scale,
            pixels,
        }
    }

    /// Surface this snapshot was taken from.
    pub fn handle(&self) -> &SurfaceHandle {
        &self.handle
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Encode the snapshot as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        debug!("Encoded '{}' → {} bytes PNG", self.handle, buf.len());
        Ok(buf)
    }
}

/// Capture the surface registered under `handle`.
///
/// # Errors
/// - `SurfaceNotFound` when `handle` does not resolve
/// - `CaptureFailed` when the surface cannot paint itself
/// - `CaptureTimeout` when `config.capture_timeout_secs` elapses first
pub async fn capture_surface(
    provider: &dyn SurfaceProvider,
    handle: &SurfaceHandle,
    config: &AssemblyConfig,
) -> Result<RasterImage, CvPressError> {
    let surface = provider
        .resolve(handle)
        .ok_or_else(|| CvPressError::SurfaceNotFound {
            handle: handle.to_string(),
        })?;

    let scale = config.capture_scale;
    let (w, h) = surface.extent();
    debug!("Capturing '{}' ({}x{} css px) at {}x", handle, w, h, scale);

    let task = tokio::task::spawn_blocking(move || surface.paint(scale));
    let joined = match config.capture_timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), task)
            .await
            .map_err(|_| CvPressError::CaptureTimeout {
                handle: handle.to_string(),
                secs,
            })?,
        None => task.await,
    };

    let pixels = joined
        .map_err(|e| CvPressError::Internal(format!("Capture task panicked: {}", e)))?
        .map_err(|detail| CvPressError::CaptureFailed {
            handle: handle.to_string(),
            detail,
        })?;

    info!(
        "Captured '{}' → {}x{} px",
        handle,
        pixels.width(),
        pixels.height()
    );
    Ok(RasterImage::new(handle.clone(), scale, pixels))
}
