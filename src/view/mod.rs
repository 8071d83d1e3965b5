//! Renderable views: the surfaces the capturer snapshots.
//!
//! A [`Surface`] is a fully laid-out block of visual content with a known
//! extent in CSS pixels. It can paint itself at an integer oversampling
//! factor. A [`SurfaceProvider`] maps stable [`SurfaceHandle`]s to surfaces;
//! the capturer resolves the handle at call time, so a preview that was never
//! rendered (or was torn down) shows up as `SurfaceNotFound` instead of a
//! blank page.
//!
//! Two surface kinds ship with the crate:
//!
//! * [`BitmapSurface`] — a bitmap someone else already rendered (a browser
//!   screenshot, a PNG on disk).
//! * [`DocumentSurface`] — the built-in CV and cover-letter previews, laid
//!   out from a [`CvRecord`] with [`cv::layout_cv`] and
//!   [`cover_letter::layout_cover_letter`].

pub mod cover_letter;
pub mod cv;
pub mod layout;

pub use layout::{Align, Block, DocumentSurface, CONTENT_WIDTH_PX};

use crate::record::CvRecord;
use chrono::NaiveDate;
use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Stable name of a rendered surface, e.g. `cv-preview`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceHandle(String);

impl SurfaceHandle {
    /// Handle of the CV preview.
    pub const CV: &'static str = "cv-preview";
    /// Handle of the cover-letter preview.
    pub const COVER_LETTER: &'static str = "cover-letter-preview";

    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SurfaceHandle {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A laid-out visual surface ready for capture.
///
/// Painting must not mutate the surface; the capturer may call it from a
/// blocking worker thread.
pub trait Surface: Send + Sync {
    /// Laid-out size in CSS pixels, including content outside any viewport.
    fn extent(&self) -> (u32, u32);

    /// Paint the full surface at `scale`×. The result is
    /// `extent().0 * scale` by `extent().1 * scale` pixels.
    fn paint(&self, scale: u32) -> Result<RgbaImage, String>;
}

/// Resolves surface handles to surfaces.
pub trait SurfaceProvider: Send + Sync {
    fn resolve(&self, handle: &SurfaceHandle) -> Option<Arc<dyn Surface>>;
}

/// In-memory [`SurfaceProvider`].
#[derive(Default, Clone)]
pub struct SurfaceRegistry {
    surfaces: HashMap<SurfaceHandle, Arc<dyn Surface>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `surface` under `handle`, replacing any previous one.
    pub fn insert(&mut self, handle: impl Into<SurfaceHandle>, surface: Arc<dyn Surface>) {
        let handle = handle.into();
        debug!("Registered surface '{}'", handle);
        self.surfaces.insert(handle, surface);
    }

    pub fn remove(&mut self, handle: &SurfaceHandle) -> Option<Arc<dyn Surface>> {
        self.surfaces.remove(handle)
    }

    pub fn contains(&self, handle: &SurfaceHandle) -> bool {
        self.surfaces.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl SurfaceProvider for SurfaceRegistry {
    fn resolve(&self, handle: &SurfaceHandle) -> Option<Arc<dyn Surface>> {
        self.surfaces.get(handle).cloned()
    }
}

impl fmt::Debug for SurfaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handles: Vec<_> = self.surfaces.keys().map(SurfaceHandle::as_str).collect();
        handles.sort_unstable();
        f.debug_struct("SurfaceRegistry")
            .field("handles", &handles)
            .finish()
    }
}

/// A surface backed by an already rendered bitmap at 1×.
#[derive(Debug, Clone)]
pub struct BitmapSurface {
    image: RgbaImage,
}

impl BitmapSurface {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Load a PNG or JPEG from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, image::ImageError> {
        Ok(Self::new(image::open(path)?.to_rgba8()))
    }
}

impl Surface for BitmapSurface {
    fn extent(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn paint(&self, scale: u32) -> Result<RgbaImage, String> {
        if scale <= 1 {
            return Ok(self.image.clone());
        }
        let (w, h) = self.image.dimensions();
        let (sw, sh) = w
            .checked_mul(scale)
            .zip(h.checked_mul(scale))
            .ok_or_else(|| format!("{w}x{h} bitmap overflows at {scale}x"))?;
        if w == 0 || h == 0 {
            return Ok(RgbaImage::new(sw, sh));
        }
        Ok(imageops::resize(
            &self.image,
            sw,
            sh,
            imageops::FilterType::Triangle,
        ))
    }
}

/// Visual style of the built-in previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Accent-coloured headings and a left accent border. (default)
    #[default]
    Modern,
    /// Monochrome with a thin frame.
    Classic,
}

/// Lay out both previews from `record` and register them under their
/// well-known handles.
pub fn render_previews(record: &CvRecord, theme: Theme, date: NaiveDate) -> SurfaceRegistry {
    let mut registry = SurfaceRegistry::new();
    registry.insert(SurfaceHandle::CV, Arc::new(cv::layout_cv(record, theme)));
    registry.insert(
        SurfaceHandle::COVER_LETTER,
        Arc::new(cover_letter::layout_cover_letter(record, date, theme)),
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn registry_resolves_and_removes() {
        let mut registry = SurfaceRegistry::new();
        let handle = SurfaceHandle::new(SurfaceHandle::CV);
        registry.insert(
            SurfaceHandle::CV,
            Arc::new(BitmapSurface::new(RgbaImage::new(4, 4))),
        );
        assert!(registry.resolve(&handle).is_some());
        assert!(registry.remove(&handle).is_some());
        assert!(registry.resolve(&handle).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn bitmap_paints_at_scale() {
        let img = RgbaImage::from_pixel(10, 20, Rgba([200, 10, 10, 255]));
        let surface = BitmapSurface::new(img);
        assert_eq!(surface.extent(), (10, 20));
        let one = surface.paint(1).unwrap();
        assert_eq!(one.dimensions(), (10, 20));
        assert_eq!(one.get_pixel(3, 3), &Rgba([200, 10, 10, 255]));
        let two = surface.paint(2).unwrap();
        assert_eq!(two.dimensions(), (20, 40));
    }

    #[test]
    fn bitmap_with_zero_extent_paints_empty() {
        let surface = BitmapSurface::new(RgbaImage::new(0, 30));
        let painted = surface.paint(2).unwrap();
        assert_eq!(painted.dimensions(), (0, 60));
    }

    #[test]
    fn previews_register_both_handles() {
        let record = CvRecord::default();
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let registry = render_previews(&record, Theme::Modern, date);
        assert!(registry.contains(&SurfaceHandle::new(SurfaceHandle::CV)));
        assert!(registry.contains(&SurfaceHandle::new(SurfaceHandle::COVER_LETTER)));
        assert_eq!(registry.len(), 2);
    }
}
