//! Pagination: tile tall raster images across fixed-size physical pages.
//!
//! A raster is scaled so its width fills the page width, aspect ratio
//! preserved. When the scaled height exceeds one page the *whole* image is
//! drawn again on every following page, shifted up by one page height each
//! time, so the fixed page window reveals the next unseen band:
//!
//! ```text
//!  page 1          page 2          page 3
//! ┌────────┐     ┌────────┐     ┌────────┐
//! │ band 0 │     │ band 1 │     │ band 2 │   offset_mm = 0, -297, -594
//! └────────┘     └────────┘     │ (part) │
//!                               └────────┘
//! ```
//!
//! No source row is ever cropped, and a page boundary can cut through a line
//! of text. Each image of a combined document starts on its own page.

use crate::config::PageGeometry;
use crate::error::CvPressError;
use crate::pipeline::capture::RasterImage;
use crate::view::SurfaceHandle;
use serde::Serialize;
use tracing::debug;

/// A trailing band shorter than this (in mm) does not earn a page of its own.
///
/// Scaling by `page_width / image_width` is not exact in binary floating
/// point; without the tolerance a scaled height of `k * page_height` can come
/// out a few ulps long and produce an empty trailing page.
pub const TRAILING_BAND_TOLERANCE_MM: f64 = 1e-6;

/// Where one physical page shows one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Index of the image in the plan's source list.
    pub image_index: usize,
    /// Zero-based physical page number in the final document.
    pub page_index: usize,
    /// Vertical offset of the image's top edge from the page's top edge.
    /// Zero or negative.
    pub offset_mm: f64,
    /// Full height of the image once scaled to the page width.
    pub scaled_height_mm: f64,
}

/// Pixel size of an image to paginate, labelled with its surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageExtent {
    pub handle: SurfaceHandle,
    pub width: u32,
    pub height: u32,
}

impl ImageExtent {
    pub fn new(handle: SurfaceHandle, width: u32, height: u32) -> Self {
        Self {
            handle,
            width,
            height,
        }
    }
}

impl From<&RasterImage> for ImageExtent {
    fn from(raster: &RasterImage) -> Self {
        Self::new(raster.handle().clone(), raster.width(), raster.height())
    }
}

/// Per-image summary inside a [`PlacementPlan`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcePlan {
    pub handle: SurfaceHandle,
    pub width_px: u32,
    pub height_px: u32,
    pub scaled_height_mm: f64,
    pub page_count: usize,
}

/// The ordered page placements for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementPlan {
    pub geometry: PageGeometry,
    pub sources: Vec<SourcePlan>,
    pub placements: Vec<Placement>,
}

impl PlacementPlan {
    /// An empty plan for `geometry`.
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            sources: Vec::new(),
            placements: Vec::new(),
        }
    }

    /// Append `image` on fresh pages after everything already planned.
    /// Returns the number of pages it spans.
    ///
    /// # Errors
    /// `InvalidGeometry` if either dimension is zero; the plan is left as it was.
    pub fn push_image(&mut self, image: &ImageExtent) -> Result<usize, CvPressError> {
        let pages = paginate_image(
            self.sources.len(),
            self.placements.len(),
            image.width,
            image.height,
            &self.geometry,
        )?;
        let page_count = pages.len();
        self.sources.push(SourcePlan {
            handle: image.handle.clone(),
            width_px: image.width,
            height_px: image.height,
            scaled_height_mm: scaled_height_mm(image.width, image.height, &self.geometry),
            page_count,
        });
        self.placements.extend(pages);
        Ok(page_count)
    }

    /// Number of physical pages in the document.
    pub fn page_count(&self) -> usize {
        self.placements.len()
    }

    /// Placements that draw the image at `image_index`.
    pub fn placements_for(&self, image_index: usize) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(move |p| p.image_index == image_index)
    }
}

/// Height of a `width` × `height` px image once scaled to the page width.
pub fn scaled_height_mm(width: u32, height: u32, geometry: &PageGeometry) -> f64 {
    f64::from(height) * (geometry.width_mm / f64::from(width))
}

/// Compute the placements of a single image, numbering pages from zero.
///
/// # Errors
/// `InvalidGeometry` if either dimension is zero.
pub fn paginate(
    width: u32,
    height: u32,
    geometry: &PageGeometry,
) -> Result<Vec<Placement>, CvPressError> {
    paginate_image(0, 0, width, height, geometry)
}

fn paginate_image(
    image_index: usize,
    first_page: usize,
    width: u32,
    height: u32,
    geometry: &PageGeometry,
) -> Result<Vec<Placement>, CvPressError> {
    if width == 0 || height == 0 {
        return Err(CvPressError::InvalidGeometry { width, height });
    }

    let page_h = geometry.height_mm;
    let scaled = scaled_height_mm(width, height, geometry);
    let placement = |page: usize, offset_mm: f64| Placement {
        image_index,
        page_index: first_page + page,
        offset_mm,
        scaled_height_mm: scaled,
    };

    let mut placements = vec![placement(0, 0.0)];
    let mut remaining = scaled - page_h;
    let mut cursor = 0.0;
    while remaining > TRAILING_BAND_TOLERANCE_MM {
        cursor += page_h;
        placements.push(placement(placements.len(), -cursor));
        remaining -= page_h;
    }

    debug!(
        "Paginated {}x{} px → {:.3} mm over {} page(s)",
        width,
        height,
        scaled,
        placements.len()
    );
    Ok(placements)
}

/// Paginate several images into one document, in order. Every image starts
/// on a fresh page; two images never share a page.
///
/// # Errors
/// `InvalidGeometry` for the first image with a zero dimension. No partial
/// plan is returned.
pub fn paginate_all(
    images: &[ImageExtent],
    geometry: &PageGeometry,
) -> Result<PlacementPlan, CvPressError> {
    let mut plan = PlacementPlan::new(*geometry);
    for image in images {
        plan.push_image(image)?;
    }
    Ok(plan)
}
