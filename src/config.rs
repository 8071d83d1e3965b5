//! Configuration types for document assembly.
//!
//! All assembly behaviour is controlled through [`AssemblyConfig`], built via
//! its [`AssemblyConfigBuilder`]. The physical page, the oversampling factor
//! used during capture and the document metadata all live in one struct so a
//! run can be reproduced from its config alone.

use crate::error::CvPressError;
use crate::progress::ProgressCallback;
use crate::view::SurfaceHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default oversampling factor applied while capturing a surface.
pub const DEFAULT_CAPTURE_SCALE: u32 = 2;

/// Largest accepted oversampling factor. A4 at 4× is already ~3200 px wide.
pub const MAX_CAPTURE_SCALE: u32 = 4;

/// Configuration for one or more document generations.
///
/// Built via [`AssemblyConfig::builder()`] or using
/// [`AssemblyConfig::default()`].
///
/// # Example
/// ```rust
/// use cvpress::AssemblyConfig;
///
/// let config = AssemblyConfig::builder()
///     .capture_scale(2)
///     .author("Ada Obi")
///     .build()
///     .unwrap();
/// assert_eq!(config.page.width_mm, 210.0);
/// ```
#[derive(Clone)]
pub struct AssemblyConfig {
    /// Physical page every raster is tiled onto. Default: A4 portrait.
    pub page: PageGeometry,

    /// Oversampling factor used when painting a surface. Range: 1–4. Default: 2.
    ///
    /// Printed output at 1× looks soft; 2× keeps body text crisp while an A4
    /// surface stays around 1600 px wide.
    pub capture_scale: u32,

    /// Upper bound on a single capture, in seconds. Default: none.
    pub capture_timeout_secs: Option<u64>,

    /// Document title written to the PDF info dictionary.
    pub title: Option<String>,

    /// Document author written to the PDF info dictionary.
    pub author: Option<String>,

    /// Optional progress callback for per-source events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            page: PageGeometry::A4,
            capture_scale: DEFAULT_CAPTURE_SCALE,
            capture_timeout_secs: None,
            title: None,
            author: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AssemblyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssemblyConfig")
            .field("page", &self.page)
            .field("capture_scale", &self.capture_scale)
            .field("capture_timeout_secs", &self.capture_timeout_secs)
            .field("title", &self.title)
            .field("author", &self.author)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn AssemblyProgressCallback>"),
            )
            .finish()
    }
}

impl AssemblyConfig {
    /// Create a new builder for `AssemblyConfig`.
    pub fn builder() -> AssemblyConfigBuilder {
        AssemblyConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AssemblyConfig`].
#[derive(Debug)]
pub struct AssemblyConfigBuilder {
    config: AssemblyConfig,
}

impl AssemblyConfigBuilder {
    pub fn page(mut self, page: PageGeometry) -> Self {
        self.config.page = page;
        self
    }

    pub fn capture_scale(mut self, scale: u32) -> Self {
        self.config.capture_scale = scale.clamp(1, MAX_CAPTURE_SCALE);
        self
    }

    pub fn capture_timeout_secs(mut self, secs: u64) -> Self {
        self.config.capture_timeout_secs = Some(secs);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.config.author = Some(author.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AssemblyConfig, CvPressError> {
        let c = &self.config;
        c.page.validate()?;
        if c.capture_scale == 0 || c.capture_scale > MAX_CAPTURE_SCALE {
            return Err(CvPressError::InvalidConfig(format!(
                "Capture scale must be 1–{MAX_CAPTURE_SCALE}, got {}",
                c.capture_scale
            )));
        }
        if c.capture_timeout_secs == Some(0) {
            return Err(CvPressError::InvalidConfig(
                "Capture timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Page geometry ────────────────────────────────────────────────────────

/// Physical page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageGeometry {
    /// A4 portrait, 210 × 297 mm.
    pub const A4: PageGeometry = PageGeometry {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    pub fn validate(&self) -> Result<(), CvPressError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !ok(self.width_mm) || !ok(self.height_mm) {
            return Err(CvPressError::InvalidConfig(format!(
                "Page geometry must be positive and finite, got {}x{} mm",
                self.width_mm, self.height_mm
            )));
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// A single renderable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentSource {
    Cv,
    CoverLetter,
}

impl DocumentSource {
    /// The well-known surface handle the view provider registers this document under.
    pub fn handle(self) -> SurfaceHandle {
        match self {
            DocumentSource::Cv => SurfaceHandle::new(SurfaceHandle::CV),
            DocumentSource::CoverLetter => SurfaceHandle::new(SurfaceHandle::COVER_LETTER),
        }
    }
}

/// What a generation request produces.
///
/// | Kind | Output |
/// |------|--------|
/// | `cv` | the CV, tiled over as many pages as it needs |
/// | `cover-letter` | the cover letter alone |
/// | `both` | every CV page, then every cover-letter page, in one file |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Cv,
    CoverLetter,
    Both,
}

impl DocumentKind {
    /// Documents to capture, in output order.
    pub fn sources(self) -> &'static [DocumentSource] {
        match self {
            DocumentKind::Cv => &[DocumentSource::Cv],
            DocumentKind::CoverLetter => &[DocumentSource::CoverLetter],
            DocumentKind::Both => &[DocumentSource::Cv, DocumentSource::CoverLetter],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Cv => "cv",
            DocumentKind::CoverLetter => "cover-letter",
            DocumentKind::Both => "both",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = CvPressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cv" => Ok(DocumentKind::Cv),
            "cover-letter" | "cover_letter" | "coverletter" => Ok(DocumentKind::CoverLetter),
            "both" => Ok(DocumentKind::Both),
            other => Err(CvPressError::InvalidConfig(format!(
                "Unknown document kind '{other}' (expected cv, cover-letter or both)"
            ))),
        }
    }
}
