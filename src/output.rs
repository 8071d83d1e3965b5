//! Output types: the assembled artifact and its run statistics.

use crate::config::DocumentKind;
use crate::view::SurfaceHandle;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// A finished PDF held in memory, ready to be delivered.
#[derive(Debug, Clone)]
pub struct DocumentArtifact {
    /// Suggested download name, e.g. `Ada Obi_CV.pdf`.
    pub filename: String,
    /// Complete PDF file contents.
    pub bytes: Vec<u8>,
    pub stats: AssemblyStats,
}

impl DocumentArtifact {
    /// Number of physical pages in the document.
    pub fn page_count(&self) -> usize {
        self.stats.total_pages
    }
}

/// Per-source numbers for one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStats {
    pub handle: SurfaceHandle,
    /// Captured raster width in device pixels (after oversampling).
    pub width_px: u32,
    pub height_px: u32,
    pub page_count: usize,
}

/// Statistics from one generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblyStats {
    pub kind: DocumentKind,
    pub total_pages: usize,
    pub sources: Vec<SourceStats>,
    /// Size of the PDF in bytes.
    pub output_bytes: usize,
    /// Wall-clock time for the whole request.
    pub total_duration_ms: u64,
    /// Time spent capturing surfaces.
    pub capture_duration_ms: u64,
    /// Time spent encoding images and serialising the PDF.
    pub write_duration_ms: u64,
}

/// Characters that cannot appear in a filename on common filesystems.
static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1F]+"#).expect("valid regex"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Make `name` safe to use as a filename stem.
///
/// Path separators and reserved characters become `_`, whitespace runs
/// collapse to one space and leading dots are dropped so the result can
/// never name a parent directory or a hidden file.
pub fn sanitize_file_stem(name: &str) -> String {
    let replaced = UNSAFE_FILENAME_CHARS.replace_all(name, "_");
    let collapsed = WHITESPACE_RUN.replace_all(&replaced, " ");
    collapsed.trim().trim_start_matches('.').trim().to_string()
}

/// Download name for `kind`, derived from the person's full name.
///
/// | Kind | Name |
/// |------|------|
/// | `cv` | `{name}_CV.pdf` |
/// | `cover-letter` | `{name}_Cover_Letter.pdf` |
/// | `both` | `{name}_Documents.pdf` |
///
/// An empty or fully unsafe name falls back to the suffix alone,
/// e.g. `CV.pdf`.
pub fn default_filename(kind: DocumentKind, full_name: &str) -> String {
    let suffix = match kind {
        DocumentKind::Cv => "CV",
        DocumentKind::CoverLetter => "Cover_Letter",
        DocumentKind::Both => "Documents",
    };
    let stem = sanitize_file_stem(full_name);
    if stem.is_empty() {
        format!("{suffix}.pdf")
    } else {
        format!("{stem}_{suffix}.pdf")
    }
}
