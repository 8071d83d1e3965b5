//! Error types for the cvpress library.
//!
//! Every failure in the capture → paginate → write pipeline is fatal for the
//! request that hit it: a generation either yields a complete artifact or an
//! `Err(CvPressError)`, never a document with pages missing. Errors travel to
//! the assembler boundary unmodified so callers can tell a missing preview
//! apart from a degenerate snapshot or a disk problem.
//!
//! End users should not see any of that detail. [`CvPressError::user_message`]
//! collapses every variant into the same "try again" notice.

use std::path::PathBuf;
use thiserror::Error;

/// Notice shown to end users for any failed download.
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Download failed. Please try again.";

/// All errors returned by the cvpress library.
#[derive(Debug, Error)]
pub enum CvPressError {
    // ── Capture errors ────────────────────────────────────────────────────
    /// The surface handle did not resolve to a rendered surface at capture time.
    #[error("Surface '{handle}' not found\nRender the preview before requesting a download.")]
    SurfaceNotFound { handle: String },

    /// The surface failed while painting its pixels.
    #[error("Capture of surface '{handle}' failed: {detail}")]
    CaptureFailed { handle: String, detail: String },

    /// Capture did not finish within the configured timeout.
    #[error("Capture of surface '{handle}' timed out after {secs}s")]
    CaptureTimeout { handle: String, secs: u64 },

    // ── Pagination errors ─────────────────────────────────────────────────
    /// A raster image with zero extent in either dimension.
    #[error("Invalid raster geometry {width}x{height} px: both dimensions must be non-zero")]
    InvalidGeometry { width: u32, height: u32 },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Image or PDF serialisation failed.
    #[error("Failed to encode document: {0}")]
    EncodeFailed(String),

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Input errors ──────────────────────────────────────────────────────
    /// The structured record could not be loaded or breaks an invariant.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CvPressError {
    /// The notice to show an end user, free of internal detail.
    pub fn user_message(&self) -> &'static str {
        DOWNLOAD_FAILED_MESSAGE
    }

    /// Whether the failure came from a broken collaborator contract
    /// (missing surface or degenerate snapshot) rather than I/O.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            CvPressError::SurfaceNotFound { .. } | CvPressError::InvalidGeometry { .. }
        )
    }
}
