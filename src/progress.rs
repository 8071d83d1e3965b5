//! Progress-callback trait for per-source generation events.
//!
//! Inject an [`Arc<dyn AssemblyProgressCallback>`] via
//! [`crate::config::AssemblyConfigBuilder::progress_callback`] to receive
//! events as the assembler captures and paginates each document.
//!
//! # Example
//!
//! ```rust
//! use cvpress::{AssemblyConfig, AssemblyProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter {
//!     pages: AtomicUsize,
//! }
//!
//! impl AssemblyProgressCallback for PageCounter {
//!     fn on_source_paginated(&self, _handle: &str, page_count: usize) {
//!         self.pages.fetch_add(page_count, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(PageCounter { pages: AtomicUsize::new(0) });
//!
//! let config = AssemblyConfig::builder()
//!     .progress_callback(counter as Arc<dyn AssemblyProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::config::DocumentKind;
use std::sync::Arc;

/// Called by the assembler as it works through a generation request.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait AssemblyProgressCallback: Send + Sync {
    /// Called once before the first capture.
    ///
    /// # Arguments
    /// * `kind`         — the requested document kind
    /// * `source_count` — number of surfaces that will be captured
    fn on_generation_start(&self, kind: DocumentKind, source_count: usize) {
        let _ = (kind, source_count);
    }

    /// Called when a surface has been captured.
    ///
    /// # Arguments
    /// * `handle` — surface handle
    /// * `width`  — raster width in pixels
    /// * `height` — raster height in pixels
    fn on_source_captured(&self, handle: &str, width: u32, height: u32) {
        let _ = (handle, width, height);
    }

    /// Called when a captured surface has been paginated.
    fn on_source_paginated(&self, handle: &str, page_count: usize) {
        let _ = (handle, page_count);
    }

    /// Called once the artifact is fully written.
    fn on_generation_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called once when the request fails. No artifact follows.
    fn on_generation_failed(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AssemblyProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AssemblyConfig`].
pub type ProgressCallback = Arc<dyn AssemblyProgressCallback>;
