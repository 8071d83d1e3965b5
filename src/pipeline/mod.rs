//! Pipeline stages for turning rendered previews into a paginated PDF.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested without the others.
//!
//! ## Data Flow
//!
//! ```text
//! surface ──▶ capture ──▶ paginate ──▶ encode ──▶ write
//! (handle)    (2× RGBA)   (placements)  (deflate)  (lopdf)
//! ```
//!
//! 1. [`capture`]  — resolve a surface handle and paint it at the oversampling
//!    scale; runs in `spawn_blocking` and is the only suspension point
//! 2. [`paginate`] — pure arithmetic: scale to page width, slice into page
//!    windows, each image on fresh pages
//! 3. [`encode`]   — flatten RGBA onto white and deflate the RGB samples
//! 4. [`write`]    — embed each image once and draw it on every page the plan
//!    assigns to it

pub mod capture;
pub mod encode;
pub mod paginate;
pub mod write;
