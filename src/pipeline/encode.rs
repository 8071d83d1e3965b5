//! Image encoding: `RgbaImage` → zlib-compressed RGB samples.
//!
//! PDF image XObjects have no alpha channel of their own. Snapshots are
//! composited onto white (the page colour) and the RGB samples are
//! deflated so the writer can embed them as-is under `/FlateDecode`.
//! Lossless, so thin rules and small print stay sharp after scaling.

use crate::error::CvPressError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbaImage;
use std::io::Write;
use tracing::debug;

/// RGB samples of one image, ready for a `/FlateDecode` image stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    /// zlib stream of `width * height * 3` bytes.
    pub data: Vec<u8>,
}

/// Blend one channel over a white background.
fn over_white(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (u32::from(channel), u32::from(alpha));
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Flatten `pixels` onto white and deflate the RGB samples.
pub fn encode_rgb_flate(pixels: &RgbaImage) -> Result<EncodedImage, CvPressError> {
    let (width, height) = pixels.dimensions();
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for p in pixels.pixels() {
        let [r, g, b, a] = p.0;
        rgb.extend_from_slice(&[over_white(r, a), over_white(g, a), over_white(b, a)]);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&rgb)
        .map_err(|e| CvPressError::EncodeFailed(e.to_string()))?;
    let data = encoder
        .finish()
        .map_err(|e| CvPressError::EncodeFailed(e.to_string()))?;

    debug!(
        "Encoded {}x{} image → {} bytes deflated ({} raw)",
        width,
        height,
        data.len(),
        rgb.len()
    );
    Ok(EncodedImage {
        width,
        height,
        data,
    })
}
