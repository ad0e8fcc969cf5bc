//! Structured RGBA frame encoding.
//!
//! The client sends one JSON text message per frame:
//!
//! ```json
//! {"width": 2, "height": 1, "pixels": [255, 0, 0, 255, 0, 255, 0, 255]}
//! ```
//!
//! `pixels` is a flat array of length `width * height * 4` in R,G,B,A
//! row-major order. The decoder drops the alpha channel while normalizing
//! to RGB.

use serde::Deserialize;

use crate::error::DecodeError;
use crate::frame::Frame;

/// Raw deserialization target; fields are optional so absence can be
/// reported as `MissingField` instead of an opaque JSON error.
#[derive(Debug, Deserialize)]
struct StructuredFrame {
    width: Option<u32>,
    height: Option<u32>,
    pixels: Option<Vec<u8>>,
}

/// Codec for the structured RGBA frame encoding.
pub struct StructuredCodec;

impl StructuredCodec {
    /// Decode a JSON text message into a normalized RGB [`Frame`].
    ///
    /// # Errors
    ///
    /// - `Json` if the message is not a JSON map of the right shape
    /// - `MissingField` if `width`, `height` or `pixels` is absent
    /// - `ZeroDimension` / `FrameTooLarge` for unusable declared dimensions
    /// - `SizeMismatch` if `pixels.len() != width * height * 4`
    pub fn decode(text: &str, max_pixels: usize) -> Result<Frame, DecodeError> {
        let raw: StructuredFrame = serde_json::from_str(text)?;

        let width = raw.width.ok_or(DecodeError::MissingField("width"))?;
        let height = raw.height.ok_or(DecodeError::MissingField("height"))?;
        let pixels = raw.pixels.ok_or(DecodeError::MissingField("pixels"))?;

        let declared = width as usize * height as usize;
        if declared > max_pixels {
            return Err(DecodeError::FrameTooLarge {
                pixels: declared,
                max: max_pixels,
            });
        }

        Frame::from_rgba(width, height, &pixels)
    }
}
