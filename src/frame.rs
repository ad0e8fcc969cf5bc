//! Normalized RGB frame.
//!
//! A [`Frame`] is one decoded image unit: width, height, and a 3-channel
//! RGB pixel buffer in row-major order. Both wire encodings normalize to
//! this layout before the detector is invoked; the detector's contract
//! requires 3-channel input. Pixels are held in `bytes::Bytes` so a frame
//! can be moved into a blocking inference task cheaply.
//!
//! # Example
//!
//! ```
//! use visionwire::frame::Frame;
//!
//! let gray = vec![128u8; 4 * 2];
//! let frame = Frame::from_grayscale(4, 2, &gray).unwrap();
//! assert_eq!(frame.width(), 4);
//! assert_eq!(frame.height(), 2);
//! assert_eq!(frame.pixels().len(), 4 * 2 * 3);
//! ```

use bytes::Bytes;

use crate::error::DecodeError;

/// Channel count of a normalized frame.
pub const RGB_CHANNELS: usize = 3;

/// One decoded image, normalized to 3-channel RGB.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    /// Row-major RGB bytes, exactly `width * height * 3` long.
    pixels: Bytes,
}

impl Frame {
    /// Build a frame from a single-channel grayscale buffer.
    ///
    /// The gray value is replicated into all three RGB channels.
    ///
    /// # Errors
    ///
    /// `ZeroDimension` if width or height is 0, `SizeMismatch` if the
    /// buffer length is not `width * height`.
    pub fn from_grayscale(width: u32, height: u32, gray: &[u8]) -> Result<Self, DecodeError> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if gray.len() != expected {
            return Err(DecodeError::SizeMismatch {
                expected,
                got: gray.len(),
            });
        }

        let mut rgb = Vec::with_capacity(expected * RGB_CHANNELS);
        for &value in gray {
            rgb.extend_from_slice(&[value, value, value]);
        }

        Ok(Self {
            width,
            height,
            pixels: Bytes::from(rgb),
        })
    }

    /// Build a frame from a 4-channel RGBA buffer, dropping the alpha
    /// channel.
    ///
    /// # Errors
    ///
    /// `ZeroDimension` if width or height is 0, `SizeMismatch` if the
    /// buffer length is not `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, DecodeError> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(DecodeError::SizeMismatch {
                expected,
                got: rgba.len(),
            });
        }

        let mut rgb = Vec::with_capacity(width as usize * height as usize * RGB_CHANNELS);
        for px in rgba.chunks_exact(4) {
            rgb.extend_from_slice(&px[..RGB_CHANNELS]);
        }

        Ok(Self {
            width,
            height,
            pixels: Bytes::from(rgb),
        })
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The normalized RGB pixel buffer.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Image area in pixels, as used by the area-rejection filter stage.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width as f32 * self.height as f32
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::ZeroDimension { width, height });
    }
    Ok(())
}
