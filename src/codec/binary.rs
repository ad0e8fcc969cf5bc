//! Binary grayscale frame encoding.
//!
//! Wire layout:
//!
//! ```text
//! ┌──────────┬──────────┬──────────────────┐
//! │ Width    │ Height   │ Pixels           │
//! │ 4 bytes  │ 4 bytes  │ width*height     │
//! │ uint32 BE│ uint32 BE│ grayscale bytes  │
//! └──────────┴──────────┴──────────────────┘
//! ```
//!
//! Both header integers are Big Endian. The payload is exactly one byte
//! per pixel; the decoder replicates it into RGB before inference.
//!
//! # Example
//!
//! ```
//! use visionwire::codec::BinaryCodec;
//!
//! let gray = vec![200u8; 6];
//! let message = BinaryCodec::encode(3, 2, &gray);
//! let frame = BinaryCodec::decode(&message, usize::MAX).unwrap();
//! assert_eq!(frame.width(), 3);
//! assert_eq!(frame.height(), 2);
//! ```

use crate::error::DecodeError;
use crate::frame::Frame;

/// Header size in bytes (width + height, fixed).
pub const HEADER_SIZE: usize = 8;

/// Codec for the binary grayscale frame encoding.
///
/// Marker struct with static methods, selected at deployment time via
/// [`FrameCodec`](super::FrameCodec).
pub struct BinaryCodec;

impl BinaryCodec {
    /// Decode a binary message into a normalized RGB [`Frame`].
    ///
    /// # Errors
    ///
    /// - `ShortHeader` if fewer than 8 bytes are present
    /// - `ZeroDimension` / `FrameTooLarge` for unusable declared dimensions
    /// - `SizeMismatch` if the trailing byte count is not `width * height`
    pub fn decode(data: &[u8], max_pixels: usize) -> Result<Frame, DecodeError> {
        if data.len() < HEADER_SIZE {
            return Err(DecodeError::ShortHeader { got: data.len() });
        }

        let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);

        // Guard against absurd declared sizes before touching the payload.
        let pixels = width as usize * height as usize;
        if pixels > max_pixels {
            return Err(DecodeError::FrameTooLarge {
                pixels,
                max: max_pixels,
            });
        }

        Frame::from_grayscale(width, height, &data[HEADER_SIZE..])
    }

    /// Encode width, height, and a grayscale buffer into wire bytes.
    ///
    /// The inverse of [`decode`](Self::decode) up to the gray→RGB
    /// conversion; used by clients and round-trip tests.
    pub fn encode(width: u32, height: u32, gray: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + gray.len());
        buf.extend_from_slice(&width.to_be_bytes());
        buf.extend_from_slice(&height.to_be_bytes());
        buf.extend_from_slice(gray);
        buf
    }
}
