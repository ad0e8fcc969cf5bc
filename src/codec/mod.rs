//! Codec module - inbound frame decoding.
//!
//! Two alternative encodings of the same logical frame, selected once per
//! deployment (never per message):
//!
//! - [`BinaryCodec`] - 8-byte big-endian header + grayscale bytes
//! - [`StructuredCodec`] - JSON map with an RGBA pixel array
//!
//! [`FrameCodec`] binds the deployment's choice to incoming WebSocket
//! messages and normalizes both encodings to a 3-channel RGB
//! [`Frame`](crate::frame::Frame).
//!
//! # Example
//!
//! ```
//! use visionwire::codec::{BinaryCodec, FrameCodec};
//! use visionwire::config::FrameEncoding;
//! use tokio_tungstenite::tungstenite::Message;
//!
//! let codec = FrameCodec::new(FrameEncoding::BinaryGrayscale);
//! let message = Message::binary(BinaryCodec::encode(2, 2, &[0, 64, 128, 255]));
//! let frame = codec.decode(&message).unwrap();
//! assert_eq!(frame.pixel_count(), 4);
//! ```

mod binary;
mod structured;

pub use binary::{BinaryCodec, HEADER_SIZE};
pub use structured::StructuredCodec;

use tokio_tungstenite::tungstenite::Message;

use crate::config::{FrameEncoding, DEFAULT_MAX_FRAME_PIXELS};
use crate::error::DecodeError;
use crate::frame::Frame;

/// Deployment-level frame codec.
///
/// Dispatches inbound WebSocket messages to the configured encoding and
/// rejects messages of the wrong transport type. The pixel budget bounds
/// the allocation a malicious header can demand.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    encoding: FrameEncoding,
    max_pixels: usize,
}

impl FrameCodec {
    /// Create a codec for the given encoding with the default pixel budget.
    pub fn new(encoding: FrameEncoding) -> Self {
        Self {
            encoding,
            max_pixels: DEFAULT_MAX_FRAME_PIXELS,
        }
    }

    /// Create a codec with a custom maximum declared pixel count.
    pub fn with_max_pixels(encoding: FrameEncoding, max_pixels: usize) -> Self {
        Self {
            encoding,
            max_pixels,
        }
    }

    /// The configured encoding.
    #[inline]
    pub fn encoding(&self) -> FrameEncoding {
        self.encoding
    }

    /// Decode one inbound message into a normalized [`Frame`].
    ///
    /// # Errors
    ///
    /// `UnexpectedMessage` when the WebSocket message type does not match
    /// the configured encoding; otherwise whatever the underlying codec
    /// reports.
    pub fn decode(&self, message: &Message) -> Result<Frame, DecodeError> {
        match (self.encoding, message) {
            (FrameEncoding::BinaryGrayscale, Message::Binary(data)) => {
                BinaryCodec::decode(data, self.max_pixels)
            }
            (FrameEncoding::StructuredRgba, Message::Text(text)) => {
                StructuredCodec::decode(text.as_str(), self.max_pixels)
            }
            (FrameEncoding::BinaryGrayscale, _) => {
                Err(DecodeError::UnexpectedMessage { expected: "binary" })
            }
            (FrameEncoding::StructuredRgba, _) => {
                Err(DecodeError::UnexpectedMessage { expected: "text" })
            }
        }
    }
}
