//! Error types for visionwire.

use thiserror::Error;

/// Errors produced while decoding an inbound frame message.
///
/// Every variant is a per-frame condition: the session reports it back to
/// the client and keeps running. None of these tear down a connection.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Binary message shorter than the 8-byte width/height header.
    #[error("binary frame too short: {got} bytes, need at least 8 for the header")]
    ShortHeader { got: usize },

    /// Pixel buffer length disagrees with the declared dimensions.
    #[error("pixel buffer size mismatch: expected {expected} bytes, got {got}")]
    SizeMismatch { expected: usize, got: usize },

    /// Structured frame is missing a required field.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// Declared width or height is zero.
    #[error("frame dimensions must be non-zero: {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    /// Declared dimensions exceed the configured pixel budget.
    #[error("frame declares {pixels} pixels, exceeds maximum {max}")]
    FrameTooLarge { pixels: usize, max: usize },

    /// Structured frame is not valid JSON (or fields have the wrong type).
    #[error("malformed structured frame: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket message type does not match the configured encoding.
    #[error("expected a {expected} message for the configured frame encoding")]
    UnexpectedMessage { expected: &'static str },
}

/// Main error type for all visionwire operations.
#[derive(Debug, Error)]
pub enum VisionwireError {
    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket protocol or transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Inbound frame could not be decoded (recovered per frame).
    #[error("frame decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Outbound message serialization error.
    #[error("response encode error: {0}")]
    Json(#[from] serde_json::Error),

    /// The detector failed on this frame (recovered per frame).
    #[error("inference failed: {0}")]
    Inference(String),

    /// The detector exceeded the configured per-frame deadline.
    #[error("inference timed out after {0:?}")]
    InferenceTimeout(std::time::Duration),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type alias using VisionwireError.
pub type Result<T> = std::result::Result<T, VisionwireError>;

impl VisionwireError {
    /// Whether this error is recoverable within a session.
    ///
    /// Recoverable errors are reported to the client as an error response
    /// and the session stays active; anything else ends the session.
    pub fn is_per_frame(&self) -> bool {
        matches!(
            self,
            VisionwireError::Decode(_)
                | VisionwireError::Inference(_)
                | VisionwireError::InferenceTimeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_messages() {
        let err = DecodeError::ShortHeader { got: 6 };
        assert!(err.to_string().contains("6 bytes"));

        let err = DecodeError::SizeMismatch {
            expected: 100,
            got: 42,
        };
        assert!(err.to_string().contains("expected 100"));
        assert!(err.to_string().contains("got 42"));

        let err = DecodeError::MissingField("pixels");
        assert_eq!(err.to_string(), "missing field `pixels`");
    }

    #[test]
    fn test_per_frame_classification() {
        let decode = VisionwireError::Decode(DecodeError::ShortHeader { got: 0 });
        assert!(decode.is_per_frame());

        let inference = VisionwireError::Inference("model exploded".to_string());
        assert!(inference.is_per_frame());

        let timeout = VisionwireError::InferenceTimeout(std::time::Duration::from_secs(1));
        assert!(timeout.is_per_frame());

        let closed = VisionwireError::ConnectionClosed;
        assert!(!closed.is_per_frame());

        let io = VisionwireError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "boom",
        ));
        assert!(!io.is_per_frame());
    }

    #[test]
    fn test_decode_error_converts_to_top_level() {
        let err: VisionwireError = DecodeError::ZeroDimension {
            width: 0,
            height: 480,
        }
        .into();
        assert!(matches!(err, VisionwireError::Decode(_)));
    }
}
