//! Outbound message serialization.
//!
//! Every inbound frame message gets exactly one outbound JSON text message,
//! one of two mutually exclusive shapes:
//!
//! ```json
//! {"predictions": [{"box": [x1, y1, x2, y2], "score": 0.9, "class": 0}]}
//! {"error": "pixel buffer size mismatch: expected 16 bytes, got 10"}
//! ```
//!
//! # Example
//!
//! ```
//! use visionwire::response::{Response, ResponseCodec};
//!
//! let text = ResponseCodec::encode(&Response::error("bad frame")).unwrap();
//! assert_eq!(text, r#"{"error":"bad frame"}"#);
//! ```

use serde::{Deserialize, Serialize};

use crate::detect::RawDetection;
use crate::error::Result;

/// One detection as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Corner coordinates `[x1, y1, x2, y2]` in image pixels.
    #[serde(rename = "box")]
    pub bbox: [f32; 4],
    /// Confidence score.
    pub score: f32,
    /// Class index.
    pub class: u32,
}

impl From<RawDetection> for Prediction {
    fn from(det: RawDetection) -> Self {
        Self {
            bbox: det.bbox.to_array(),
            score: det.score,
            class: det.class_id,
        }
    }
}

/// One outbound message: either the filtered detections for a frame or a
/// per-frame error report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// Successful frame: filtered detections in acceptance order.
    Predictions { predictions: Vec<Prediction> },
    /// Failed frame: human-readable cause. The session stays active.
    Error { error: String },
}

impl Response {
    /// Build a success response from filtered detections, preserving order.
    pub fn predictions(detections: Vec<RawDetection>) -> Self {
        Self::Predictions {
            predictions: detections.into_iter().map(Prediction::from).collect(),
        }
    }

    /// Build an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Whether this is an error response.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

/// Serializer for outbound messages.
pub struct ResponseCodec;

impl ResponseCodec {
    /// Encode a response as the JSON text of one WebSocket message.
    pub fn encode(response: &Response) -> Result<String> {
        Ok(serde_json::to_string(response)?)
    }

    /// Decode an outbound message (client side and tests).
    pub fn decode(text: &str) -> Result<Response> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::RawDetection;

    #[test]
    fn test_predictions_shape() {
        let response = Response::predictions(vec![
            RawDetection::new([0.0, 1.0, 10.0, 11.0], 0.9, 2),
            RawDetection::new([5.0, 5.0, 6.0, 6.0], 0.5, 0),
        ]);
        let text = ResponseCodec::encode(&response).unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let predictions = value["predictions"].as_array().unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0]["box"][2], 10.0);
        assert_eq!(predictions[0]["score"], 0.9);
        assert_eq!(predictions[0]["class"], 2);
        // Shapes are mutually exclusive.
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_shape() {
        let text = ResponseCodec::encode(&Response::error("boom")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["error"], "boom");
        assert!(value.get("predictions").is_none());
    }

    #[test]
    fn test_empty_predictions_is_success_shape() {
        let text = ResponseCodec::encode(&Response::predictions(vec![])).unwrap();
        assert_eq!(text, r#"{"predictions":[]}"#);
    }

    #[test]
    fn test_decode_roundtrip() {
        let original = Response::predictions(vec![RawDetection::new(
            [1.0, 2.0, 3.0, 4.0],
            0.75,
            1,
        )]);
        let text = ResponseCodec::encode(&original).unwrap();
        let decoded = ResponseCodec::decode(&text).unwrap();
        assert_eq!(decoded, original);

        let original = Response::error("went sideways");
        let decoded = ResponseCodec::decode(&ResponseCodec::encode(&original).unwrap()).unwrap();
        assert!(decoded.is_error());
    }

    #[test]
    fn test_preserves_ordering() {
        let response = Response::predictions(vec![
            RawDetection::new([0.0, 0.0, 1.0, 1.0], 0.9, 0),
            RawDetection::new([0.0, 0.0, 1.0, 1.0], 0.6, 1),
            RawDetection::new([0.0, 0.0, 1.0, 1.0], 0.3, 2),
        ]);
        let Response::Predictions { predictions } = response else {
            panic!("expected predictions");
        };
        let classes: Vec<u32> = predictions.iter().map(|p| p.class).collect();
        assert_eq!(classes, vec![0, 1, 2]);
    }
}
