//! Detection module - detector seam and detection data model.
//!
//! Provides:
//! - [`BoundingBox`] - axis-aligned box with area and IoU math
//! - [`RawDetection`] - one candidate detection from the detector
//! - [`Detector`] - the external inference capability, treated as opaque
//! - [`filter::DetectionFilter`] - area rejection + greedy NMS
//!
//! The detector itself (model loading, tensors, execution providers) is
//! deliberately outside this crate: anything that can map an RGB frame to
//! candidate boxes can be plugged in behind the [`Detector`] trait.

pub mod filter;

pub use filter::DetectionFilter;

use crate::error::VisionwireError;
use crate::frame::Frame;

/// Axis-aligned bounding box in image pixel coordinates.
///
/// Invariant: `x1 <= x2` and `y1 <= y2`. Degenerate (zero-area) boxes are
/// legal; their IoU against anything is 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    /// Create a new box from corner coordinates.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box area, clamped at zero for degenerate coordinates.
    #[inline]
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    /// Intersection area with another box, 0 when they do not overlap.
    #[inline]
    pub fn intersection(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        (x2 - x1).max(0.0) * (y2 - y1).max(0.0)
    }

    /// Intersection over Union with another box.
    ///
    /// Defined as 0 when the union is 0 (two degenerate boxes), so the
    /// result is always in `[0, 1]`.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let intersection = self.intersection(other);
        let union = self.area() + other.area() - intersection;

        if union == 0.0 {
            return 0.0;
        }
        intersection / union
    }

    /// Corner coordinates as `[x1, y1, x2, y2]`, the outbound wire order.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

/// One raw candidate detection produced by the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Detection box in image pixel coordinates.
    pub bbox: BoundingBox,
    /// Confidence score in `[0, 1]`.
    pub score: f32,
    /// Non-negative class index.
    pub class_id: u32,
}

impl RawDetection {
    /// Create a new detection.
    pub fn new(bbox: impl Into<BoundingBox>, score: f32, class_id: u32) -> Self {
        Self {
            bbox: bbox.into(),
            score,
            class_id,
        }
    }
}

/// External object-detection capability.
///
/// Implementations map a normalized RGB frame to raw candidate detections.
/// A detector is process-wide shared read-only state: loaded once at
/// startup, shared across sessions as `Arc<dyn Detector>`, never mutated.
/// Calls may block and may be rate-limited; the server bounds concurrent
/// invocations with a semaphore and runs them on the blocking pool.
///
/// Failures are reported as [`VisionwireError::Inference`] and recovered
/// per frame.
pub trait Detector: Send + Sync {
    /// Run inference on one frame and return raw candidate detections.
    fn infer(&self, frame: &Frame) -> Result<Vec<RawDetection>, VisionwireError>;
}
