//! Configuration types and defaults.
//!
//! All tunables live here as plain structs with [`Default`] implementations
//! and `DEFAULT_*` constants. Deployment-level choices (frame encoding,
//! filter thresholds, inference limits) are set once on the
//! [`ServerBuilder`](crate::ServerBuilder) and shared by every session.

use std::time::Duration;

/// Default maximum box area as a fraction of the image area.
///
/// Boxes at or above this fraction are treated as spurious full-frame
/// detections and rejected before NMS.
pub const DEFAULT_MAX_AREA_FRACTION: f32 = 0.05;

/// Default IoU threshold for greedy non-maximum suppression.
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.5;

/// Default maximum concurrent detector invocations across all sessions.
pub const DEFAULT_MAX_CONCURRENT_INFERENCE: usize = 2;

/// Default maximum declared pixel count for an inbound frame (8192x8192).
pub const DEFAULT_MAX_FRAME_PIXELS: usize = 8192 * 8192;

/// Inbound frame encoding, selected once per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameEncoding {
    /// Binary message: u32 BE width, u32 BE height, then width*height
    /// single-channel grayscale bytes.
    #[default]
    BinaryGrayscale,
    /// JSON text message: `{"width", "height", "pixels"}` with a flat RGBA
    /// array of length width*height*4.
    StructuredRgba,
}

/// Order in which the two filter stages are applied.
///
/// The area filter and NMS are independent; which one runs first is a
/// deployment choice, not a fixed property of the algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageOrder {
    /// Reject oversized boxes first, then suppress overlaps (default).
    #[default]
    AreaThenNms,
    /// Suppress overlaps first, then reject oversized boxes.
    NmsThenArea,
}

/// Configuration for the detection post-processing filter.
///
/// Either stage can be disabled by setting its threshold to `None`.
///
/// # Example
///
/// ```
/// use visionwire::config::{FilterConfig, StageOrder};
///
/// let config = FilterConfig {
///     max_area_fraction: Some(0.3),
///     iou_threshold: Some(0.5),
///     stage_order: StageOrder::AreaThenNms,
/// };
/// assert_eq!(config.stage_order, StageOrder::AreaThenNms);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    /// Reject boxes with area >= this fraction of the image area.
    /// `None` disables area rejection.
    pub max_area_fraction: Option<f32>,
    /// Suppress boxes with IoU >= this threshold against an accepted box.
    /// `None` disables NMS.
    pub iou_threshold: Option<f32>,
    /// Which stage runs first.
    pub stage_order: StageOrder,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_area_fraction: Some(DEFAULT_MAX_AREA_FRACTION),
            iou_threshold: Some(DEFAULT_IOU_THRESHOLD),
            stage_order: StageOrder::default(),
        }
    }
}

impl FilterConfig {
    /// Configuration with both stages disabled (raw detector output
    /// passes through unchanged).
    pub fn disabled() -> Self {
        Self {
            max_area_fraction: None,
            iou_threshold: None,
            stage_order: StageOrder::default(),
        }
    }
}

/// Limits applied to detector invocations.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Maximum concurrent detector calls across all sessions.
    pub max_concurrent: usize,
    /// Optional per-frame inference deadline. `None` means unbounded.
    pub timeout: Option<Duration>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT_INFERENCE,
            timeout: None,
        }
    }
}
