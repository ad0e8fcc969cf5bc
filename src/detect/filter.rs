//! Detection post-processing: area rejection and greedy NMS.
//!
//! Raw detector output goes through two sequential stages, each optional
//! via [`FilterConfig`]:
//!
//! 1. **Area rejection** - discard boxes covering too much of the image.
//!    Detection models fire spurious near-full-frame boxes often enough
//!    that these are rejected wholesale.
//! 2. **Greedy NMS** - keep the highest-score detection of each overlap
//!    cluster, suppress the rest.
//!
//! The greedy loop is an explicit accepted/suppressed two-list pass over
//! indices; nothing is mutated while being iterated. Output order is
//! acceptance order (highest remaining score first), not detector order.
//!
//! # Example
//!
//! ```
//! use visionwire::config::FilterConfig;
//! use visionwire::detect::{DetectionFilter, RawDetection};
//!
//! let filter = DetectionFilter::new(FilterConfig::default());
//! let raw = vec![
//!     RawDetection::new([0.0, 0.0, 10.0, 10.0], 0.9, 0),
//!     RawDetection::new([1.0, 1.0, 9.0, 9.0], 0.8, 0),
//! ];
//! // The pair overlaps at IoU 0.64 >= 0.5, so only the stronger survives.
//! let kept = filter.filter(raw, 1000.0 * 1000.0);
//! assert_eq!(kept.len(), 1);
//! assert_eq!(kept[0].score, 0.9);
//! ```

use std::cmp::Ordering;

use crate::config::{FilterConfig, StageOrder};
use crate::detect::RawDetection;

/// Applies the configured post-processing stages to raw detector output.
#[derive(Debug, Clone)]
pub struct DetectionFilter {
    config: FilterConfig,
}

impl DetectionFilter {
    /// Create a filter with the given configuration.
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Run both stages in the configured order.
    ///
    /// `image_area` is the full frame area in pixels (width * height).
    /// An empty input yields an empty output; a stage that rejects
    /// everything leaves the next stage a valid empty input.
    pub fn filter(&self, raw: Vec<RawDetection>, image_area: f32) -> Vec<RawDetection> {
        if raw.is_empty() {
            return raw;
        }

        match self.config.stage_order {
            StageOrder::AreaThenNms => {
                let kept = self.reject_large(raw, image_area);
                self.greedy_nms(kept)
            }
            StageOrder::NmsThenArea => {
                let kept = self.greedy_nms(raw);
                self.reject_large(kept, image_area)
            }
        }
    }

    /// Stage 1: discard detections with box area >= fraction * image area.
    fn reject_large(&self, detections: Vec<RawDetection>, image_area: f32) -> Vec<RawDetection> {
        let Some(fraction) = self.config.max_area_fraction else {
            return detections;
        };
        let threshold = fraction * image_area;

        detections
            .into_iter()
            .filter(|det| det.bbox.area() < threshold)
            .collect()
    }

    /// Stage 2: greedy non-maximum suppression.
    ///
    /// Repeatedly accepts the highest-score remaining detection and
    /// suppresses every remaining detection whose IoU with it is at or
    /// above the threshold. Ties on score resolve first-encountered-wins:
    /// the sort is stable, so detector order breaks the tie
    /// deterministically.
    fn greedy_nms(&self, detections: Vec<RawDetection>) -> Vec<RawDetection> {
        let Some(threshold) = self.config.iou_threshold else {
            return detections;
        };

        let mut order: Vec<usize> = (0..detections.len()).collect();
        order.sort_by(|&a, &b| {
            detections[b]
                .score
                .partial_cmp(&detections[a].score)
                .unwrap_or(Ordering::Equal)
        });

        let mut suppressed = vec![false; detections.len()];
        let mut accepted = Vec::new();

        for pos in 0..order.len() {
            let best = order[pos];
            if suppressed[best] {
                continue;
            }
            accepted.push(best);

            for &other in &order[pos + 1..] {
                if !suppressed[other]
                    && detections[best].bbox.iou(&detections[other].bbox) >= threshold
                {
                    suppressed[other] = true;
                }
            }
        }

        accepted
            .into_iter()
            .map(|index| detections[index].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterConfig, StageOrder};

    fn det(coords: [f32; 4], score: f32, class_id: u32) -> RawDetection {
        RawDetection::new(coords, score, class_id)
    }

    fn nms_only(threshold: f32) -> DetectionFilter {
        DetectionFilter::new(FilterConfig {
            max_area_fraction: None,
            iou_threshold: Some(threshold),
            stage_order: StageOrder::default(),
        })
    }

    fn area_only(fraction: f32) -> DetectionFilter {
        DetectionFilter::new(FilterConfig {
            max_area_fraction: Some(fraction),
            iou_threshold: None,
            stage_order: StageOrder::default(),
        })
    }

    #[test]
    fn test_empty_input_empty_output() {
        let filter = DetectionFilter::new(FilterConfig::default());
        assert!(filter.filter(vec![], 10_000.0).is_empty());

        let filter = DetectionFilter::new(FilterConfig::disabled());
        assert!(filter.filter(vec![], 10_000.0).is_empty());
    }

    #[test]
    fn test_disabled_filter_passes_through() {
        let filter = DetectionFilter::new(FilterConfig::disabled());
        let raw = vec![
            det([0.0, 0.0, 100.0, 100.0], 0.9, 0),
            det([0.0, 0.0, 100.0, 100.0], 0.8, 1),
        ];
        let kept = filter.filter(raw.clone(), 100.0 * 100.0);
        assert_eq!(kept, raw);
    }

    #[test]
    fn test_nms_suppresses_overlap() {
        // Pair IoU 0.64 >= 0.5, stronger box survives.
        let filter = nms_only(0.5);
        let raw = vec![
            det([0.0, 0.0, 10.0, 10.0], 0.9, 0),
            det([1.0, 1.0, 9.0, 9.0], 0.8, 0),
        ];
        let kept = filter.filter(raw, 10_000.0);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.9);
        assert_eq!(kept[0].bbox.to_array(), [0.0, 0.0, 10.0, 10.0]);
    }

    #[test]
    fn test_nms_threshold_one_keeps_overlapping_boxes() {
        // At threshold 1.0 no non-identical pair reaches suppression.
        let filter = nms_only(1.0);
        let raw = vec![
            det([0.0, 0.0, 10.0, 10.0], 0.9, 0),
            det([1.0, 1.0, 9.0, 9.0], 0.8, 0),
            det([2.0, 2.0, 8.0, 8.0], 0.7, 0),
        ];
        let kept = filter.filter(raw, 10_000.0);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_nms_threshold_zero_keeps_only_global_best() {
        // Suppression triggers at IoU >= threshold, and disjoint boxes
        // have IoU exactly 0, so threshold 0.0 collapses everything to the
        // single top-score detection.
        let filter = nms_only(0.0);
        let raw = vec![
            det([0.0, 0.0, 10.0, 10.0], 0.6, 0),
            det([1.0, 1.0, 9.0, 9.0], 0.9, 0),
            det([100.0, 100.0, 110.0, 110.0], 0.8, 0),
        ];
        let kept = filter.filter(raw, 1_000_000.0);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.9);
    }

    #[test]
    fn test_nms_one_survivor_per_disjoint_cluster() {
        // Any threshold above 0 leaves disjoint clusters independent:
        // one survivor each.
        let filter = nms_only(0.5);
        let raw = vec![
            det([0.0, 0.0, 10.0, 10.0], 0.6, 0),
            det([1.0, 1.0, 9.0, 9.0], 0.9, 0),
            det([100.0, 100.0, 110.0, 110.0], 0.8, 0),
            det([101.0, 101.0, 109.0, 109.0], 0.5, 0),
        ];
        let kept = filter.filter(raw, 1_000_000.0);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 0.9);
        assert_eq!(kept[1].score, 0.8);
    }

    #[test]
    fn test_nms_threshold_zero_all_overlapping() {
        // When every box overlaps every other, only the global best stays.
        let filter = nms_only(0.0);
        let raw = vec![
            det([0.0, 0.0, 10.0, 10.0], 0.5, 0),
            det([5.0, 5.0, 15.0, 15.0], 0.95, 1),
            det([2.0, 2.0, 12.0, 12.0], 0.7, 2),
        ];
        let kept = filter.filter(raw, 10_000.0);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.95);
    }

    #[test]
    fn test_nms_output_is_acceptance_order() {
        let filter = nms_only(0.5);
        let raw = vec![
            det([0.0, 0.0, 10.0, 10.0], 0.3, 0),
            det([50.0, 50.0, 60.0, 60.0], 0.9, 1),
            det([100.0, 0.0, 110.0, 10.0], 0.6, 2),
        ];
        let kept = filter.filter(raw, 1_000_000.0);

        let scores: Vec<f32> = kept.iter().map(|d| d.score).collect();
        assert_eq!(scores, vec![0.9, 0.6, 0.3]);
    }

    #[test]
    fn test_nms_tie_break_first_encountered_wins() {
        let filter = nms_only(0.5);
        // Same score, heavy overlap: the first in detector order survives.
        let raw = vec![
            det([0.0, 0.0, 10.0, 10.0], 0.8, 7),
            det([1.0, 1.0, 9.0, 9.0], 0.8, 3),
        ];
        let kept = filter.filter(raw, 10_000.0);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].class_id, 7);
    }

    #[test]
    fn test_nms_is_class_agnostic() {
        let filter = nms_only(0.5);
        let raw = vec![
            det([0.0, 0.0, 10.0, 10.0], 0.9, 0),
            det([1.0, 1.0, 9.0, 9.0], 0.8, 5),
        ];
        // Different classes still suppress each other.
        assert_eq!(filter.filter(raw, 10_000.0).len(), 1);
    }

    #[test]
    fn test_area_filter_rejects_full_frame_box() {
        // 100x100 box on a 100x100 image, fraction 0.3.
        let filter = area_only(0.3);
        let raw = vec![det([0.0, 0.0, 100.0, 100.0], 0.99, 1)];
        let kept = filter.filter(raw, 100.0 * 100.0);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_area_filter_fraction_one_keeps_partial_boxes() {
        let filter = area_only(1.0);
        let raw = vec![
            det([0.0, 0.0, 50.0, 50.0], 0.9, 0),
            det([0.0, 0.0, 99.0, 99.0], 0.8, 0),
        ];
        let kept = filter.filter(raw.clone(), 100.0 * 100.0);
        assert_eq!(kept, raw);
    }

    #[test]
    fn test_area_filter_fraction_zero_removes_everything() {
        let filter = area_only(0.0);
        let raw = vec![
            det([0.0, 0.0, 1.0, 1.0], 0.9, 0),
            det([0.0, 0.0, 50.0, 50.0], 0.8, 0),
        ];
        assert!(filter.filter(raw, 100.0 * 100.0).is_empty());
    }

    #[test]
    fn test_area_rejecting_everything_is_valid_nms_input() {
        let filter = DetectionFilter::new(FilterConfig {
            max_area_fraction: Some(0.0),
            iou_threshold: Some(0.5),
            stage_order: StageOrder::AreaThenNms,
        });
        let raw = vec![det([0.0, 0.0, 10.0, 10.0], 0.9, 0)];
        assert!(filter.filter(raw, 10_000.0).is_empty());
    }

    #[test]
    fn test_stage_order_changes_result() {
        // One oversized box with the top score. Area-first removes it
        // before NMS, letting the smaller overlapping box survive.
        // NMS-first lets the oversized box suppress the smaller one and
        // then rejects itself, leaving nothing.
        let raw = vec![
            det([0.0, 0.0, 100.0, 100.0], 0.99, 0),
            det([10.0, 10.0, 90.0, 90.0], 0.5, 0),
        ];
        let image_area = 100.0 * 100.0;

        let area_first = DetectionFilter::new(FilterConfig {
            max_area_fraction: Some(0.8),
            iou_threshold: Some(0.5),
            stage_order: StageOrder::AreaThenNms,
        });
        let kept = area_first.filter(raw.clone(), image_area);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.5);

        let nms_first = DetectionFilter::new(FilterConfig {
            max_area_fraction: Some(0.8),
            iou_threshold: Some(0.5),
            stage_order: StageOrder::NmsThenArea,
        });
        assert!(nms_first.filter(raw, image_area).is_empty());
    }
}
