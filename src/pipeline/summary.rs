//! Result summarization.
//!
//! Reduces the two observation streams into the final result record. This is
//! a total function: zero frames or zero detections still produce a
//! well-formed report, never an error.

use std::collections::BTreeSet;

use crate::pipeline::aggregate::PointObservation;
use crate::report::{AnalysisReport, HeatmapPoint, VideoDimensions};

/// Default confidence gate for the shot-count proxy.
pub const DEFAULT_SHOT_CONFIDENCE: f32 = 0.5;

/// Reduce the streams into the result record.
///
/// `heatmap_data` is the player stream verbatim, order-preserving, with no
/// deduplication or downsampling. `total_shots` is the number of distinct
/// frames whose ball event exceeds `confidence_threshold`. It is a coarse
/// proxy for ball-contact events, not a true shot detector: it over-counts
/// rallies but is cheap and monotonic in detector recall.
pub fn summarize(
    player_points: Vec<PointObservation>,
    ball_events: &[PointObservation],
    dimensions: VideoDimensions,
    confidence_threshold: f32,
) -> AnalysisReport {
    let confident_frames: BTreeSet<u64> = ball_events
        .iter()
        .filter(|event| event.confidence > confidence_threshold)
        .map(|event| event.frame)
        .collect();

    let heatmap_data = player_points
        .into_iter()
        .map(|point| HeatmapPoint {
            x: point.x,
            y: point.y,
            conf: point.confidence,
        })
        .collect();

    AnalysisReport {
        total_shots: confident_frames.len() as u64,
        heatmap_data,
        video_dimensions: dimensions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: VideoDimensions = VideoDimensions {
        width: 1920,
        height: 1080,
    };

    fn obs(frame: u64, confidence: f32) -> PointObservation {
        PointObservation {
            frame,
            x: 5,
            y: 6,
            confidence,
        }
    }

    #[test]
    fn empty_streams_yield_a_well_formed_report() {
        let report = summarize(Vec::new(), &[], DIMS, DEFAULT_SHOT_CONFIDENCE);
        assert_eq!(report.total_shots, 0);
        assert!(report.heatmap_data.is_empty());
        assert_eq!(report.video_dimensions, DIMS);
    }

    #[test]
    fn shot_count_is_distinct_confident_frames() {
        let events = [obs(1, 0.9), obs(2, 0.6), obs(3, 0.2)];
        let report = summarize(Vec::new(), &events, DIMS, DEFAULT_SHOT_CONFIDENCE);
        assert_eq!(report.total_shots, 2);
    }

    #[test]
    fn threshold_comparison_is_strict() {
        let events = [obs(1, 0.5)];
        let report = summarize(Vec::new(), &events, DIMS, 0.5);
        assert_eq!(report.total_shots, 0);
    }

    #[test]
    fn shot_count_is_monotone_in_the_threshold() {
        let events = [obs(1, 0.3), obs(2, 0.6), obs(3, 0.9)];
        let mut last = u64::MAX;
        for threshold in [0.95, 0.7, 0.5, 0.2, 0.0] {
            let shots = summarize(Vec::new(), &events, DIMS, threshold).total_shots;
            assert!(shots <= events.len() as u64);
            assert!(last == u64::MAX || shots >= last);
            last = shots;
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn heatmap_preserves_order_and_length() {
        let points = vec![
            PointObservation {
                frame: 1,
                x: 1,
                y: 2,
                confidence: 0.9,
            },
            PointObservation {
                frame: 1,
                x: 3,
                y: 4,
                confidence: 0.1,
            },
            PointObservation {
                frame: 2,
                x: 5,
                y: 6,
                confidence: 0.7,
            },
        ];
        let report = summarize(points, &[], DIMS, DEFAULT_SHOT_CONFIDENCE);
        assert_eq!(report.heatmap_data.len(), 3);
        assert_eq!(report.heatmap_data[0], HeatmapPoint { x: 1, y: 2, conf: 0.9 });
        assert_eq!(report.heatmap_data[2], HeatmapPoint { x: 5, y: 6, conf: 0.7 });
    }
}
