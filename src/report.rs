//! Result record and wire shapes.
//!
//! A run produces exactly one of two JSON objects: `AnalysisReport` on the
//! success channel or `ErrorReport` on the failure channel, never a mix. The
//! field names here are the boundary contract with the job orchestrator and
//! must not drift.

use serde::{Deserialize, Serialize};

/// The single terminal artifact of a pipeline run. Created once after the
/// last frame and immutable thereafter.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    /// Shot-count proxy: distinct frames with a confident ball sighting.
    pub total_shots: u64,
    /// All qualifying player center points, in frame order.
    pub heatmap_data: Vec<HeatmapPoint>,
    /// Source dimensions, passed through for frontend scaling.
    pub video_dimensions: VideoDimensions,
}

/// One player-center observation, used downstream purely for spatial
/// visualization.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct HeatmapPoint {
    pub x: i32,
    pub y: i32,
    pub conf: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

/// The failure shape. No partial result fields accompany an error.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_with_contract_field_names() {
        let report = AnalysisReport {
            total_shots: 2,
            heatmap_data: vec![HeatmapPoint {
                x: 12,
                y: 34,
                conf: 0.75,
            }],
            video_dimensions: VideoDimensions {
                width: 1280,
                height: 720,
            },
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_shots"], 2);
        assert_eq!(json["heatmap_data"][0]["x"], 12);
        assert_eq!(json["heatmap_data"][0]["conf"], 0.75);
        assert_eq!(json["video_dimensions"]["width"], 1280);
        assert_eq!(json["video_dimensions"]["height"], 720);
    }

    #[test]
    fn error_report_has_only_the_error_field() {
        let json = serde_json::to_value(ErrorReport::new("could not open video")).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object["error"], "could not open video");
    }
}
