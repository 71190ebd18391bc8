use anyhow::{bail, Result};

/// One detector output for one frame: an axis-aligned bounding box, a class
/// identifier from the detector's own label space, and a confidence score.
///
/// Detections are ephemeral. The frame loop validates them at the detector
/// boundary and folds them into point observations immediately; nothing
/// downstream ever sees a raw box again.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub class_id: u32,
    pub confidence: f32,
}

impl Detection {
    /// Box center as integer pixel coordinates, truncated toward zero.
    pub fn center(&self) -> (i32, i32) {
        (
            ((self.x1 + self.x2) / 2.0) as i32,
            ((self.y1 + self.y2) / 2.0) as i32,
        )
    }

    /// Boundary validation. A detection enters the aggregator only after this
    /// passes; anything else is discarded as a diagnostic.
    pub fn validate(&self) -> Result<()> {
        for v in [self.x1, self.y1, self.x2, self.y2] {
            if !v.is_finite() {
                bail!("detection has non-finite box coordinate");
            }
        }
        if self.x2 < self.x1 || self.y2 < self.y1 {
            bail!(
                "detection box corners are out of order: ({}, {})..({}, {})",
                self.x1,
                self.y1,
                self.x2,
                self.y2
            );
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            bail!("detection confidence {} out of [0, 1]", self.confidence);
        }
        Ok(())
    }

    /// Intersection-over-union with another box.
    pub fn iou(&self, other: &Detection) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let iw = (ix2 - ix1).max(0.0);
        let ih = (iy2 - iy1).max(0.0);
        let intersection = iw * ih;

        let area_a = (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0);
        let area_b = (other.x2 - other.x1).max(0.0) * (other.y2 - other.y1).max(0.0);
        let union = area_a + area_b - intersection;

        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// Detector capability trait.
///
/// A detector is an opaque external collaborator (typically a pretrained
/// model). The pipeline never inspects its internals; it consumes the
/// `Vec<Detection>` contract and nothing else.
///
/// Implementations must treat the pixel slice as read-only RGB24 data and may
/// fail per call: a single-frame failure is absorbed by the frame loop and
/// never aborts a run.
pub trait Detector: Send {
    /// Backend identifier, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Run detection on one frame.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>>;

    /// Optional warm-up hook. Failures here are setup failures: they abort
    /// the run before any frame is processed.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection {
            x1,
            y1,
            x2,
            y2,
            class_id: 0,
            confidence: 0.9,
        }
    }

    #[test]
    fn center_truncates_toward_zero() {
        let det = boxed(10.0, 20.0, 15.0, 25.0);
        // (10 + 15) / 2 = 12.5 -> 12
        assert_eq!(det.center(), (12, 22));
    }

    #[test]
    fn validate_rejects_bad_confidence() {
        let mut det = boxed(0.0, 0.0, 10.0, 10.0);
        det.confidence = 1.5;
        assert!(det.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_box() {
        let det = boxed(10.0, 0.0, 5.0, 10.0);
        assert!(det.validate().is_err());
    }

    #[test]
    fn validate_rejects_nan_coordinate() {
        let det = boxed(f32::NAN, 0.0, 5.0, 10.0);
        assert!(det.validate().is_err());
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }
}
