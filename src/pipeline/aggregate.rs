//! Frame aggregation.
//!
//! Consumes one frame's detection lists at a time and appends to two
//! append-only streams. No cross-frame state: no tracking, no smoothing, no
//! identity assignment. Each frame is folded independently of every other.

use crate::detect::Detection;

/// One normalized point observation: an integer box center at a point in
/// time. Both the player and ball streams use this shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointObservation {
    /// 1-based frame ordinal.
    pub frame: u64,
    pub x: i32,
    pub y: i32,
    pub confidence: f32,
}

impl PointObservation {
    fn from_detection(frame: u64, det: &Detection) -> Self {
        let (x, y) = det.center();
        Self {
            frame,
            x,
            y,
            confidence: det.confidence,
        }
    }
}

/// What one frame contributed to the streams.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameDelta {
    pub players_added: usize,
    pub ball_event: Option<PointObservation>,
}

/// Folds per-frame detection lists into the two owned observation streams.
pub struct FrameAggregator {
    player_class: u32,
    ball_class: u32,
    player_points: Vec<PointObservation>,
    ball_events: Vec<PointObservation>,
}

impl FrameAggregator {
    pub fn new(player_class: u32, ball_class: u32) -> Self {
        Self {
            player_class,
            ball_class,
            player_points: Vec::new(),
            ball_events: Vec::new(),
        }
    }

    /// Fold one frame's detections into the streams.
    ///
    /// Player filtering keeps every detection of the player class, with no
    /// confidence gate. Ball filtering keeps the first detection of the ball
    /// class in iteration order and discards the rest; at most one ball event
    /// exists per frame. This first-wins rule is a deliberate simplification,
    /// not a tracking decision.
    pub fn process_frame(
        &mut self,
        frame: u64,
        player_detections: &[Detection],
        ball_detections: &[Detection],
    ) -> FrameDelta {
        let mut delta = FrameDelta::default();

        for det in player_detections {
            if det.class_id != self.player_class {
                continue;
            }
            self.player_points
                .push(PointObservation::from_detection(frame, det));
            delta.players_added += 1;
        }

        if let Some(det) = ball_detections
            .iter()
            .find(|det| det.class_id == self.ball_class)
        {
            let event = PointObservation::from_detection(frame, det);
            self.ball_events.push(event);
            delta.ball_event = Some(event);
        }

        delta
    }

    pub fn player_points(&self) -> &[PointObservation] {
        &self.player_points
    }

    pub fn ball_events(&self) -> &[PointObservation] {
        &self.ball_events
    }

    /// Consume the aggregator, yielding the two streams for summarization.
    pub fn into_streams(self) -> (Vec<PointObservation>, Vec<PointObservation>) {
        (self.player_points, self.ball_events)
    }
}
