//! The frame loop.
//!
//! A strict sequential pass: OPENING -> STREAMING -> DRAINED, terminal on
//! DRAINED (a report) or on a failed open (an error, no frames processed).
//! Per-frame detector failures are absorbed as diagnostics; the run never
//! aborts because one frame failed. The source is released before
//! summarization on every exit path.

use anyhow::{Context, Result};

use crate::detect::{Detection, Detector};
use crate::ingest::{FileConfig, FileSource};
use crate::pipeline::aggregate::FrameAggregator;
use crate::pipeline::summary::{summarize, DEFAULT_SHOT_CONFIDENCE};
use crate::report::{AnalysisReport, VideoDimensions};

/// Per-run pipeline settings. Class identifiers come from each detector's own
/// label space; they are configuration, not core logic.
#[derive(Clone, Copy, Debug)]
pub struct RunSettings {
    pub player_class: u32,
    pub ball_class: u32,
    pub shot_confidence: f32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            player_class: 0,
            ball_class: 0,
            shot_confidence: DEFAULT_SHOT_CONFIDENCE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunState {
    Opening,
    Streaming,
    Drained,
}

#[derive(Clone, Copy, Debug, Default)]
struct RunDiagnostics {
    frames: u64,
    player_failures: u64,
    ball_failures: u64,
    invalid_detections: u64,
}

/// Drives one batch analysis pass over a video.
///
/// Detector instances are injected at construction; their lifecycle (load
/// once and reuse, or per-run) is the host's decision. All run state is
/// exclusively owned: concurrent runs need independent runners.
pub struct AnalysisRunner {
    player_detector: Box<dyn Detector>,
    ball_detector: Box<dyn Detector>,
    settings: RunSettings,
}

impl AnalysisRunner {
    pub fn new(
        player_detector: Box<dyn Detector>,
        ball_detector: Box<dyn Detector>,
        settings: RunSettings,
    ) -> Self {
        Self {
            player_detector,
            ball_detector,
            settings,
        }
    }

    /// Run the full pass and produce the result record.
    ///
    /// Errors only for setup failures (detector warm-up) and open failures;
    /// everything past a successful open terminates in a report.
    pub fn run(&mut self, config: FileConfig) -> Result<AnalysisReport> {
        self.run_with_progress(config, |_| {})
    }

    /// Like [`run`](Self::run), with a per-frame observer for host progress
    /// reporting. The observer sees each decoded frame's ordinal.
    pub fn run_with_progress(
        &mut self,
        config: FileConfig,
        mut on_frame: impl FnMut(u64),
    ) -> Result<AnalysisReport> {
        // Setup failures abort before any frame is processed.
        self.player_detector
            .warm_up()
            .with_context(|| format!("player detector '{}' unavailable", self.player_detector.name()))?;
        self.ball_detector
            .warm_up()
            .with_context(|| format!("ball detector '{}' unavailable", self.ball_detector.name()))?;

        let mut state = RunState::Opening;
        let mut source = FileSource::open(config)?;
        let meta = source.meta();
        transition(&mut state, RunState::Streaming);

        let mut aggregator =
            FrameAggregator::new(self.settings.player_class, self.settings.ball_class);
        let mut diag = RunDiagnostics::default();

        loop {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    // Mid-stream demux failure: drain what we have rather
                    // than discard the frames already folded.
                    log::warn!("stream ended early at frame {}: {}", diag.frames + 1, e);
                    break;
                }
            };
            diag.frames += 1;
            on_frame(frame.index);

            // The two detectors are independent: a failure in one never
            // skips the other's stream for this frame.
            let players = match self
                .player_detector
                .detect(&frame.pixels, frame.width, frame.height)
            {
                Ok(dets) => sanitize(dets, "player", frame.index, &mut diag),
                Err(e) => {
                    diag.player_failures += 1;
                    log::warn!("player detector failed on frame {}: {}", frame.index, e);
                    Vec::new()
                }
            };
            let balls = match self
                .ball_detector
                .detect(&frame.pixels, frame.width, frame.height)
            {
                Ok(dets) => sanitize(dets, "ball", frame.index, &mut diag),
                Err(e) => {
                    diag.ball_failures += 1;
                    log::warn!("ball detector failed on frame {}: {}", frame.index, e);
                    Vec::new()
                }
            };

            aggregator.process_frame(frame.index, &players, &balls);
        }

        // Release the source before summarizing.
        drop(source);
        transition(&mut state, RunState::Drained);

        let (player_points, ball_events) = aggregator.into_streams();
        log::info!(
            "run complete: {} frames, {} player points, {} ball events \
             ({} player failures, {} ball failures, {} invalid detections)",
            diag.frames,
            player_points.len(),
            ball_events.len(),
            diag.player_failures,
            diag.ball_failures,
            diag.invalid_detections
        );

        Ok(summarize(
            player_points,
            &ball_events,
            VideoDimensions {
                width: meta.width,
                height: meta.height,
            },
            self.settings.shot_confidence,
        ))
    }
}

fn transition(state: &mut RunState, next: RunState) {
    log::debug!("run state: {:?} -> {:?}", state, next);
    *state = next;
}

/// Detector-boundary validation: malformed detections are discarded as
/// diagnostics before they reach the aggregator.
fn sanitize(
    detections: Vec<Detection>,
    detector: &str,
    frame: u64,
    diag: &mut RunDiagnostics,
) -> Vec<Detection> {
    detections
        .into_iter()
        .filter(|det| match det.validate() {
            Ok(()) => true,
            Err(e) => {
                diag.invalid_detections += 1;
                log::debug!("dropping invalid {} detection on frame {}: {}", detector, frame, e);
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{FrameScript, ScriptedDetector};

    fn det(class_id: u32, x1: f32, confidence: f32) -> Detection {
        Detection {
            x1,
            y1: 0.0,
            x2: x1 + 10.0,
            y2: 10.0,
            class_id,
            confidence,
        }
    }

    fn stub_config(frames: u64) -> FileConfig {
        FileConfig {
            path: "stub://court".to_string(),
            stub_frames: frames,
        }
    }

    #[test]
    fn empty_detectors_yield_an_empty_report_not_an_error() {
        let mut runner = AnalysisRunner::new(
            Box::new(ScriptedDetector::empty("players")),
            Box::new(ScriptedDetector::empty("ball")),
            RunSettings::default(),
        );
        let report = runner.run(stub_config(5)).unwrap();
        assert_eq!(report.total_shots, 0);
        assert!(report.heatmap_data.is_empty());
        assert_eq!(report.video_dimensions.width, 320);
        assert_eq!(report.video_dimensions.height, 240);
    }

    #[test]
    fn failed_open_reports_the_path_and_processes_nothing() {
        let mut runner = AnalysisRunner::new(
            Box::new(ScriptedDetector::empty("players")),
            Box::new(ScriptedDetector::empty("ball")),
            RunSettings::default(),
        );
        let err = runner.run(FileConfig::for_path("https://not-a-file")).unwrap_err();
        assert!(err.to_string().contains("https://not-a-file"));
    }

    #[test]
    fn detector_failure_on_one_frame_skips_only_that_stream() {
        // Frame 2's player call fails; its ball call still lands.
        let player_script = vec![
            FrameScript::Detections(vec![det(0, 0.0, 0.9)]),
            FrameScript::Fail("decode error".to_string()),
            FrameScript::Detections(vec![det(0, 20.0, 0.8)]),
        ];
        let ball_script = vec![
            FrameScript::Detections(vec![]),
            FrameScript::Detections(vec![det(0, 40.0, 0.9)]),
            FrameScript::Detections(vec![]),
        ];
        let mut runner = AnalysisRunner::new(
            Box::new(ScriptedDetector::new("players", player_script)),
            Box::new(ScriptedDetector::new("ball", ball_script)),
            RunSettings::default(),
        );

        let report = runner.run(stub_config(3)).unwrap();
        assert_eq!(report.heatmap_data.len(), 2);
        assert_eq!(report.total_shots, 1);
    }

    #[test]
    fn invalid_detections_are_dropped_at_the_boundary() {
        let player_script = vec![FrameScript::Detections(vec![
            det(0, 0.0, 0.9),
            Detection {
                x1: 5.0,
                y1: 0.0,
                x2: 1.0, // inverted box
                y2: 10.0,
                class_id: 0,
                confidence: 0.9,
            },
        ])];
        let mut runner = AnalysisRunner::new(
            Box::new(ScriptedDetector::new("players", player_script)),
            Box::new(ScriptedDetector::empty("ball")),
            RunSettings::default(),
        );
        let report = runner.run(stub_config(1)).unwrap();
        assert_eq!(report.heatmap_data.len(), 1);
    }

    #[test]
    fn deterministic_detectors_make_reruns_identical() {
        let script = || {
            vec![
                FrameScript::Detections(vec![det(0, 0.0, 0.9), det(0, 30.0, 0.4)]),
                FrameScript::Detections(vec![det(0, 60.0, 0.7)]),
            ]
        };
        let ball = || vec![FrameScript::Detections(vec![det(0, 90.0, 0.8)])];

        let mut first = AnalysisRunner::new(
            Box::new(ScriptedDetector::new("players", script())),
            Box::new(ScriptedDetector::new("ball", ball())),
            RunSettings::default(),
        );
        let mut second = AnalysisRunner::new(
            Box::new(ScriptedDetector::new("players", script())),
            Box::new(ScriptedDetector::new("ball", ball())),
            RunSettings::default(),
        );

        assert_eq!(
            first.run(stub_config(2)).unwrap(),
            second.run(stub_config(2)).unwrap()
        );
    }
}
