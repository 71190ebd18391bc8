//! End-to-end pipeline properties, driven through the public API with the
//! synthetic source and scripted detectors.

use courtlens::{
    AnalysisRunner, Detection, FileConfig, FrameScript, RunSettings, ScriptedDetector,
};

fn person(x1: f32, confidence: f32) -> Detection {
    Detection {
        x1,
        y1: 50.0,
        x2: x1 + 30.0,
        y2: 150.0,
        class_id: 0,
        confidence,
    }
}

fn ball(x1: f32, confidence: f32) -> Detection {
    Detection {
        x1,
        y1: 20.0,
        x2: x1 + 8.0,
        y2: 28.0,
        class_id: 0,
        confidence,
    }
}

fn stub_config(frames: u64) -> FileConfig {
    FileConfig {
        path: "stub://match".to_string(),
        stub_frames: frames,
    }
}

fn runner(
    player_script: Vec<FrameScript>,
    ball_script: Vec<FrameScript>,
) -> AnalysisRunner {
    AnalysisRunner::new(
        Box::new(ScriptedDetector::new("players", player_script)),
        Box::new(ScriptedDetector::new("ball", ball_script)),
        RunSettings::default(),
    )
}

#[test]
fn three_frame_scenario_matches_expected_report() {
    // Frame 1: two persons. Frame 2: one person and one confident ball.
    // Frame 3: nothing.
    let player_script = vec![
        FrameScript::Detections(vec![person(10.0, 0.9), person(200.0, 0.8)]),
        FrameScript::Detections(vec![person(60.0, 0.7)]),
        FrameScript::Detections(vec![]),
    ];
    let ball_script = vec![
        FrameScript::Detections(vec![]),
        FrameScript::Detections(vec![ball(100.0, 0.9)]),
        FrameScript::Detections(vec![]),
    ];

    let report = runner(player_script, ball_script).run(stub_config(3)).unwrap();

    assert_eq!(report.total_shots, 1);
    assert_eq!(report.heatmap_data.len(), 3);
    assert_eq!(report.video_dimensions.width, 320);
    assert_eq!(report.video_dimensions.height, 240);
}

#[test]
fn zero_detections_never_error() {
    let report = AnalysisRunner::new(
        Box::new(ScriptedDetector::empty("players")),
        Box::new(ScriptedDetector::empty("ball")),
        RunSettings::default(),
    )
    .run(stub_config(10))
    .unwrap();

    assert_eq!(report.total_shots, 0);
    assert!(report.heatmap_data.is_empty());
}

#[test]
fn heatmap_length_equals_total_qualifying_player_detections() {
    // 2 + 0 + 3 qualifying detections, one off-class detection ignored.
    let player_script = vec![
        FrameScript::Detections(vec![person(0.0, 0.9), person(40.0, 0.2)]),
        FrameScript::Detections(vec![Detection {
            class_id: 7,
            ..person(80.0, 0.9)
        }]),
        FrameScript::Detections(vec![
            person(120.0, 0.5),
            person(160.0, 0.6),
            person(200.0, 0.7),
        ]),
    ];
    let report = runner(player_script, vec![]).run(stub_config(3)).unwrap();
    assert_eq!(report.heatmap_data.len(), 5);
}

#[test]
fn mid_stream_detector_failure_skips_one_frame_only() {
    // 100-frame video; the player detector fails on frame 50. The other 99
    // frames still contribute, and the ball stream is unaffected.
    let player_script: Vec<FrameScript> = (1..=100)
        .map(|i| {
            if i == 50 {
                FrameScript::Fail("forced failure".to_string())
            } else {
                FrameScript::Detections(vec![person(i as f32, 0.8)])
            }
        })
        .collect();
    let ball_script: Vec<FrameScript> = (1..=100)
        .map(|i| {
            if i == 50 {
                FrameScript::Detections(vec![ball(10.0, 0.9)])
            } else {
                FrameScript::Detections(vec![])
            }
        })
        .collect();

    let report = runner(player_script, ball_script).run(stub_config(100)).unwrap();
    assert_eq!(report.heatmap_data.len(), 99);
    assert_eq!(report.total_shots, 1);
}

#[test]
fn first_ball_per_frame_wins_and_threshold_is_strict() {
    // Frame 1: first ball is low-confidence, second is high; the first wins,
    // so the frame does not count as a shot. Frame 2: exactly at the gate,
    // still no shot. Frame 3: above the gate.
    let ball_script = vec![
        FrameScript::Detections(vec![ball(10.0, 0.3), ball(100.0, 0.99)]),
        FrameScript::Detections(vec![ball(20.0, 0.5)]),
        FrameScript::Detections(vec![ball(30.0, 0.51)]),
    ];
    let report = runner(vec![], ball_script).run(stub_config(3)).unwrap();
    assert_eq!(report.total_shots, 1);
}

#[test]
fn shot_count_is_monotone_as_threshold_decreases() {
    let ball_script = || {
        vec![
            FrameScript::Detections(vec![ball(0.0, 0.2)]),
            FrameScript::Detections(vec![ball(0.0, 0.55)]),
            FrameScript::Detections(vec![ball(0.0, 0.95)]),
        ]
    };

    let mut previous = 0;
    for threshold in [0.9, 0.5, 0.1] {
        let report = AnalysisRunner::new(
            Box::new(ScriptedDetector::empty("players")),
            Box::new(ScriptedDetector::new("ball", ball_script())),
            RunSettings {
                shot_confidence: threshold,
                ..RunSettings::default()
            },
        )
        .run(stub_config(3))
        .unwrap();

        assert!(report.total_shots >= previous);
        assert!(report.total_shots <= 3);
        previous = report.total_shots;
    }
    assert_eq!(previous, 3);
}

#[test]
fn rerun_with_same_script_is_identical() {
    let player_script = || {
        vec![
            FrameScript::Detections(vec![person(12.0, 0.81), person(90.0, 0.44)]),
            FrameScript::Detections(vec![person(33.0, 0.77)]),
        ]
    };
    let ball_script = || vec![FrameScript::Detections(vec![ball(50.0, 0.66)])];

    let first = runner(player_script(), ball_script()).run(stub_config(2)).unwrap();
    let second = runner(player_script(), ball_script()).run(stub_config(2)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn open_failure_carries_the_attempted_path() {
    let err = AnalysisRunner::new(
        Box::new(ScriptedDetector::empty("players")),
        Box::new(ScriptedDetector::empty("ball")),
        RunSettings::default(),
    )
    .run(FileConfig::for_path("http://remote/video.mp4"))
    .unwrap_err();

    assert!(err.to_string().contains("http://remote/video.mp4"));
}
