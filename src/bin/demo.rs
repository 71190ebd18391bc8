//! demo - end-to-end synthetic run of the analysis pipeline
//!
//! Exercises the whole wiring (synthetic source, scripted detectors, frame
//! loop, summarizer) with no model weights or video assets. Useful as a
//! smoke test and as a sample of the result JSON.

use anyhow::{anyhow, Result};
use clap::Parser;

use courtlens::{
    AnalysisRunner, Detection, FileConfig, FrameScript, RunSettings, ScriptedDetector,
    DEFAULT_SHOT_CONFIDENCE,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Frame count for the synthetic video.
    #[arg(long, default_value_t = 90)]
    frames: u64,
    /// Confidence gate for the shot-count proxy.
    #[arg(long, default_value_t = DEFAULT_SHOT_CONFIDENCE)]
    shot_confidence: f32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.frames == 0 {
        return Err(anyhow!("frames must be >= 1"));
    }

    stage("build scripted detectors");
    let player_detector = ScriptedDetector::new("players", player_script(args.frames));
    let ball_detector = ScriptedDetector::new("ball", ball_script(args.frames));

    stage("run pipeline");
    let mut runner = AnalysisRunner::new(
        Box::new(player_detector),
        Box::new(ball_detector),
        RunSettings {
            shot_confidence: args.shot_confidence,
            ..RunSettings::default()
        },
    );
    let report = runner.run(FileConfig {
        path: "stub://demo".to_string(),
        stub_frames: args.frames,
    })?;

    println!("demo summary:");
    println!("  frames processed: {}", args.frames);
    println!("  heatmap points: {}", report.heatmap_data.len());
    println!("  total shots: {}", report.total_shots);
    println!(
        "  video dimensions: {}x{}",
        report.video_dimensions.width, report.video_dimensions.height
    );
    println!("result json:");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn stage(msg: &str) {
    eprintln!("demo: {}", msg);
}

/// One player sweeping across the court, a second joining every third frame.
fn player_script(frames: u64) -> Vec<FrameScript> {
    (1..=frames)
        .map(|i| {
            let x = (i * 7 % 280) as f32;
            let mut dets = vec![Detection {
                x1: x,
                y1: 60.0,
                x2: x + 24.0,
                y2: 150.0,
                class_id: 0,
                confidence: 0.88,
            }];
            if i % 3 == 0 {
                dets.push(Detection {
                    x1: 280.0 - x,
                    y1: 90.0,
                    x2: 304.0 - x,
                    y2: 180.0,
                    class_id: 0,
                    confidence: 0.67,
                });
            }
            FrameScript::Detections(dets)
        })
        .collect()
}

/// A ball sighting every tenth frame; every other sighting is low-confidence
/// so the shot proxy gate is visible in the summary.
fn ball_script(frames: u64) -> Vec<FrameScript> {
    (1..=frames)
        .map(|i| {
            if i % 10 != 0 {
                return FrameScript::Detections(Vec::new());
            }
            let confidence = if i % 20 == 0 { 0.35 } else { 0.9 };
            FrameScript::Detections(vec![Detection {
                x1: (i % 300) as f32,
                y1: 40.0,
                x2: (i % 300) as f32 + 8.0,
                y2: 48.0,
                class_id: 0,
                confidence,
            }])
        })
        .collect()
}
