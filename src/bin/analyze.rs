//! analyze - standalone analysis job for one recorded video
//!
//! Process contract: exactly one JSON object per run. Success puts the result
//! object on stdout and exits 0; any failure (including argument errors) puts
//! `{"error": ...}` on stderr and exits 1. Stage progress goes to stderr.

use anyhow::{anyhow, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;

use courtlens::ui::Ui;
use courtlens::{
    AnalysisReport, AnalysisRunner, AnalyzeConfig, Detector, ErrorReport, FileConfig,
    ScriptedDetector,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the recorded video file (or stub://NAME for a synthetic run).
    video: String,
    /// Player model weights (ONNX). Overrides config file and env.
    #[arg(long)]
    player_model: Option<PathBuf>,
    /// Ball model weights (ONNX). Overrides config file and env.
    #[arg(long)]
    ball_model: Option<PathBuf>,
    /// "person" class id in the player detector's label space.
    #[arg(long)]
    player_class: Option<u32>,
    /// "ball" class id in the ball detector's label space.
    #[arg(long)]
    ball_class: Option<u32>,
    /// Confidence gate for the shot-count proxy.
    #[arg(long)]
    shot_confidence: Option<f32>,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return;
        }
        Err(e) => {
            // Argument errors follow the same failure contract as run errors.
            let line = e.to_string().lines().next().unwrap_or("invalid arguments").to_string();
            fail(line);
        }
    };

    match run(args) {
        Ok(report) => match serde_json::to_string(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(format!("failed to serialize result: {}", e)),
        },
        Err(e) => fail(format!("{:#}", e)),
    }
}

fn run(args: Args) -> Result<AnalysisReport> {
    let mut config = AnalyzeConfig::load()?;
    if let Some(path) = args.player_model {
        config.player_model = Some(path);
    }
    if let Some(path) = args.ball_model {
        config.ball_model = Some(path);
    }
    if let Some(class) = args.player_class {
        config.player_class = class;
    }
    if let Some(class) = args.ball_class {
        config.ball_class = class;
    }
    if let Some(threshold) = args.shot_confidence {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(anyhow!("--shot-confidence {} out of [0, 1]", threshold));
        }
        config.shot_confidence = threshold;
    }

    let is_tty = std::io::stderr().is_terminal();
    let stdout_is_tty = std::io::stdout().is_terminal();
    let ui = Ui::from_args(Some(&args.ui), is_tty, !stdout_is_tty);

    let (player_detector, ball_detector) = {
        let _stage = ui.stage("Load detectors");
        build_detectors(&config, &args.video)?
    };
    let mut runner = AnalysisRunner::new(player_detector, ball_detector, config.run_settings());

    let report = {
        let _stage = ui.stage("Analyze video");
        let counter = ui.frame_counter();
        let report =
            runner.run_with_progress(FileConfig::for_path(args.video.as_str()), |frame| {
                counter.tick(frame)
            })?;
        counter.finish();
        report
    };
    Ok(report)
}

/// Detector construction is the host's concern: the pipeline only sees the
/// finished instances. `stub://` videos pair with inert detectors so the
/// wiring can be exercised without model weights.
fn build_detectors(
    config: &AnalyzeConfig,
    video: &str,
) -> Result<(Box<dyn Detector>, Box<dyn Detector>)> {
    if video.starts_with("stub://") {
        return Ok((
            Box::new(ScriptedDetector::empty("players")),
            Box::new(ScriptedDetector::empty("ball")),
        ));
    }

    #[cfg(feature = "backend-tract")]
    {
        let player_path = config.player_model.as_ref().ok_or_else(|| {
            anyhow!("player model weights required (--player-model or COURTLENS_PLAYER_MODEL)")
        })?;
        let ball_path = config.ball_model.as_ref().ok_or_else(|| {
            anyhow!("ball model weights required (--ball-model or COURTLENS_BALL_MODEL)")
        })?;
        let player = courtlens::OnnxDetector::new(player_path, config.model_input_size)?;
        let ball = courtlens::OnnxDetector::new(ball_path, config.model_input_size)?;
        Ok((Box::new(player), Box::new(ball)))
    }
    #[cfg(not(feature = "backend-tract"))]
    {
        let _ = config;
        Err(anyhow!(
            "no detector backend available: rebuild with the backend-tract feature"
        ))
    }
}

fn fail(message: String) -> ! {
    let json = serde_json::to_string(&ErrorReport::new(message))
        .unwrap_or_else(|_| r#"{"error":"analysis failed"}"#.to_string());
    eprintln!("{}", json);
    std::process::exit(1);
}
