use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::pipeline::{RunSettings, DEFAULT_SHOT_CONFIDENCE};

const DEFAULT_PLAYER_CLASS: u32 = 0;
const DEFAULT_BALL_CLASS: u32 = 0;
const DEFAULT_MODEL_INPUT_SIZE: u32 = 640;

#[derive(Debug, Deserialize, Default)]
struct AnalyzeConfigFile {
    models: Option<ModelsConfigFile>,
    classes: Option<ClassesConfigFile>,
    shot_confidence: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct ModelsConfigFile {
    player: Option<PathBuf>,
    ball: Option<PathBuf>,
    input_size: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct ClassesConfigFile {
    player: Option<u32>,
    ball: Option<u32>,
}

/// Host-side configuration for an analysis job.
///
/// Detector identity (model weights, class identifiers) is configuration,
/// not core logic: the pipeline receives constructed detector instances and
/// never reads any of this itself.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Player model weights (ONNX). Required for the tract backend.
    pub player_model: Option<PathBuf>,
    /// Ball model weights (ONNX). Required for the tract backend.
    pub ball_model: Option<PathBuf>,
    /// Square model input size in pixels.
    pub model_input_size: u32,
    /// "person" class in the player detector's label space.
    pub player_class: u32,
    /// "ball" class in the ball detector's label space.
    pub ball_class: u32,
    /// Confidence gate for the shot-count proxy.
    pub shot_confidence: f32,
}

impl AnalyzeConfig {
    /// Load from the `COURTLENS_CONFIG` file (if set), then apply env
    /// overrides, then validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("COURTLENS_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: AnalyzeConfigFile) -> Self {
        let player_model = file.models.as_ref().and_then(|m| m.player.clone());
        let ball_model = file.models.as_ref().and_then(|m| m.ball.clone());
        let model_input_size = file
            .models
            .and_then(|m| m.input_size)
            .unwrap_or(DEFAULT_MODEL_INPUT_SIZE);
        let player_class = file
            .classes
            .as_ref()
            .and_then(|c| c.player)
            .unwrap_or(DEFAULT_PLAYER_CLASS);
        let ball_class = file
            .classes
            .and_then(|c| c.ball)
            .unwrap_or(DEFAULT_BALL_CLASS);
        let shot_confidence = file.shot_confidence.unwrap_or(DEFAULT_SHOT_CONFIDENCE);
        Self {
            player_model,
            ball_model,
            model_input_size,
            player_class,
            ball_class,
            shot_confidence,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("COURTLENS_PLAYER_MODEL") {
            if !path.trim().is_empty() {
                self.player_model = Some(PathBuf::from(path));
            }
        }
        if let Ok(path) = std::env::var("COURTLENS_BALL_MODEL") {
            if !path.trim().is_empty() {
                self.ball_model = Some(PathBuf::from(path));
            }
        }
        if let Ok(value) = std::env::var("COURTLENS_PLAYER_CLASS") {
            self.player_class = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("COURTLENS_PLAYER_CLASS must be an integer class id"))?;
        }
        if let Ok(value) = std::env::var("COURTLENS_BALL_CLASS") {
            self.ball_class = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("COURTLENS_BALL_CLASS must be an integer class id"))?;
        }
        if let Ok(value) = std::env::var("COURTLENS_SHOT_CONFIDENCE") {
            self.shot_confidence = value
                .trim()
                .parse()
                .map_err(|_| anyhow!("COURTLENS_SHOT_CONFIDENCE must be a number"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.shot_confidence) {
            return Err(anyhow!(
                "shot_confidence {} out of [0, 1]",
                self.shot_confidence
            ));
        }
        if self.model_input_size == 0 {
            return Err(anyhow!("model input_size must be greater than zero"));
        }
        Ok(())
    }

    /// Pipeline settings derived from this configuration.
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            player_class: self.player_class,
            ball_class: self.ball_class,
            shot_confidence: self.shot_confidence,
        }
    }
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self::from_file(AnalyzeConfigFile::default())
    }
}

fn read_config_file(path: &Path) -> Result<AnalyzeConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
