//! courtlens
//!
//! Batch analysis of recorded court video: one sequential pass over the
//! frames of a video file, two injected object detectors (a generic player
//! detector and a domain-specific ball detector), and a single JSON result
//! record with player heatmap points and a coarse shot-count proxy.
//!
//! # Architecture
//!
//! - `ingest`: decodes a video file into ordered RGB24 frames with reported
//!   dimensions and frame rate
//! - `detect`: the detector capability boundary, an opaque `Detector` trait
//!   producing validated `Detection` records
//! - `pipeline`: the core: per-frame aggregation into two owned observation
//!   streams, terminal summarization, and the frame-loop driver
//! - `report`: the wire shapes handed to the job orchestrator
//! - `config`, `ui`: host-side configuration and stderr progress for the
//!   binaries
//!
//! The pipeline is single-threaded, synchronous and batch: no parallelism
//! across frames, no cancellation mid-run, no state shared between runs. The
//! only fatal outcomes are detector setup failures and a video that cannot be
//! opened; a single frame's detector failure is absorbed and logged, never
//! surfaced to the caller.

pub mod config;
pub mod detect;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod ui;

pub use config::AnalyzeConfig;
#[cfg(feature = "backend-tract")]
pub use detect::OnnxDetector;
pub use detect::{Detection, Detector, FrameScript, ScriptedDetector};
pub use ingest::{FileConfig, FileSource, VideoFrame, VideoMeta};
pub use pipeline::{
    summarize, AnalysisRunner, FrameAggregator, FrameDelta, PointObservation, RunSettings,
    DEFAULT_SHOT_CONFIDENCE,
};
pub use report::{AnalysisReport, ErrorReport, HeatmapPoint, VideoDimensions};
