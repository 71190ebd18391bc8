//! The per-frame detection-aggregation pipeline.
//!
//! This is the only part of the crate with non-trivial policy:
//! - `aggregate`: folds each frame's detection lists into the two owned
//!   observation streams (player points, ball events)
//! - `summary`: reduces the streams into the final result record
//! - `runner`: the sequential frame loop driving source and detectors
//!
//! All pipeline state is exclusively owned by one run. Concurrent runs must
//! use independent instances; nothing here is shared or global.

mod aggregate;
mod runner;
mod summary;

pub use aggregate::{FrameAggregator, FrameDelta, PointObservation};
pub use runner::{AnalysisRunner, RunSettings};
pub use summary::{summarize, DEFAULT_SHOT_CONFIDENCE};
