//! Frame ingestion.
//!
//! This module decodes a recorded video file into an ordered stream of RGB24
//! frames for the analysis pipeline:
//! - Local video files (feature: ingest-file-ffmpeg)
//! - Synthetic `stub://` source (tests and the demo binary)
//!
//! The source reports its dimensions and frame rate at open time and signals
//! end-of-stream explicitly. Frame indices are 1-based and gap-free while the
//! stream is healthy; frames are owned transiently by the frame loop and
//! dropped after detection.
//!
//! Ingestion is strictly batch: one sequential pass, no decimation, no
//! liveness requirements. Open failure is the only fatal outcome.

pub mod file;
#[cfg(feature = "ingest-file-ffmpeg")]
pub(crate) mod file_ffmpeg;

pub use file::{FileConfig, FileSource, VideoFrame, VideoMeta};
