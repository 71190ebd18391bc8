//! Local file frame source.
//!
//! `FileSource` opens a local video file and yields its frames in decode
//! order. It is responsible for:
//! - Decoding frames to RGB24 in-memory
//! - Reporting width, height and frame rate at open time
//! - Assigning 1-based, gap-free frame indices
//! - Signalling end-of-stream as `Ok(None)`
//!
//! `stub://` paths select a deterministic synthetic backend used by tests and
//! the demo binary; everything else requires the `ingest-file-ffmpeg` feature.

use anyhow::{anyhow, Result};

#[cfg(feature = "ingest-file-ffmpeg")]
use super::file_ffmpeg::FfmpegFileSource;

/// Source dimensions and frame rate, reported at open time.
///
/// These are the container's values, not derived from any detection; the
/// result record passes them through unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoMeta {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// One decoded frame. Owned transiently by the frame loop and dropped after
/// both detectors have seen it.
#[derive(Clone, Debug)]
pub struct VideoFrame {
    /// 1-based ordinal, monotonically increasing, no gaps.
    pub index: u64,
    /// RGB24 pixel data, row-major, no padding.
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Configuration for a local file source.
#[derive(Clone, Debug)]
pub struct FileConfig {
    /// Local file path, or a `stub://` name for the synthetic backend.
    pub path: String,
    /// Frame count produced by `stub://` sources. Ignored for real files.
    pub stub_frames: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            stub_frames: 90,
        }
    }
}

impl FileConfig {
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

/// Local file frame source.
#[derive(Debug)]
pub struct FileSource {
    backend: FileBackend,
    meta: VideoMeta,
}

#[derive(Debug)]
enum FileBackend {
    Synthetic(SyntheticFileSource),
    #[cfg(feature = "ingest-file-ffmpeg")]
    Ffmpeg(FfmpegFileSource),
}

impl FileSource {
    /// Open the source. A failure here is fatal for the run: no frames have
    /// been processed and none will be.
    pub fn open(config: FileConfig) -> Result<Self> {
        if !is_local_file_path(&config.path) {
            return Err(anyhow!(
                "could not open video '{}': only local paths are supported (no URL schemes)",
                config.path
            ));
        }
        if config.path.starts_with("stub://") {
            let source = SyntheticFileSource::new(config);
            let meta = source.meta();
            return Ok(Self {
                backend: FileBackend::Synthetic(source),
                meta,
            });
        }

        #[cfg(feature = "ingest-file-ffmpeg")]
        {
            let source = FfmpegFileSource::open(&config.path)?;
            let meta = source.meta();
            Ok(Self {
                backend: FileBackend::Ffmpeg(source),
                meta,
            })
        }
        #[cfg(not(feature = "ingest-file-ffmpeg"))]
        {
            Err(anyhow!(
                "could not open video '{}': file ingestion requires the ingest-file-ffmpeg feature",
                config.path
            ))
        }
    }

    /// Dimensions and frame rate reported by the container.
    pub fn meta(&self) -> VideoMeta {
        self.meta
    }

    /// Decode the next frame. `Ok(None)` is end-of-stream.
    pub fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        match &mut self.backend {
            FileBackend::Synthetic(source) => source.next_frame(),
            #[cfg(feature = "ingest-file-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.next_frame(),
        }
    }
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for tests and the demo
// ----------------------------------------------------------------------------

const SYNTHETIC_WIDTH: u32 = 320;
const SYNTHETIC_HEIGHT: u32 = 240;
const SYNTHETIC_FPS: f64 = 30.0;

#[derive(Debug)]
struct SyntheticFileSource {
    config: FileConfig,
    frame_count: u64,
}

impl SyntheticFileSource {
    fn new(config: FileConfig) -> Self {
        log::info!("FileSource: opened {} (synthetic)", config.path);
        Self {
            config,
            frame_count: 0,
        }
    }

    fn meta(&self) -> VideoMeta {
        VideoMeta {
            width: SYNTHETIC_WIDTH,
            height: SYNTHETIC_HEIGHT,
            fps: SYNTHETIC_FPS,
        }
    }

    fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        if self.frame_count >= self.config.stub_frames {
            return Ok(None);
        }
        self.frame_count += 1;

        Ok(Some(VideoFrame {
            index: self.frame_count,
            pixels: self.generate_synthetic_pixels(),
            width: SYNTHETIC_WIDTH,
            height: SYNTHETIC_HEIGHT,
        }))
    }

    fn generate_synthetic_pixels(&self) -> Vec<u8> {
        let pixel_count = (SYNTHETIC_WIDTH * SYNTHETIC_HEIGHT * 3) as usize;
        let mut pixels = vec![0u8; pixel_count];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + self.frame_count) % 256) as u8;
        }
        pixels
    }
}

fn is_local_file_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    if path.starts_with("stub://") {
        return true;
    }
    !path.contains("://")
}
