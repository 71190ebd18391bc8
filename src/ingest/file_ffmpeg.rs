//! FFmpeg-backed local file decoder.
//!
//! Frames are decoded in-memory and scaled to RGB24 at the container's native
//! size. A corrupt packet mid-stream is skipped with a diagnostic; only the
//! open path is fatal.

use anyhow::{Context, Result};
use ffmpeg_next as ffmpeg;

use super::file::{VideoFrame, VideoMeta};

pub(crate) struct FfmpegFileSource {
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    meta: VideoMeta,
    frame_count: u64,
    flushed: bool,
}

impl FfmpegFileSource {
    pub(crate) fn open(path: &str) -> Result<Self> {
        ffmpeg::init().context("initialize ffmpeg")?;
        let input = ffmpeg::format::input(&path)
            .with_context(|| format!("could not open video '{}'", path))?;
        let input_stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| anyhow::anyhow!("could not open video '{}': no video track", path))?;
        let stream_index = input_stream.index();

        let rate = input_stream.avg_frame_rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let context = ffmpeg::codec::context::Context::from_parameters(input_stream.parameters())
            .context("load video decoder parameters")?;
        let decoder = context
            .decoder()
            .video()
            .context("open ffmpeg video decoder")?;

        let scaler = ffmpeg::software::scaling::context::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::util::format::pixel::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::flag::Flags::BILINEAR,
        )
        .context("create ffmpeg scaler")?;

        let meta = VideoMeta {
            width: decoder.width(),
            height: decoder.height(),
            fps,
        };
        log::info!(
            "FileSource: opened {} ({}x{} @ {:.2} fps)",
            path,
            meta.width,
            meta.height,
            meta.fps
        );

        Ok(Self {
            input,
            stream_index,
            decoder,
            scaler,
            meta,
            frame_count: 0,
            flushed: false,
        })
    }

    pub(crate) fn meta(&self) -> VideoMeta {
        self.meta
    }

    pub(crate) fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        let mut decoded = ffmpeg::frame::Video::empty();

        if !self.flushed {
            let mut received = false;
            for (stream, packet) in self.input.packets() {
                if stream.index() != self.stream_index {
                    continue;
                }

                // A corrupt packet skips one frame's contribution, not the run.
                if let Err(e) = self.decoder.send_packet(&packet) {
                    log::warn!("skipping undecodable packet: {}", e);
                    continue;
                }

                if self.decoder.receive_frame(&mut decoded).is_ok() {
                    received = true;
                    break;
                }
            }
            if received {
                return self.emit(&decoded).map(Some);
            }

            // Demuxer exhausted: flush buffered frames out of the decoder.
            self.flushed = true;
            self.decoder
                .send_eof()
                .context("flush ffmpeg video decoder")?;
        }

        if self.decoder.receive_frame(&mut decoded).is_ok() {
            return self.emit(&decoded).map(Some);
        }
        Ok(None)
    }

    fn emit(&mut self, decoded: &ffmpeg::frame::Video) -> Result<VideoFrame> {
        let mut rgb_frame = ffmpeg::frame::Video::empty();
        self.scaler
            .run(decoded, &mut rgb_frame)
            .context("scale frame to RGB")?;
        let (pixels, width, height) = frame_to_pixels(&rgb_frame)?;

        self.frame_count += 1;
        Ok(VideoFrame {
            index: self.frame_count,
            pixels,
            width,
            height,
        })
    }
}

fn frame_to_pixels(frame: &ffmpeg::frame::Video) -> Result<(Vec<u8>, u32, u32)> {
    let width = frame.width();
    let height = frame.height();
    let row_bytes = (width as usize) * 3;
    let stride = frame.stride(0);
    let data = frame.data(0);

    if stride == row_bytes {
        return Ok((data.to_vec(), width, height));
    }

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        let end = start + row_bytes;
        pixels.extend_from_slice(
            data.get(start..end)
                .context("ffmpeg frame row is out of bounds")?,
        );
    }

    Ok((pixels, width, height))
}
