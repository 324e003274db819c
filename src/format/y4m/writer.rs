//! Y4M output

use super::pixel_format_to_colorspace;
use crate::error::{Error, Result};
use crate::frame::VideoFrame;
use crate::host::VideoInfo;
use crate::util::PixelFormat;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;
use y4m::Encoder;

/// Writes frames of a constant-format clip as a YUV4MPEG2 stream
pub struct Y4mWriter<W: Write> {
    encoder: Encoder<W>,
    format: PixelFormat,
    width: usize,
    height: usize,
    frames_written: usize,
}

impl Y4mWriter<BufWriter<File>> {
    /// Create (or truncate) a Y4M file and write its header
    pub fn create(path: &Path, info: &VideoInfo) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), info)
    }
}

impl<W: Write> Y4mWriter<W> {
    /// Write the stream header for `info` to `writer`
    pub fn new(writer: W, info: &VideoInfo) -> Result<Self> {
        let format = match info.format {
            Some(format) if info.is_constant_format() => format,
            _ => {
                return Err(Error::unsupported(
                    "Y4M output requires a constant format clip",
                ))
            }
        };
        let colorspace = pixel_format_to_colorspace(format)?;
        if info.fps.num <= 0 || info.fps.den <= 0 {
            return Err(Error::invalid_input(format!(
                "Y4M output requires a known frame rate, got {}",
                info.fps
            )));
        }

        let encoder = y4m::encode(
            info.width,
            info.height,
            y4m::Ratio::new(info.fps.num as usize, info.fps.den as usize),
        )
        .with_colorspace(colorspace)
        .write_header(writer)
        .map_err(|e| Error::format(format!("Failed to write Y4M header: {}", e)))?;
        debug!(%format, width = info.width, height = info.height, "started Y4M stream");

        Ok(Y4mWriter {
            encoder,
            format,
            width: info.width,
            height: info.height,
            frames_written: 0,
        })
    }

    /// Append one frame. Row padding of the frame's planes is not written.
    pub fn write_frame(&mut self, frame: &VideoFrame) -> Result<()> {
        if frame.format() != self.format
            || frame.width() != self.width
            || frame.height() != self.height
        {
            return Err(Error::invalid_input(format!(
                "Frame is {} {}x{}, stream is {} {}x{}",
                frame.format(),
                frame.width(),
                frame.height(),
                self.format,
                self.width,
                self.height
            )));
        }

        let mut planes: [Vec<u8>; 3] = Default::default();
        for (index, packed) in planes.iter_mut().enumerate().take(frame.num_planes()) {
            let view = frame.plane(index);
            packed.reserve(view.height() * view.width() * self.format.bytes_per_sample());
            for row in view.rows() {
                packed.extend_from_slice(row);
            }
        }

        let [y, u, v] = &planes;
        self.encoder
            .write_frame(&y4m::Frame::new([y.as_slice(), u.as_slice(), v.as_slice()], None))
            .map_err(|e| {
                Error::format(format!(
                    "Failed to write frame {}: {}",
                    self.frames_written, e
                ))
            })?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }
}
