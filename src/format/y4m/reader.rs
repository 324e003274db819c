//! Y4M input

use super::colorspace_to_pixel_format;
use crate::error::{Error, Result};
use crate::frame::{FrameProps, VideoFrame};
use crate::host::Clip;
use crate::util::{PixelFormat, Rational, Timestamp};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;
use y4m::Decoder;

/// Sequential reader of YUV4MPEG2 frames
pub struct Y4mReader<R: Read> {
    decoder: Decoder<R>,
    format: PixelFormat,
    width: usize,
    height: usize,
    fps: Rational,
    frame_number: usize,
}

impl Y4mReader<BufReader<File>> {
    /// Open a Y4M file and parse its header
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read> Y4mReader<R> {
    /// Parse the stream header from `reader`
    pub fn new(reader: R) -> Result<Self> {
        let decoder = y4m::decode(reader)
            .map_err(|e| Error::format(format!("Failed to decode Y4M header: {}", e)))?;

        let format = colorspace_to_pixel_format(decoder.get_colorspace())?;
        let framerate = decoder.get_framerate();
        let fps = Rational::new(framerate.num as i64, framerate.den as i64);
        let (width, height) = (decoder.get_width(), decoder.get_height());
        debug!(%format, width, height, %fps, "opened Y4M stream");

        Ok(Y4mReader {
            decoder,
            format,
            width,
            height,
            fps,
            frame_number: 0,
        })
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn fps(&self) -> Rational {
        self.fps
    }

    /// Read the next frame, `None` at end of stream
    ///
    /// Frames are numbered from zero in `pts`, with a duration of one frame
    /// period.
    pub fn read_frame(&mut self) -> Result<Option<VideoFrame>> {
        let data = match self.decoder.read_frame() {
            Ok(frame) => [frame.get_y_plane(), frame.get_u_plane(), frame.get_v_plane()]
                .iter()
                .take(self.format.num_planes())
                .map(|plane| plane.to_vec())
                .collect::<Vec<_>>(),
            Err(y4m::Error::EOF) => return Ok(None),
            Err(e) => {
                return Err(Error::format(format!(
                    "Failed to read frame {}: {}",
                    self.frame_number, e
                )))
            }
        };

        let mut frame = VideoFrame::from_packed(self.format, self.width, self.height, data)?;
        frame.props = FrameProps {
            pts: Timestamp::new(self.frame_number as i64),
            duration: self.fps.invert(),
            ..FrameProps::default()
        };
        self.frame_number += 1;
        Ok(Some(frame))
    }
}

impl<R: Read> Iterator for Y4mReader<R> {
    type Item = Result<VideoFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}

/// Load a whole Y4M file into an in-memory clip
pub fn read_clip(path: impl AsRef<Path>) -> Result<Clip> {
    let path = path.as_ref();
    let reader = Y4mReader::open(path)?;
    let fps = reader.fps();
    let frames = reader.collect::<Result<Vec<_>>>()?;
    debug!(path = %path.display(), frames = frames.len(), "loaded clip");
    Clip::from_frames(frames, fps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stream(header: &str, frames: &[&[u8]]) -> Vec<u8> {
        let mut data = header.as_bytes().to_vec();
        for frame in frames {
            data.extend_from_slice(b"FRAME\n");
            data.extend_from_slice(frame);
        }
        data
    }

    #[test]
    fn test_read_444_frames() {
        let body: Vec<u8> = (0..12).collect();
        let data = stream("YUV4MPEG2 W4 H1 F30:1 C444\n", &[&body[..], &body[..]]);

        let mut reader = Y4mReader::new(Cursor::new(data)).unwrap();
        assert_eq!(reader.format(), PixelFormat::YUV444P8);
        assert_eq!(reader.fps(), Rational::new(30, 1));

        let first = reader.read_frame().unwrap().unwrap();
        assert_eq!(first.plane(2).row(0), &[8, 9, 10, 11]);
        assert_eq!(first.props.pts, Timestamp::new(0));
        assert_eq!(first.props.duration, Rational::new(1, 30));

        let second = reader.read_frame().unwrap().unwrap();
        assert_eq!(second.props.pts, Timestamp::new(1));
        assert!(reader.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_mono_has_one_plane() {
        let data = stream("YUV4MPEG2 W2 H2 F25:1 Cmono\n", &[&[1, 2, 3, 4]]);
        let frame = Y4mReader::new(Cursor::new(data))
            .unwrap()
            .read_frame()
            .unwrap()
            .unwrap();
        assert_eq!(frame.num_planes(), 1);
        assert_eq!(frame.plane(0).row(1), &[3, 4]);
    }

    #[test]
    fn test_bad_header() {
        assert!(Y4mReader::new(Cursor::new(b"NOT A Y4M FILE\n".to_vec())).is_err());
    }
}
