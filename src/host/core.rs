//! Frame allocation and property propagation

use crate::frame::{VideoFrame, VideoFrameMut};
use crate::util::PixelFormat;
use crate::Config;

/// Default row alignment of newly allocated planes, in bytes
pub const DEFAULT_ALIGNMENT: usize = 32;

/// Host services available to filters while producing frames
#[derive(Debug, Clone)]
pub struct Core {
    alignment: usize,
}

impl Core {
    pub fn new(alignment: usize) -> Self {
        Core {
            alignment: alignment.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Core::new(config.frame_alignment)
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Allocate a zero-filled output frame carrying the properties of the
    /// `dominant` input frame
    pub fn new_video_frame(
        &self,
        format: PixelFormat,
        width: usize,
        height: usize,
        dominant: &VideoFrame,
    ) -> VideoFrameMut {
        VideoFrameMut::zeroed(format, width, height, self.alignment, dominant.props.clone())
    }

    /// Duplicate `src`, pixels and properties, into a writable frame
    pub fn copy_frame(&self, src: &VideoFrame) -> VideoFrameMut {
        src.to_mut()
    }
}

impl Default for Core {
    fn default() -> Self {
        Core::new(DEFAULT_ALIGNMENT)
    }
}
