//! Y4M (YUV4MPEG2) format support
//!
//! Raw planar video with a one-line text header. Used as the source and sink
//! of the command line tool.

pub mod reader;
pub mod writer;

pub use reader::{read_clip, Y4mReader};
pub use writer::Y4mWriter;

use crate::error::{Error, Result};
use crate::util::PixelFormat;

/// Map a Y4M colorspace tag to a pixel format
pub(crate) fn colorspace_to_pixel_format(colorspace: ::y4m::Colorspace) -> Result<PixelFormat> {
    use ::y4m::Colorspace;
    match colorspace {
        Colorspace::C420 | Colorspace::C420jpeg | Colorspace::C420paldv => Ok(PixelFormat::YUV420P8),
        Colorspace::C420p10 => Ok(PixelFormat::YUV420P10),
        Colorspace::C422 => Ok(PixelFormat::YUV422P8),
        Colorspace::C444 => Ok(PixelFormat::YUV444P8),
        Colorspace::C444p10 => Ok(PixelFormat::YUV444P10),
        Colorspace::Cmono => Ok(PixelFormat::Gray8),
        other => Err(Error::unsupported(format!(
            "Y4M colorspace {:?} is not supported",
            other
        ))),
    }
}

/// Map a pixel format to the Y4M colorspace tag written in the header
pub(crate) fn pixel_format_to_colorspace(format: PixelFormat) -> Result<::y4m::Colorspace> {
    use ::y4m::Colorspace;
    match format {
        PixelFormat::Gray8 => Ok(Colorspace::Cmono),
        PixelFormat::YUV420P8 => Ok(Colorspace::C420),
        PixelFormat::YUV422P8 => Ok(Colorspace::C422),
        PixelFormat::YUV444P8 => Ok(Colorspace::C444),
        PixelFormat::YUV420P10 => Ok(Colorspace::C420p10),
        PixelFormat::YUV444P10 => Ok(Colorspace::C444p10),
        other => Err(Error::unsupported(format!(
            "{} cannot be stored in Y4M",
            other
        ))),
    }
}
