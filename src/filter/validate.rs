//! Construction-time checks on the upstream clip

use crate::error::{Error, Result};
use crate::host::VideoInfo;
use crate::util::{ColorFamily, PixelFormat, SampleType};

/// Preconditions a filter places on its input clip
#[derive(Debug, Clone, Copy)]
pub struct FormatRequirements {
    filter: &'static str,
    yuv444: bool,
    mod4: bool,
}

impl FormatRequirements {
    /// Constant format, integer samples, 8 bits per sample
    pub fn new(filter: &'static str) -> Self {
        FormatRequirements {
            filter,
            yuv444: false,
            mod4: false,
        }
    }

    /// Also require three full-resolution YUV planes
    pub fn yuv444(mut self) -> Self {
        self.yuv444 = true;
        self
    }

    /// Also require width and height to be multiples of 4
    pub fn mod4(mut self) -> Self {
        self.mod4 = true;
        self
    }

    /// Check `info`, returning its format on success
    pub fn check(&self, info: &VideoInfo) -> Result<PixelFormat> {
        let format = match info.format {
            Some(format) if info.is_constant_format() => format,
            _ => return Err(self.fail("only constant format input supported")),
        };

        if format.sample_type() != SampleType::Integer {
            return Err(self.fail("only integer sample input supported"));
        }

        if format.bits_per_sample() != 8 {
            return Err(self.fail(&format!(
                "only 8-bit input supported, got {}-bit",
                format.bits_per_sample()
            )));
        }

        if self.yuv444
            && (format.color_family() != ColorFamily::Yuv
                || format.num_planes() != 3
                || !format.is_full_resolution())
        {
            return Err(self.fail(&format!("YUV444P8 input is required, got {}", format)));
        }

        if self.mod4 && (info.width % 4 != 0 || info.height % 4 != 0) {
            return Err(self.fail(&format!(
                "mod4 input is required, got {}x{}",
                info.width, info.height
            )));
        }

        Ok(format)
    }

    fn fail(&self, reason: &str) -> Error {
        Error::unsupported(format!("{}: {}", self.filter, reason))
    }
}
