//! Pixel format definitions

use std::fmt;

/// Colour family of a planar format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFamily {
    Gray,
    Rgb,
    Yuv,
}

/// How samples are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    Integer,
    Float,
}

/// Planar pixel formats a clip may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit grayscale
    Gray8,
    /// 16-bit grayscale
    Gray16,
    /// Planar YUV 4:2:0, 8 bits
    YUV420P8,
    /// Planar YUV 4:2:2, 8 bits
    YUV422P8,
    /// Planar YUV 4:4:4, 8 bits
    YUV444P8,
    /// Planar YUV 4:2:0, 10 bits in 16-bit words
    YUV420P10,
    /// Planar YUV 4:4:4, 10 bits in 16-bit words
    YUV444P10,
    /// Planar YUV 4:4:4, 16 bits
    YUV444P16,
    /// Planar YUV 4:4:4, 32-bit float
    YUV444PS,
    /// Planar RGB, 8 bits
    RGB24,
}

impl PixelFormat {
    pub fn color_family(&self) -> ColorFamily {
        match self {
            PixelFormat::Gray8 | PixelFormat::Gray16 => ColorFamily::Gray,
            PixelFormat::RGB24 => ColorFamily::Rgb,
            _ => ColorFamily::Yuv,
        }
    }

    pub fn sample_type(&self) -> SampleType {
        match self {
            PixelFormat::YUV444PS => SampleType::Float,
            _ => SampleType::Integer,
        }
    }

    /// Significant bits per sample
    pub fn bits_per_sample(&self) -> u8 {
        match self {
            PixelFormat::Gray8
            | PixelFormat::YUV420P8
            | PixelFormat::YUV422P8
            | PixelFormat::YUV444P8
            | PixelFormat::RGB24 => 8,
            PixelFormat::YUV420P10 | PixelFormat::YUV444P10 => 10,
            PixelFormat::Gray16 | PixelFormat::YUV444P16 => 16,
            PixelFormat::YUV444PS => 32,
        }
    }

    /// Storage size of one sample
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample() as usize + 7) / 8
    }

    /// Horizontal chroma subsampling as a log2 shift
    pub fn sub_sampling_w(&self) -> u8 {
        match self {
            PixelFormat::YUV420P8 | PixelFormat::YUV422P8 | PixelFormat::YUV420P10 => 1,
            _ => 0,
        }
    }

    /// Vertical chroma subsampling as a log2 shift
    pub fn sub_sampling_h(&self) -> u8 {
        match self {
            PixelFormat::YUV420P8 | PixelFormat::YUV420P10 => 1,
            _ => 0,
        }
    }

    pub fn num_planes(&self) -> usize {
        match self.color_family() {
            ColorFamily::Gray => 1,
            ColorFamily::Rgb | ColorFamily::Yuv => 3,
        }
    }

    /// Width of `plane` for a frame `width` pixels wide. Subsampled planes
    /// round up, so odd widths keep their last chroma column.
    pub fn plane_width(&self, plane: usize, width: usize) -> usize {
        if plane == 0 {
            width
        } else {
            subsampled(width, self.sub_sampling_w())
        }
    }

    /// Height of `plane` for a frame `height` pixels tall, rounded up like
    /// [`plane_width`](Self::plane_width)
    pub fn plane_height(&self, plane: usize, height: usize) -> usize {
        if plane == 0 {
            height
        } else {
            subsampled(height, self.sub_sampling_h())
        }
    }

    /// Whether every plane has the frame's full resolution
    pub fn is_full_resolution(&self) -> bool {
        self.sub_sampling_w() == 0 && self.sub_sampling_h() == 0
    }
}

fn subsampled(size: usize, shift: u8) -> usize {
    (size + (1 << shift) - 1) >> shift
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Gray8 => "Gray8",
            PixelFormat::Gray16 => "Gray16",
            PixelFormat::YUV420P8 => "YUV420P8",
            PixelFormat::YUV422P8 => "YUV422P8",
            PixelFormat::YUV444P8 => "YUV444P8",
            PixelFormat::YUV420P10 => "YUV420P10",
            PixelFormat::YUV444P10 => "YUV444P10",
            PixelFormat::YUV444P16 => "YUV444P16",
            PixelFormat::YUV444PS => "YUV444PS",
            PixelFormat::RGB24 => "RGB24",
        };
        write!(f, "{}", name)
    }
}
