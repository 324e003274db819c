//! Video frames as seen by filters
//!
//! A [`VideoFrame`] is immutable once built and shared between the host and
//! filters behind an `Arc`. Filters write into a [`VideoFrameMut`] obtained
//! from the [`Core`](crate::host::Core) and freeze it into their output.

pub mod handle;
pub mod plane;
pub mod props;

pub use handle::{FrameRef, HandleLedger, LedgerSnapshot};
pub use plane::{aligned_stride, Plane, PlaneMut, PlaneView, PlaneViewMut};
pub use props::{FieldOrder, FrameProps, PictureType, PropValue};

use crate::error::{Error, Result};
use crate::util::{Buffer, PixelFormat};

fn check_planes<'a>(
    format: PixelFormat,
    width: usize,
    height: usize,
    dims: impl ExactSizeIterator<Item = (usize, usize)>,
) -> Result<()> {
    if dims.len() != format.num_planes() {
        return Err(Error::invalid_input(format!(
            "{} frame needs {} planes, got {}",
            format,
            format.num_planes(),
            dims.len()
        )));
    }
    for (i, (w, h)) in dims.enumerate() {
        let (ew, eh) = (format.plane_width(i, width), format.plane_height(i, height));
        if (w, h) != (ew, eh) {
            return Err(Error::invalid_input(format!(
                "Plane {} is {}x{}, expected {}x{}",
                i, w, h, ew, eh
            )));
        }
    }
    Ok(())
}

/// A finished video frame
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    format: PixelFormat,
    width: usize,
    height: usize,
    planes: Vec<Plane>,
    /// Frame properties
    pub props: FrameProps,
}

impl VideoFrame {
    /// Assemble a frame from existing planes
    pub fn from_planes(
        format: PixelFormat,
        width: usize,
        height: usize,
        planes: Vec<Plane>,
        props: FrameProps,
    ) -> Result<Self> {
        check_planes(
            format,
            width,
            height,
            planes.iter().map(|p| (p.width(), p.height())),
        )?;
        Ok(VideoFrame {
            format,
            width,
            height,
            planes,
            props,
        })
    }

    /// Build a frame from tightly packed plane data (stride == row size)
    pub fn from_packed(
        format: PixelFormat,
        width: usize,
        height: usize,
        data: Vec<Vec<u8>>,
    ) -> Result<Self> {
        let bps = format.bytes_per_sample();
        let planes = data
            .into_iter()
            .enumerate()
            .map(|(i, bytes)| {
                let w = format.plane_width(i, width);
                let h = format.plane_height(i, height);
                Plane::new(Buffer::from_vec(bytes), w, h, w * bps, bps)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_planes(format, width, height, planes, FrameProps::default())
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

    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    /// Get a plane by index
    pub fn get_plane(&self, index: usize) -> Option<&Plane> {
        self.planes.get(index)
    }

    /// Read view of plane `index`
    ///
    /// Panics if `index >= num_planes()`.
    pub fn plane(&self, index: usize) -> PlaneView<'_> {
        self.planes[index].view()
    }

    /// Duplicate the frame's planes (keeping their stride) into a writable frame
    pub fn to_mut(&self) -> VideoFrameMut {
        VideoFrameMut {
            format: self.format,
            width: self.width,
            height: self.height,
            planes: self.planes.iter().map(Plane::to_mut).collect(),
            props: self.props.clone(),
        }
    }
}

/// A frame under construction
#[derive(Debug)]
pub struct VideoFrameMut {
    format: PixelFormat,
    width: usize,
    height: usize,
    planes: Vec<PlaneMut>,
    /// Frame properties
    pub props: FrameProps,
}

impl VideoFrameMut {
    /// Allocate a zero-filled frame whose rows are padded to `alignment` bytes
    pub fn zeroed(
        format: PixelFormat,
        width: usize,
        height: usize,
        alignment: usize,
        props: FrameProps,
    ) -> Self {
        let bps = format.bytes_per_sample();
        let planes = (0..format.num_planes())
            .map(|i| {
                let w = format.plane_width(i, width);
                let h = format.plane_height(i, height);
                PlaneMut::zeroed(w, h, aligned_stride(w * bps, alignment), bps)
            })
            .collect();
        VideoFrameMut {
            format,
            width,
            height,
            planes,
            props,
        }
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

    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    /// Read view of plane `index`
    ///
    /// Panics if `index >= num_planes()`.
    pub fn plane(&self, index: usize) -> PlaneView<'_> {
        self.planes[index].view()
    }

    /// Write view of plane `index`
    ///
    /// Panics if `index >= num_planes()`.
    pub fn plane_mut(&mut self, index: usize) -> PlaneViewMut<'_> {
        self.planes[index].view_mut()
    }

    /// Finish the frame
    pub fn freeze(self) -> VideoFrame {
        VideoFrame {
            format: self.format,
            width: self.width,
            height: self.height,
            planes: self.planes.into_iter().map(PlaneMut::freeze).collect(),
            props: self.props,
        }
    }

    /// Finish the frame and wrap it as an output handle
    pub fn into_ref(self) -> FrameRef {
        FrameRef::new(self.freeze())
    }
}
