//! Padding-aware plane storage and views
//!
//! A plane is a rectangular grid of samples stored row-major, with each row
//! starting `stride` bytes after the previous one. Rows may carry trailing
//! padding; views only ever hand out the `width * bytes_per_sample` bytes of
//! pixel data in a row.

use crate::error::{Error, Result};
use crate::util::{Buffer, BufferRef};

fn check_layout(
    len: usize,
    width: usize,
    height: usize,
    stride: usize,
    bytes_per_sample: usize,
) -> Result<()> {
    let row_bytes = width * bytes_per_sample;
    if stride < row_bytes {
        return Err(Error::invalid_input(format!(
            "Plane stride {} is smaller than row size {}",
            stride, row_bytes
        )));
    }
    let need = if height == 0 {
        0
    } else {
        stride * (height - 1) + row_bytes
    };
    if len < need {
        return Err(Error::invalid_input(format!(
            "Plane buffer too small: need {}, have {}",
            need, len
        )));
    }
    Ok(())
}

/// Round `row_bytes` up to the next multiple of `alignment`
pub fn aligned_stride(row_bytes: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return row_bytes;
    }
    (row_bytes + alignment - 1) / alignment * alignment
}

/// One read-only plane of a finished frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    data: Buffer,
    width: usize,
    height: usize,
    stride: usize,
    bytes_per_sample: usize,
}

impl Plane {
    /// Wrap existing plane data, checking that `stride` and the buffer size
    /// cover `height` rows of `width` samples
    pub fn new(
        data: Buffer,
        width: usize,
        height: usize,
        stride: usize,
        bytes_per_sample: usize,
    ) -> Result<Self> {
        check_layout(data.len(), width, height, stride, bytes_per_sample)?;
        Ok(Plane {
            data,
            width,
            height,
            stride,
            bytes_per_sample,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Borrow the plane for reading
    pub fn view(&self) -> PlaneView<'_> {
        PlaneView {
            data: self.data.as_slice(),
            width: self.width,
            height: self.height,
            stride: self.stride,
            bytes_per_sample: self.bytes_per_sample,
        }
    }

    /// Duplicate into a writable plane with the same layout
    pub fn to_mut(&self) -> PlaneMut {
        PlaneMut {
            data: self.data.to_mut(),
            width: self.width,
            height: self.height,
            stride: self.stride,
            bytes_per_sample: self.bytes_per_sample,
        }
    }
}

/// One writable plane of a frame under construction
#[derive(Debug)]
pub struct PlaneMut {
    data: BufferRef,
    width: usize,
    height: usize,
    stride: usize,
    bytes_per_sample: usize,
}

impl PlaneMut {
    /// Allocate a zero-filled plane
    pub fn zeroed(width: usize, height: usize, stride: usize, bytes_per_sample: usize) -> Self {
        PlaneMut {
            data: BufferRef::zeroed(stride * height),
            width,
            height,
            stride,
            bytes_per_sample,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn view(&self) -> PlaneView<'_> {
        PlaneView {
            data: self.data.as_slice(),
            width: self.width,
            height: self.height,
            stride: self.stride,
            bytes_per_sample: self.bytes_per_sample,
        }
    }

    pub fn view_mut(&mut self) -> PlaneViewMut<'_> {
        PlaneViewMut {
            data: self.data.as_mut_slice(),
            width: self.width,
            height: self.height,
            stride: self.stride,
            bytes_per_sample: self.bytes_per_sample,
        }
    }

    pub fn freeze(self) -> Plane {
        Plane {
            data: self.data.freeze(),
            width: self.width,
            height: self.height,
            stride: self.stride,
            bytes_per_sample: self.bytes_per_sample,
        }
    }
}

/// Read accessor over a plane
#[derive(Debug, Clone, Copy)]
pub struct PlaneView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
    bytes_per_sample: usize,
}

impl<'a> PlaneView<'a> {
    /// Build a view over caller-owned memory
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        stride: usize,
        bytes_per_sample: usize,
    ) -> Result<Self> {
        check_layout(data.len(), width, height, stride, bytes_per_sample)?;
        Ok(PlaneView {
            data,
            width,
            height,
            stride,
            bytes_per_sample,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel bytes of row `y`, without padding
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &'a [u8] {
        assert!(y < self.height, "row {} out of range ({})", y, self.height);
        let start = y * self.stride;
        &self.data[start..start + self.width * self.bytes_per_sample]
    }

    /// 8-bit sample at (`x`, `y`)
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.row(y)[x]
    }

    /// Iterate over the pixel bytes of every row, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let row_bytes = self.width * self.bytes_per_sample;
        self.data
            .chunks(self.stride.max(1))
            .take(self.height)
            .map(move |row| &row[..row_bytes])
    }
}

/// Write accessor over a plane
#[derive(Debug)]
pub struct PlaneViewMut<'a> {
    data: &'a mut [u8],
    width: usize,
    height: usize,
    stride: usize,
    bytes_per_sample: usize,
}

impl<'a> PlaneViewMut<'a> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Writable pixel bytes of row `y`, without padding
    ///
    /// Panics if `y >= height`.
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        assert!(y < self.height, "row {} out of range ({})", y, self.height);
        let start = y * self.stride;
        &mut self.data[start..start + self.width * self.bytes_per_sample]
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.row_mut(y)[x] = value;
    }

    /// Iterate over the writable pixel bytes of every row, top to bottom
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> + '_ {
        let row_bytes = self.width * self.bytes_per_sample;
        self.data
            .chunks_mut(self.stride.max(1))
            .take(self.height)
            .map(move |row| &mut row[..row_bytes])
    }

    /// Set every pixel sample to `value`, leaving row padding alone
    pub fn fill(&mut self, value: u8) {
        for row in self.rows_mut() {
            row.fill(value);
        }
    }
}
