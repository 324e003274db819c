//! Common test utilities for ZVF integration tests
//!
//! Helpers for building padded test frames and in-memory source clips.

#![allow(dead_code)]

use zvf_lib::frame::{FrameProps, Plane, VideoFrame};
use zvf_lib::host::{Clip, Node};
use zvf_lib::util::{Buffer, PixelFormat, Rational, Timestamp};

/// Byte stored in row padding; a filter that reads it produces visible garbage
pub const PADDING: u8 = 0xAA;

// ============================================================================
// Frame Generation
// ============================================================================

/// Build one plane whose rows are padded to `stride` bytes with [`PADDING`]
pub fn padded_plane(
    width: usize,
    height: usize,
    stride: usize,
    sample: impl Fn(usize, usize) -> u8,
) -> Plane {
    let mut data = vec![PADDING; stride * height];
    for y in 0..height {
        for x in 0..width {
            data[y * stride + x] = sample(x, y);
        }
    }
    Plane::new(Buffer::from_vec(data), width, height, stride, 1).unwrap()
}

/// Create a YUV444P8 frame with padded rows
///
/// `sample(plane, x, y)` gives the value of every pixel.
pub fn create_frame_444(
    width: usize,
    height: usize,
    pts: i64,
    sample: impl Fn(usize, usize, usize) -> u8,
) -> VideoFrame {
    let stride = width + 5;
    let planes = (0..3)
        .map(|p| padded_plane(width, height, stride, |x, y| sample(p, x, y)))
        .collect();
    let props = FrameProps {
        pts: Timestamp::new(pts),
        duration: Rational::new(1, 25),
        ..FrameProps::default()
    };
    VideoFrame::from_planes(PixelFormat::YUV444P8, width, height, planes, props).unwrap()
}

/// A YUV444P8 frame with a constant value per plane
pub fn create_flat_frame(width: usize, height: usize, pts: i64, yuv: [u8; 3]) -> VideoFrame {
    create_frame_444(width, height, pts, |p, _, _| yuv[p])
}

/// A YUV444P8 frame with a horizontal gradient on every plane
pub fn create_gradient_frame(width: usize, height: usize, pts: i64) -> VideoFrame {
    create_frame_444(width, height, pts, |p, x, y| {
        ((x * 29 + y * 13 + p * 50) % 256) as u8
    })
}

// ============================================================================
// Clip Generation
// ============================================================================

/// Wrap frames into a source node at 25 fps
pub fn create_clip(frames: Vec<VideoFrame>) -> Node {
    Clip::from_frames(frames, Rational::new(25, 1))
        .unwrap()
        .into_node()
}

/// A clip of `count` gradient frames, each shifted one pixel to the right
pub fn create_moving_clip(width: usize, height: usize, count: usize) -> Node {
    let frames = (0..count)
        .map(|i| {
            create_frame_444(width, height, i as i64, |p, x, y| {
                let x = x + width - i;
                ((x * 29 + y * 13 + p * 50) % 256) as u8
            })
        })
        .collect();
    create_clip(frames)
}

// ============================================================================
// Verification
// ============================================================================

/// Collect plane `index` of `frame` without padding
pub fn plane_bytes(frame: &VideoFrame, index: usize) -> Vec<Vec<u8>> {
    frame.plane(index).rows().map(|r| r.to_vec()).collect()
}

/// Whether every pixel of every plane is 0 or 255
pub fn is_binary(frame: &VideoFrame) -> bool {
    (0..frame.num_planes()).all(|p| frame.plane(p).rows().flatten().all(|&v| v == 0 || v == 255))
}

/// Whether every pixel of plane `index` is zero
pub fn is_zero_plane(frame: &VideoFrame, index: usize) -> bool {
    frame.plane(index).rows().flatten().all(|&v| v == 0)
}
