//! Motion estimation and compensation between consecutive frames
//!
//! `MotionEstimate` produces a per-pixel luma difference mask.
//! `MotionCompensate` runs exhaustive block matching on 4x4 luma blocks and
//! either shows which blocks moved, or rebuilds the moving blocks of the
//! current frame from the displaced blocks of the previous one.
//!
//! The first frame of a clip has no predecessor and is passed through as-is.
//!
//! ## Block Matching
//!
//! - Blocks are 4x4 luma samples; `MotionCompensate` needs mod4 input
//! - A block whose zero-displacement SAD is at most `threshold` is static
//! - Moving blocks search +/-4 pixels, staying inside the previous frame
//!
//! ## Usage
//!
//! ```rust
//! use zvf_lib::filter::motion::{estimate_vectors, SEARCH_RANGE};
//! use zvf_lib::filter::MotionCompensate;
//! use zvf_lib::host::{Clip, FilterNode, Scheduler};
//! use zvf_lib::util::PixelFormat;
//!
//! # fn main() -> zvf_lib::Result<()> {
//! let clip = Clip::blank(PixelFormat::YUV444P8, 32, 16, 2).into_node();
//!
//! // vectors for one pair of frames
//! let cur = clip.get_frame(1, &Default::default())?;
//! let prev = clip.get_frame(0, &Default::default())?;
//! let field = estimate_vectors(&cur.plane(0), &prev.plane(0), 16, SEARCH_RANGE);
//! assert_eq!(field.moving_blocks(), 0);
//!
//! // compensated output for the whole clip
//! let node = FilterNode::into_node(MotionCompensate::new(clip, 16, true)?);
//! let frames = Scheduler::default().render_all(&node)?;
//! assert_eq!(frames.len(), 2);
//! # Ok(())
//! # }
//! ```

use super::{Filter, FormatRequirements};
use crate::error::{Error, Result};
use crate::frame::{FrameRef, PlaneView, PlaneViewMut, VideoFrame, VideoFrameMut};
use crate::host::{
    ActivationReason, Args, Core, FilterNode, FrameContext, FunctionDef, Node, Plugin, VideoInfo,
};
use tracing::{debug, trace};

/// Side of the square blocks used for matching
pub const BLOCK_SIZE: usize = 4;

/// Largest displacement searched in each direction, in pixels
pub const SEARCH_RANGE: isize = 4;

/// Value written for moving pixels and blocks
pub const MARKED: u8 = 255;

/// Set `dst` to 255 where `|cur - prev| > threshold`, 0 elsewhere. Returns
/// the number of marked pixels.
pub fn difference_mask(
    cur: &PlaneView<'_>,
    prev: &PlaneView<'_>,
    dst: &mut PlaneViewMut<'_>,
    threshold: i64,
) -> usize {
    let mut marked = 0;
    for ((c, p), out) in cur.rows().zip(prev.rows()).zip(dst.rows_mut()) {
        for ((&a, &b), o) in c.iter().zip(p).zip(out.iter_mut()) {
            let moving = (i64::from(a) - i64::from(b)).abs() > threshold;
            *o = if moving {
                marked += 1;
                MARKED
            } else {
                0
            };
        }
    }
    marked
}

/// Best match found for one block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionVector {
    /// Horizontal displacement into the previous frame
    pub dx: isize,
    /// Vertical displacement into the previous frame
    pub dy: isize,
    /// Sum of absolute differences at the chosen displacement
    pub sad: u32,
    /// Whether the block differed from the co-located block by more than the
    /// threshold
    pub moving: bool,
}

/// Motion vectors for every block of a plane, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorField {
    blocks_x: usize,
    blocks_y: usize,
    vectors: Vec<MotionVector>,
}

impl VectorField {
    pub fn blocks_x(&self) -> usize {
        self.blocks_x
    }

    pub fn blocks_y(&self) -> usize {
        self.blocks_y
    }

    /// Vector of block (`bx`, `by`)
    pub fn get(&self, bx: usize, by: usize) -> Option<&MotionVector> {
        if bx >= self.blocks_x {
            return None;
        }
        self.vectors.get(by * self.blocks_x + bx)
    }

    /// Iterate as `(bx, by, vector)`
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &MotionVector)> {
        let bx = self.blocks_x.max(1);
        self.vectors
            .iter()
            .enumerate()
            .map(move |(i, v)| (i % bx, i / bx, v))
    }

    pub fn moving_blocks(&self) -> usize {
        self.vectors.iter().filter(|v| v.moving).count()
    }
}

fn block_sad(cur: &PlaneView<'_>, prev: &PlaneView<'_>, x: usize, y: usize, px: usize, py: usize) -> u32 {
    let mut sad = 0u32;
    for row in 0..BLOCK_SIZE {
        let c = &cur.row(y + row)[x..x + BLOCK_SIZE];
        let p = &prev.row(py + row)[px..px + BLOCK_SIZE];
        sad += c
            .iter()
            .zip(p)
            .map(|(&a, &b)| u32::from(a.abs_diff(b)))
            .sum::<u32>();
    }
    sad
}

/// Block matching of `cur` against `prev`
///
/// Blocks whose zero-displacement SAD is at most `threshold` are static. For
/// the others every displacement within `range` that keeps the block inside
/// the plane is tried; ties go to the shorter vector, then to scan order.
/// Partial blocks at the right and bottom edges are ignored.
pub fn estimate_vectors(
    cur: &PlaneView<'_>,
    prev: &PlaneView<'_>,
    threshold: u32,
    range: isize,
) -> VectorField {
    let blocks_x = cur.width() / BLOCK_SIZE;
    let blocks_y = cur.height() / BLOCK_SIZE;
    let max_x = (cur.width() - BLOCK_SIZE * usize::from(blocks_x > 0)) as isize;
    let max_y = (cur.height() - BLOCK_SIZE * usize::from(blocks_y > 0)) as isize;
    let mut vectors = Vec::with_capacity(blocks_x * blocks_y);

    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let (x, y) = (bx * BLOCK_SIZE, by * BLOCK_SIZE);
            let still = block_sad(cur, prev, x, y, x, y);
            if still <= threshold {
                vectors.push(MotionVector {
                    sad: still,
                    ..MotionVector::default()
                });
                continue;
            }

            let mut best = MotionVector {
                dx: 0,
                dy: 0,
                sad: still,
                moving: true,
            };
            for dy in -range..=range {
                for dx in -range..=range {
                    let (px, py) = (x as isize + dx, y as isize + dy);
                    if px < 0 || py < 0 || px > max_x || py > max_y {
                        continue;
                    }
                    let sad = block_sad(cur, prev, x, y, px as usize, py as usize);
                    let shorter = dx.abs() + dy.abs() < best.dx.abs() + best.dy.abs();
                    if sad < best.sad || (sad == best.sad && shorter) {
                        best = MotionVector {
                            dx,
                            dy,
                            sad,
                            moving: true,
                        };
                    }
                }
            }
            vectors.push(best);
        }
    }

    VectorField {
        blocks_x,
        blocks_y,
        vectors,
    }
}

/// Fill every moving block of `dst` with 255
pub fn block_mask(field: &VectorField, dst: &mut PlaneViewMut<'_>) {
    for (bx, by, v) in field.iter().filter(|(_, _, v)| v.moving) {
        for row in 0..BLOCK_SIZE {
            let start = bx * BLOCK_SIZE;
            dst.row_mut(by * BLOCK_SIZE + row)[start..start + BLOCK_SIZE].fill(MARKED);
        }
    }
}

/// Replace every moving block of `dst`, on all planes, with the block of
/// `prev` displaced by its vector
pub fn compensate_blocks(field: &VectorField, prev: &VideoFrame, dst: &mut VideoFrameMut) {
    for plane in 0..dst.num_planes() {
        let src = prev.plane(plane);
        let mut out = dst.plane_mut(plane);
        for (bx, by, v) in field.iter().filter(|(_, _, v)| v.moving) {
            let (x, y) = (bx * BLOCK_SIZE, by * BLOCK_SIZE);
            let px = (x as isize + v.dx) as usize;
            let py = (y as isize + v.dy) as usize;
            for row in 0..BLOCK_SIZE {
                out.row_mut(y + row)[x..x + BLOCK_SIZE]
                    .copy_from_slice(&src.row(py + row)[px..px + BLOCK_SIZE]);
            }
        }
    }
}

fn request_pair(ctx: &mut dyn FrameContext, node: &Node, n: usize) {
    if n > 0 {
        ctx.request_frame(n - 1, node);
    }
    ctx.request_frame(n, node);
}

fn check_threshold(filter: &str, threshold: i64) -> Result<()> {
    if threshold < 0 {
        return Err(Error::config(format!(
            "{}: threshold must not be negative, got {}",
            filter, threshold
        )));
    }
    Ok(())
}

/// The `motiondetect.Estimate` filter
#[derive(Debug)]
pub struct MotionEstimate {
    node: Node,
    info: VideoInfo,
    threshold: i64,
}

impl MotionEstimate {
    pub const DEFAULT_THRESHOLD: i64 = 2;

    pub fn new(node: Node, threshold: i64) -> Result<Self> {
        FormatRequirements::new("MotionEstimate")
            .yuv444()
            .check(node.info())?;
        check_threshold("MotionEstimate", threshold)?;

        let info = node.info().clone();
        debug!(upstream = %node.id(), threshold, "created MotionEstimate");
        Ok(MotionEstimate {
            node,
            info,
            threshold,
        })
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    fn create(args: &Args) -> Result<Node> {
        let threshold = args.int_or("threshold", Self::DEFAULT_THRESHOLD)?;
        let filter = MotionEstimate::new(args.clip("clip")?, threshold)?;
        Ok(FilterNode::into_node(filter))
    }
}

impl Filter for MotionEstimate {
    fn name(&self) -> &'static str {
        "MotionEstimate"
    }

    fn video_info(&self) -> VideoInfo {
        self.info.clone()
    }

    fn get_frame(
        &self,
        n: usize,
        reason: ActivationReason,
        ctx: &mut dyn FrameContext,
        core: &Core,
    ) -> Result<Option<FrameRef>> {
        match reason {
            ActivationReason::Initial => {
                request_pair(ctx, &self.node, n);
                Ok(None)
            }
            ActivationReason::AllFramesReady => {
                let src = ctx.get_frame(n, &self.node)?;
                if n == 0 {
                    return Ok(Some(src));
                }
                let prev = ctx.get_frame(n - 1, &self.node)?;

                let mut dst = core.new_video_frame(src.format(), src.width(), src.height(), &src);
                let marked =
                    difference_mask(&src.plane(0), &prev.plane(0), &mut dst.plane_mut(0), self.threshold);
                trace!(n, marked, "motion mask");
                Ok(Some(dst.into_ref()))
            }
            _ => Ok(None),
        }
    }
}

/// The `motiondetect.Compensate` filter
#[derive(Debug)]
pub struct MotionCompensate {
    node: Node,
    info: VideoInfo,
    threshold: i64,
    show: bool,
}

impl MotionCompensate {
    pub const DEFAULT_THRESHOLD: i64 = 16;

    /// `show` selects the compensated frame as output instead of the block mask
    pub fn new(node: Node, threshold: i64, show: bool) -> Result<Self> {
        FormatRequirements::new("MotionCompensate")
            .yuv444()
            .mod4()
            .check(node.info())?;
        check_threshold("MotionCompensate", threshold)?;

        let info = node.info().clone();
        debug!(upstream = %node.id(), threshold, show, "created MotionCompensate");
        Ok(MotionCompensate {
            node,
            info,
            threshold,
            show,
        })
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    pub fn show(&self) -> bool {
        self.show
    }

    fn create(args: &Args) -> Result<Node> {
        let threshold = args.int_or("threshold", Self::DEFAULT_THRESHOLD)?;
        let show = args.flag_or("show", false)?;
        let filter = MotionCompensate::new(args.clip("clip")?, threshold, show)?;
        Ok(FilterNode::into_node(filter))
    }
}

impl Filter for MotionCompensate {
    fn name(&self) -> &'static str {
        "MotionCompensate"
    }

    fn video_info(&self) -> VideoInfo {
        self.info.clone()
    }

    fn get_frame(
        &self,
        n: usize,
        reason: ActivationReason,
        ctx: &mut dyn FrameContext,
        core: &Core,
    ) -> Result<Option<FrameRef>> {
        match reason {
            ActivationReason::Initial => {
                request_pair(ctx, &self.node, n);
                Ok(None)
            }
            ActivationReason::AllFramesReady => {
                let src = ctx.get_frame(n, &self.node)?;
                if n == 0 {
                    return Ok(Some(src));
                }
                let prev = ctx.get_frame(n - 1, &self.node)?;

                let threshold = u32::try_from(self.threshold).unwrap_or(u32::MAX);
                let field = estimate_vectors(&src.plane(0), &prev.plane(0), threshold, SEARCH_RANGE);
                trace!(n, moving = field.moving_blocks(), "block vectors");

                let dst = if self.show {
                    let mut dst = core.copy_frame(&src);
                    compensate_blocks(&field, &prev, &mut dst);
                    dst
                } else {
                    let mut dst = core.new_video_frame(src.format(), src.width(), src.height(), &src);
                    block_mask(&field, &mut dst.plane_mut(0));
                    dst
                };
                Ok(Some(dst.into_ref()))
            }
            _ => Ok(None),
        }
    }
}

/// Plugin descriptor for `motiondetect`
pub fn plugin() -> Plugin {
    Plugin {
        identifier: "com.zvf.motiondetect",
        namespace: "motiondetect",
        name: "MotionDetect",
        functions: vec![
            FunctionDef::new(
                "Estimate",
                "clip:clip;threshold:int:opt;",
                MotionEstimate::create,
            ),
            FunctionDef::new(
                "Compensate",
                "clip:clip;threshold:int:opt;show:int:opt;",
                MotionCompensate::create,
            ),
        ],
    }
}
