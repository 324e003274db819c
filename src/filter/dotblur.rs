//! Horizontal four-tap box blur
//!
//! Averages each sample with the three samples to its right, on every plane.
//! The output starts as a copy of the source, so the last three columns of
//! each row keep their original values.
//!
//! ## Arithmetic
//!
//! `out[x] = (in[x] + in[x+1] + in[x+2] + in[x+3] + 2) / 4` for `x + 3 < width`.
//! Halves round up. A flat plane is left unchanged.
//!
//! ## Usage
//!
//! ```rust
//! use zvf_lib::filter::DotBlur;
//! use zvf_lib::host::{Clip, FilterNode, Scheduler};
//! use zvf_lib::util::PixelFormat;
//!
//! # fn main() -> zvf_lib::Result<()> {
//! let clip = Clip::blank(PixelFormat::YUV444P8, 64, 32, 4).into_node();
//! let blurred = FilterNode::into_node(DotBlur::new(clip)?);
//! let frames = Scheduler::default().render_all(&blurred)?;
//! assert_eq!(frames.len(), 4);
//! # Ok(())
//! # }
//! ```

use super::{Filter, FormatRequirements};
use crate::error::Result;
use crate::frame::{FrameRef, PlaneView, PlaneViewMut};
use crate::host::{
    ActivationReason, Args, Core, FilterNode, FrameContext, FunctionDef, Node, Plugin, VideoInfo,
};
use tracing::debug;

/// Number of samples averaged per output sample
pub const TAPS: usize = 4;

/// Write the rounded mean of `src[x..x + 4]` to `dst[x]` for every `x` with
/// `x + 3 < width`. Other samples of `dst` are left untouched.
pub fn box_average(src: &PlaneView<'_>, dst: &mut PlaneViewMut<'_>) {
    for (src_row, dst_row) in src.rows().zip(dst.rows_mut()) {
        for (out, window) in dst_row.iter_mut().zip(src_row.windows(TAPS)) {
            let sum: u16 = window.iter().map(|&v| u16::from(v)).sum();
            // half rounds up, i.e. away from zero for non-negative sums
            *out = ((sum + 2) / TAPS as u16) as u8;
        }
    }
}

/// The `dotblur.Blur` filter
#[derive(Debug)]
pub struct DotBlur {
    node: Node,
    info: VideoInfo,
}

impl DotBlur {
    pub fn new(node: Node) -> Result<Self> {
        FormatRequirements::new("DotBlur").yuv444().check(node.info())?;
        let info = node.info().clone();
        debug!(upstream = %node.id(), %info, "created DotBlur");
        Ok(DotBlur { node, info })
    }

    fn create(args: &Args) -> Result<Node> {
        let filter = DotBlur::new(args.clip("clip")?)?;
        Ok(FilterNode::into_node(filter))
    }
}

impl Filter for DotBlur {
    fn name(&self) -> &'static str {
        "DotBlur"
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
                ctx.request_frame(n, &self.node);
                Ok(None)
            }
            ActivationReason::AllFramesReady => {
                let src = ctx.get_frame(n, &self.node)?;
                let mut dst = core.copy_frame(&src);
                for plane in 0..src.num_planes() {
                    box_average(&src.plane(plane), &mut dst.plane_mut(plane));
                }
                Ok(Some(dst.into_ref()))
            }
            _ => Ok(None),
        }
    }
}

/// Plugin descriptor for `dotblur`
pub fn plugin() -> Plugin {
    Plugin {
        identifier: "com.zvf.dotblur",
        namespace: "dotblur",
        name: "Dot Blur",
        functions: vec![FunctionDef::new("Blur", "clip:clip;", DotBlur::create)],
    }
}
