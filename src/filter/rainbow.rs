//! Temporal rainbow (chroma shimmer) detection
//!
//! Marks pixels whose chroma changed between the previous and the current
//! frame while the luma is above a floor. The map is written to the luma
//! plane of a fresh frame; every sample of the output is either 0 or 255.
//!
//! ## Thresholds
//!
//! - `threshY`: luma floor, pixels with `Y <= threshY` are never marked
//! - `threshU1`/`threshU2`, `threshV1`/`threshV2`: bounds for the U and V
//!   differences, compared as selected by [`ChromaTest`]
//!
//! The first frame has no predecessor and yields an all-zero frame.
//!
//! ## Usage
//!
//! ```rust
//! use zvf_lib::host::{Args, Clip, Registry, Scheduler};
//! use zvf_lib::util::PixelFormat;
//!
//! # fn main() -> zvf_lib::Result<()> {
//! let mut args = Args::new();
//! args.set_clip("clip", Clip::blank(PixelFormat::YUV444P8, 16, 16, 3).into_node());
//! args.set_int("threshY", 16).set_int("band", 1);
//!
//! let map = Registry::builtin().invoke("rainbowdetect.Detect", &args)?;
//! let frame = Scheduler::default().get_frame(&map, 2)?;
//! assert!(frame.plane(0).rows().flatten().all(|&v| v == 0 || v == 255));
//! # Ok(())
//! # }
//! ```

use super::{Filter, FormatRequirements};
use crate::error::{Error, Result};
use crate::frame::{FrameRef, PlaneViewMut, VideoFrame};
use crate::host::{
    ActivationReason, Args, Core, FilterNode, FrameContext, FunctionDef, Node, Plugin, VideoInfo,
};
use std::fmt;
use tracing::{debug, trace};

/// Value written for a marked pixel
pub const MARKED: u8 = 255;

/// How a chroma difference is compared against its two thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromaTest {
    /// `low < d && d > high`. With `high >= low` this reduces to `d > high`.
    #[default]
    Literal,
    /// `d < low || d > high`: flag differences outside the `[low, high]` band.
    Band,
}

impl ChromaTest {
    /// Whether difference `d` is flagged
    pub fn flags(&self, d: i64, low: i64, high: i64) -> bool {
        match self {
            ChromaTest::Literal => low < d && d > high,
            ChromaTest::Band => d < low || d > high,
        }
    }
}

impl fmt::Display for ChromaTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChromaTest::Literal => write!(f, "literal"),
            ChromaTest::Band => write!(f, "band"),
        }
    }
}

/// Detection thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Luma floor; only pixels with `Y > y` can be marked
    pub y: i64,
    pub u1: i64,
    pub v1: i64,
    pub u2: i64,
    pub v2: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            y: 10,
            u1: 5,
            v1: 5,
            u2: 20,
            v2: 20,
        }
    }
}

impl Thresholds {
    /// Read `threshY`, `threshU1`, `threshV1`, `threshU2` and `threshV2`,
    /// falling back to the defaults for absent keys
    pub fn from_args(args: &Args) -> Result<Self> {
        let d = Thresholds::default();
        Ok(Thresholds {
            y: args.int_or("threshY", d.y)?,
            u1: args.int_or("threshU1", d.u1)?,
            v1: args.int_or("threshV1", d.v1)?,
            u2: args.int_or("threshU2", d.u2)?,
            v2: args.int_or("threshV2", d.v2)?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if [self.y, self.u1, self.v1, self.u2, self.v2]
            .iter()
            .any(|&t| t < 0)
        {
            return Err(Error::config(
                "RainbowDetect: thresholds must not be negative",
            ));
        }
        if self.u2 < self.u1 || self.v2 < self.v1 {
            return Err(Error::config(format!(
                "RainbowDetect: thresh2 must not be less than thresh1 (U {}..{}, V {}..{})",
                self.u1, self.u2, self.v1, self.v2
            )));
        }
        Ok(())
    }
}

/// Write the rainbow map of `cur` against `prev` into `dst`, returning the
/// number of marked pixels. All three frames must share dimensions.
pub fn rainbow_map(
    cur: &VideoFrame,
    prev: &VideoFrame,
    dst: &mut PlaneViewMut<'_>,
    thresholds: &Thresholds,
    test: ChromaTest,
) -> usize {
    let (y_plane, u_plane, v_plane) = (cur.plane(0), cur.plane(1), cur.plane(2));
    let (pu_plane, pv_plane) = (prev.plane(1), prev.plane(2));
    let mut marked = 0;

    for row in 0..dst.height() {
        let (ys, us, vs) = (y_plane.row(row), u_plane.row(row), v_plane.row(row));
        let (pus, pvs) = (pu_plane.row(row), pv_plane.row(row));
        let out = dst.row_mut(row);

        for x in 0..out.len() {
            let du = (i64::from(us[x]) - i64::from(pus[x])).abs();
            let dv = (i64::from(vs[x]) - i64::from(pvs[x])).abs();

            let hit = i64::from(ys[x]) > thresholds.y
                && (test.flags(du, thresholds.u1, thresholds.u2)
                    || test.flags(dv, thresholds.v1, thresholds.v2));

            out[x] = if hit {
                marked += 1;
                MARKED
            } else {
                0
            };
        }
    }

    marked
}

/// The `rainbowdetect.Detect` filter
#[derive(Debug)]
pub struct RainbowDetect {
    node: Node,
    info: VideoInfo,
    thresholds: Thresholds,
    test: ChromaTest,
}

impl RainbowDetect {
    pub fn new(node: Node, thresholds: Thresholds, test: ChromaTest) -> Result<Self> {
        FormatRequirements::new("RainbowDetect")
            .yuv444()
            .check(node.info())?;
        thresholds.validate()?;

        let info = node.info().clone();
        debug!(upstream = %node.id(), ?thresholds, %test, "created RainbowDetect");
        Ok(RainbowDetect {
            node,
            info,
            thresholds,
            test,
        })
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn chroma_test(&self) -> ChromaTest {
        self.test
    }

    fn create(args: &Args) -> Result<Node> {
        let thresholds = Thresholds::from_args(args)?;
        let test = if args.flag_or("band", false)? {
            ChromaTest::Band
        } else {
            ChromaTest::Literal
        };
        let filter = RainbowDetect::new(args.clip("clip")?, thresholds, test)?;
        Ok(FilterNode::into_node(filter))
    }
}

impl Filter for RainbowDetect {
    fn name(&self) -> &'static str {
        "RainbowDetect"
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
                if n > 0 {
                    ctx.request_frame(n - 1, &self.node);
                }
                ctx.request_frame(n, &self.node);
                Ok(None)
            }
            ActivationReason::AllFramesReady => {
                let src = ctx.get_frame(n, &self.node)?;
                let mut dst = core.new_video_frame(src.format(), src.width(), src.height(), &src);

                if n == 0 {
                    return Ok(Some(dst.into_ref()));
                }

                let prev = ctx.get_frame(n - 1, &self.node)?;
                let marked = rainbow_map(
                    &src,
                    &prev,
                    &mut dst.plane_mut(0),
                    &self.thresholds,
                    self.test,
                );
                trace!(n, marked, "rainbow map");
                Ok(Some(dst.into_ref()))
            }
            _ => Ok(None),
        }
    }
}

/// Plugin descriptor for `rainbowdetect`
pub fn plugin() -> Plugin {
    Plugin {
        identifier: "com.zvf.rainbowdetect",
        namespace: "rainbowdetect",
        name: "Rainbow Detect",
        functions: vec![FunctionDef::new(
            "Detect",
            "clip:clip;threshY:int:opt;threshU1:int:opt;threshV1:int:opt;\
             threshU2:int:opt;threshV2:int:opt;band:int:opt;",
            RainbowDetect::create,
        )],
    }
}
