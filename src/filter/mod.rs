//! Frame analysis filters
//!
//! Every filter follows the same shape: validate the upstream clip once at
//! construction, request inputs in the initial phase, and build the output
//! from read-only input planes once all inputs are ready.

pub mod dotblur;
pub mod motion;
pub mod rainbow;
pub mod uncross;
pub mod validate;

pub use dotblur::DotBlur;
pub use motion::{MotionCompensate, MotionEstimate, MotionVector, VectorField};
pub use rainbow::{ChromaTest, RainbowDetect, Thresholds};
pub use uncross::Uncross;
pub use validate::FormatRequirements;

use crate::error::Result;
use crate::frame::FrameRef;
use crate::host::{ActivationReason, Core, FrameContext, VideoInfo};

/// How the host may schedule concurrent calls to one filter instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Any number of calls may run at once
    Parallel,
    /// Requests may run in parallel, frame production is serialised
    ParallelRequests,
    /// One activation at a time
    Serial,
}

/// A frame-producing filter driven by the activation handshake
///
/// Implementations hold only configuration fixed at construction, so a single
/// instance can serve many output frames concurrently.
pub trait Filter: Send + Sync {
    /// Name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Description of the output clip
    fn video_info(&self) -> VideoInfo;

    fn mode(&self) -> FilterMode {
        FilterMode::Parallel
    }

    /// Handle one activation for output frame `n`
    ///
    /// Returns `Ok(None)` when no frame can be produced in this phase.
    fn get_frame(
        &self,
        n: usize,
        reason: ActivationReason,
        ctx: &mut dyn FrameContext,
        core: &Core,
    ) -> Result<Option<FrameRef>>;
}
