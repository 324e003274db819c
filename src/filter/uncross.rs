//! Pass-through placeholder for a cross-color removal filter
//!
//! Validates its input and returns each upstream frame unchanged.

use super::{Filter, FormatRequirements};
use crate::error::Result;
use crate::frame::FrameRef;
use crate::host::{
    ActivationReason, Args, Core, FilterNode, FrameContext, FunctionDef, Node, Plugin, VideoInfo,
};
use tracing::debug;

/// The `uncross.Filter` filter
#[derive(Debug)]
pub struct Uncross {
    node: Node,
    info: VideoInfo,
}

impl Uncross {
    pub fn new(node: Node) -> Result<Self> {
        FormatRequirements::new("Uncross").check(node.info())?;
        let info = node.info().clone();
        debug!(upstream = %node.id(), "created Uncross");
        Ok(Uncross { node, info })
    }

    fn create(args: &Args) -> Result<Node> {
        let filter = Uncross::new(args.clip("clip")?)?;
        Ok(FilterNode::into_node(filter))
    }
}

impl Filter for Uncross {
    fn name(&self) -> &'static str {
        "Uncross"
    }

    fn video_info(&self) -> VideoInfo {
        self.info.clone()
    }

    fn get_frame(
        &self,
        n: usize,
        reason: ActivationReason,
        ctx: &mut dyn FrameContext,
        _core: &Core,
    ) -> Result<Option<FrameRef>> {
        match reason {
            ActivationReason::Initial => {
                ctx.request_frame(n, &self.node);
                Ok(None)
            }
            ActivationReason::AllFramesReady => ctx.get_frame(n, &self.node).map(Some),
            _ => Ok(None),
        }
    }
}

/// Plugin descriptor for `uncross`
pub fn plugin() -> Plugin {
    Plugin {
        identifier: "com.zvf.uncross",
        namespace: "uncross",
        name: "Uncross",
        functions: vec![FunctionDef::new("Filter", "clip:clip;", Uncross::create)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{activate, Clip};
    use crate::util::PixelFormat;

    #[test]
    fn test_accepts_any_8bit_layout() {
        let clip = Clip::blank(PixelFormat::YUV420P8, 8, 8, 1);
        assert!(Uncross::new(clip.into_node()).is_ok());
    }

    #[test]
    fn test_rejects_high_bit_depth() {
        let clip = Clip::blank(PixelFormat::YUV444P10, 8, 8, 1);
        assert!(Uncross::new(clip.into_node()).is_err());
    }

    #[test]
    fn test_returns_upstream_frame() {
        let node = Clip::blank(PixelFormat::YUV444P8, 8, 4, 2).into_node();
        let upstream = node.get_frame(1, &Core::default()).unwrap();
        let filter = Uncross::new(node).unwrap();
        let out = activate(&filter, 1, &Core::default()).unwrap();
        assert!(std::sync::Arc::ptr_eq(&out, &upstream));
    }
}
