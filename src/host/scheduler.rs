//! Host-side driver for the activation handshake

use super::activation::{ActivationContext, ActivationReason};
use super::core::Core;
use super::node::{Node, VideoInfo, VideoNode};
use crate::error::{Error, Result};
use crate::filter::{Filter, FilterMode};
use crate::frame::VideoFrame;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::ops::Range;
use std::sync::Arc;
use tracing::{trace, warn};

/// Produce output frame `n` of `filter` using a fresh activation context
pub fn activate<F: Filter + ?Sized>(filter: &F, n: usize, core: &Core) -> Result<Arc<VideoFrame>> {
    let mut ctx = ActivationContext::new();
    activate_with(filter, n, core, &mut ctx)
}

/// Produce output frame `n` of `filter`, leaving `ctx` available for
/// inspection afterwards
pub fn activate_with<F: Filter + ?Sized>(
    filter: &F,
    n: usize,
    core: &Core,
    ctx: &mut ActivationContext,
) -> Result<Arc<VideoFrame>> {
    run(filter, n, core, ctx, None)
}

fn run<F: Filter + ?Sized>(
    filter: &F,
    n: usize,
    core: &Core,
    ctx: &mut ActivationContext,
    lock: Option<&Mutex<()>>,
) -> Result<Arc<VideoFrame>> {
    let _serial = match filter.mode() {
        FilterMode::Serial => lock.map(|l| l.lock()),
        _ => None,
    };

    trace!(filter = filter.name(), n, "initial");
    if let Some(frame) = filter.get_frame(n, ActivationReason::Initial, ctx, core)? {
        return Ok(frame.into_shared());
    }

    if !ctx.pending().is_ascending() {
        warn!(
            filter = filter.name(),
            n,
            requests = ?ctx.pending().indices(),
            "frames requested out of ascending order"
        );
    }

    for req in ctx.take_pending() {
        let frame = req.node.get_frame(req.n, core)?;
        ctx.deliver(req.node.id(), req.n, frame);
    }

    let _compute = match filter.mode() {
        FilterMode::ParallelRequests => lock.map(|l| l.lock()),
        _ => None,
    };

    trace!(filter = filter.name(), n, "all frames ready");
    match filter.get_frame(n, ActivationReason::AllFramesReady, ctx, core)? {
        Some(frame) => Ok(frame.into_shared()),
        None => Err(Error::invalid_state(format!(
            "{} produced no frame {} with all inputs ready",
            filter.name(),
            n
        ))),
    }
}

/// Adapts a [`Filter`] into a [`VideoNode`] so it can feed other filters
pub struct FilterNode<F> {
    filter: F,
    info: VideoInfo,
    lock: Mutex<()>,
}

impl<F: Filter> FilterNode<F> {
    pub fn new(filter: F) -> Self {
        let info = filter.video_info();
        FilterNode {
            filter,
            info,
            lock: Mutex::new(()),
        }
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }
}

impl<F: Filter + 'static> FilterNode<F> {
    /// Wrap `filter` into a shareable node handle
    pub fn into_node(filter: F) -> Node {
        Node::new(FilterNode::new(filter))
    }
}

impl<F: Filter> VideoNode for FilterNode<F> {
    fn name(&self) -> &str {
        self.filter.name()
    }

    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn produce(&self, n: usize, core: &Core) -> Result<Arc<VideoFrame>> {
        let mut ctx = ActivationContext::new();
        run(&self.filter, n, core, &mut ctx, Some(&self.lock))
    }
}

/// Renders frames of a node, many at a time
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    core: Core,
}

impl Scheduler {
    pub fn new(core: Core) -> Self {
        Scheduler { core }
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    /// Run one activation of `filter` for output frame `n`
    pub fn activate<F: Filter + ?Sized>(&self, filter: &F, n: usize) -> Result<Arc<VideoFrame>> {
        activate(filter, n, &self.core)
    }

    /// Render a single frame
    pub fn get_frame(&self, node: &Node, n: usize) -> Result<Arc<VideoFrame>> {
        node.get_frame(n, &self.core)
    }

    /// Render every frame in `range` concurrently, returned in frame order
    pub fn render_range(&self, node: &Node, range: Range<usize>) -> Result<Vec<Arc<VideoFrame>>> {
        range
            .into_par_iter()
            .map(|n| node.get_frame(n, &self.core))
            .collect()
    }

    /// Render the whole clip
    pub fn render_all(&self, node: &Node) -> Result<Vec<Arc<VideoFrame>>> {
        self.render_range(node, 0..node.info().num_frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameRef;
    use crate::host::{Clip, FrameContext};
    use crate::util::PixelFormat;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct Overlap {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    /// Pass-through that records how many compute phases overlap
    struct Tracker {
        node: Node,
        mode: FilterMode,
        overlap: Arc<Overlap>,
    }

    impl Filter for Tracker {
        fn name(&self) -> &'static str {
            "Tracker"
        }

        fn video_info(&self) -> VideoInfo {
            self.node.info().clone()
        }

        fn mode(&self) -> FilterMode {
            self.mode
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
                ActivationReason::AllFramesReady => {
                    let now = self.overlap.active.fetch_add(1, Ordering::SeqCst) + 1;
                    self.overlap.peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(2));
                    self.overlap.active.fetch_sub(1, Ordering::SeqCst);
                    ctx.get_frame(n, &self.node).map(Some)
                }
                _ => Ok(None),
            }
        }
    }

    fn tracked(mode: FilterMode) -> (Node, Arc<Overlap>) {
        let overlap = Arc::new(Overlap::default());
        let filter = Tracker {
            node: Clip::blank(PixelFormat::Gray8, 4, 4, 32).into_node(),
            mode,
            overlap: Arc::clone(&overlap),
        };
        (FilterNode::into_node(filter), overlap)
    }

    #[test]
    fn test_render_range_keeps_order() {
        let (node, _) = tracked(FilterMode::Parallel);
        let frames = Scheduler::default().render_range(&node, 4..12).unwrap();
        assert_eq!(frames.len(), 8);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.props.pts.value, (i + 4) as i64);
        }
    }

    #[test]
    fn test_serial_filters_never_overlap() {
        for mode in [FilterMode::Serial, FilterMode::ParallelRequests] {
            let (node, overlap) = tracked(mode);
            Scheduler::default().render_all(&node).unwrap();
            assert_eq!(overlap.peak.load(Ordering::SeqCst), 1, "{:?}", mode);
        }
    }

    #[test]
    fn test_scheduler_activate() {
        let overlap = Arc::new(Overlap::default());
        let filter = Tracker {
            node: Clip::blank(PixelFormat::Gray8, 4, 4, 2).into_node(),
            mode: FilterMode::Parallel,
            overlap,
        };
        let frame = Scheduler::default().activate(&filter, 1).unwrap();
        assert_eq!(frame.props.pts.value, 1);
        assert!(Scheduler::default().activate(&filter, 2).is_err());
    }
}
