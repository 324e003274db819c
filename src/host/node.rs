//! Upstream node handles and in-memory source clips

use super::core::Core;
use crate::error::{Error, Result};
use crate::frame::{FrameProps, VideoFrame, VideoFrameMut};
use crate::util::{PixelFormat, Rational, Timestamp};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Stream-level description of a clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    /// `None` when the format may change from frame to frame
    pub format: Option<PixelFormat>,
    /// 0 when the width may change from frame to frame
    pub width: usize,
    /// 0 when the height may change from frame to frame
    pub height: usize,
    pub fps: Rational,
    pub num_frames: usize,
}

impl VideoInfo {
    /// Whether format and dimensions are fixed for the whole clip
    pub fn is_constant_format(&self) -> bool {
        self.format.is_some() && self.width > 0 && self.height > 0
    }
}

impl fmt::Display for VideoInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            Some(format) => write!(f, "{}", format)?,
            None => write!(f, "variable")?,
        }
        write!(
            f,
            " {}x{}, {} frames @ {} fps",
            self.width, self.height, self.num_frames, self.fps
        )
    }
}

/// Unique identity of a node within the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that can produce frames on request: a source clip or a filter
pub trait VideoNode: Send + Sync {
    fn name(&self) -> &str;

    fn info(&self) -> &VideoInfo;

    /// Produce frame `n`. Callers guarantee `n < info().num_frames`.
    fn produce(&self, n: usize, core: &Core) -> Result<Arc<VideoFrame>>;
}

/// Shared, read-only handle to an upstream node
///
/// Cloning takes another reference; dropping releases it.
#[derive(Clone)]
pub struct Node {
    id: NodeId,
    inner: Arc<dyn VideoNode>,
}

impl Node {
    pub fn new(node: impl VideoNode + 'static) -> Self {
        Node {
            id: NodeId::next(),
            inner: Arc::new(node),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn info(&self) -> &VideoInfo {
        self.inner.info()
    }

    /// Number of live references to this node
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Fetch frame `n`, running upstream filters as needed
    pub fn get_frame(&self, n: usize, core: &Core) -> Result<Arc<VideoFrame>> {
        let num_frames = self.info().num_frames;
        if n >= num_frames {
            return Err(Error::invalid_input(format!(
                "{} {}: frame {} requested, clip has {} frames",
                self.name(),
                self.id,
                n,
                num_frames
            )));
        }
        self.inner.produce(n, core)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("info", self.info())
            .finish()
    }
}

/// A source node serving frames held in memory
pub struct Clip {
    info: VideoInfo,
    frames: Vec<Arc<VideoFrame>>,
}

impl Clip {
    /// Build a clip from decoded frames. Format and dimensions are reported as
    /// variable when the frames disagree.
    pub fn from_frames(frames: Vec<VideoFrame>, fps: Rational) -> Result<Self> {
        let first = frames
            .first()
            .ok_or_else(|| Error::invalid_input("A clip needs at least one frame"))?;
        let same = |f: &VideoFrame| f.format() == first.format();
        let format = frames.iter().all(same).then(|| first.format());
        let width = if frames.iter().all(|f| f.width() == first.width()) {
            first.width()
        } else {
            0
        };
        let height = if frames.iter().all(|f| f.height() == first.height()) {
            first.height()
        } else {
            0
        };

        let info = VideoInfo {
            format,
            width,
            height,
            fps,
            num_frames: frames.len(),
        };
        Ok(Clip {
            info,
            frames: frames.into_iter().map(Arc::new).collect(),
        })
    }

    /// A clip of zero-filled frames with consecutive timestamps
    pub fn blank(format: PixelFormat, width: usize, height: usize, num_frames: usize) -> Self {
        let frames = (0..num_frames)
            .map(|i| {
                let props = FrameProps {
                    pts: Timestamp::new(i as i64),
                    ..FrameProps::default()
                };
                Arc::new(VideoFrameMut::zeroed(format, width, height, 1, props).freeze())
            })
            .collect();
        Clip {
            info: VideoInfo {
                format: Some(format),
                width,
                height,
                fps: Rational::new(25, 1),
                num_frames,
            },
            frames,
        }
    }

    /// Wrap the clip into a node handle
    pub fn into_node(self) -> Node {
        Node::new(self)
    }
}

impl VideoNode for Clip {
    fn name(&self) -> &str {
        "Clip"
    }

    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn produce(&self, n: usize, _core: &Core) -> Result<Arc<VideoFrame>> {
        self.frames
            .get(n)
            .cloned()
            .ok_or_else(|| Error::invalid_input(format!("Clip has no frame {}", n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_clip() {
        let node = Node::new(Clip::blank(PixelFormat::YUV444P8, 8, 4, 2));
        assert!(node.info().is_constant_format());
        assert_eq!(node.info().num_frames, 2);

        let frame = node.get_frame(1, &Core::default()).unwrap();
        assert_eq!(frame.props.pts, Timestamp::new(1));
    }

    #[test]
    fn test_out_of_range_frame() {
        let node = Node::new(Clip::blank(PixelFormat::Gray8, 2, 2, 1));
        let err = node.get_frame(1, &Core::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_variable_format_clip() {
        let a = VideoFrame::from_packed(PixelFormat::Gray8, 2, 1, vec![vec![0; 2]]).unwrap();
        let b = VideoFrame::from_packed(PixelFormat::Gray8, 1, 1, vec![vec![0; 1]]).unwrap();
        let clip = Clip::from_frames(vec![a, b], Rational::new(24, 1)).unwrap();

        assert_eq!(clip.info().width, 0);
        assert!(!clip.info().is_constant_format());
    }

    #[test]
    fn test_node_ids_are_unique() {
        let a = Node::new(Clip::blank(PixelFormat::Gray8, 1, 1, 1));
        let b = Node::new(Clip::blank(PixelFormat::Gray8, 1, 1, 1));
        assert_ne!(a.id(), b.id());

        let a2 = a.clone();
        assert_eq!(a2.id(), a.id());
        assert_eq!(a.ref_count(), 2);
        drop(a2);
        assert_eq!(a.ref_count(), 1);
    }

    #[test]
    fn test_info_display() {
        let node = Node::new(Clip::blank(PixelFormat::YUV444P8, 8, 4, 2));
        assert_eq!(node.info().to_string(), "YUV444P8 8x4, 2 frames @ 25/1 fps");
    }
}
