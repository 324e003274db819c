//! The host side of the filter interface
//!
//! The frame graph, cache and scheduler of a real host are outside this
//! crate; filters only see them through [`FrameContext`] and [`Node`]. This
//! module also carries a small deterministic host ([`ActivationContext`],
//! [`Scheduler`], [`Registry`]) used by the CLI and the tests.

pub mod activation;
pub mod args;
pub mod core;
pub mod node;
pub mod registry;
pub mod scheduler;

pub use self::activation::{
    ActivationContext, ActivationReason, FrameContext, FrameRequest, PendingRequests,
};
pub use self::args::{Args, Value};
pub use self::core::Core;
pub use self::node::{Clip, Node, NodeId, VideoInfo, VideoNode};
pub use self::registry::{ArgKind, ArgSpec, FunctionDef, Plugin, Registry};
pub use self::scheduler::{activate, activate_with, FilterNode, Scheduler};
