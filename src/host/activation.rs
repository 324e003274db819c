//! The two-phase frame activation handshake
//!
//! For every output frame the host first calls a filter with
//! [`ActivationReason::Initial`]; the filter lists the upstream frames it
//! needs through [`FrameContext::request_frame`]. Once every request has been
//! delivered the host calls again with [`ActivationReason::AllFramesReady`]
//! and the filter fetches its inputs with [`FrameContext::get_frame`] and
//! builds the output.

use super::node::{Node, NodeId};
use crate::error::{Error, Result};
use crate::frame::{FrameRef, HandleLedger, VideoFrame};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Why a filter is being called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationReason {
    /// First call for an output frame: request inputs
    Initial,
    /// A single requested frame arrived (not used by the built-in scheduler)
    FrameReady,
    /// Every requested frame is available: produce the output
    AllFramesReady,
    /// An upstream request failed
    Error,
}

impl fmt::Display for ActivationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivationReason::Initial => "initial",
            ActivationReason::FrameReady => "frame-ready",
            ActivationReason::AllFramesReady => "all-frames-ready",
            ActivationReason::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// One upstream frame a filter asked for
#[derive(Debug, Clone)]
pub struct FrameRequest {
    pub node: Node,
    pub n: usize,
}

/// Frames requested during the initial phase and not yet delivered
#[derive(Debug, Clone, Default)]
pub struct PendingRequests {
    requests: Vec<FrameRequest>,
}

impl PendingRequests {
    /// Record a request; asking twice for the same frame is a no-op
    pub fn push(&mut self, node: &Node, n: usize) {
        let duplicate = self
            .requests
            .iter()
            .any(|r| r.node.id() == node.id() && r.n == n);
        if !duplicate {
            self.requests.push(FrameRequest {
                node: node.clone(),
                n,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn contains(&self, node: NodeId, n: usize) -> bool {
        self.requests.iter().any(|r| r.node.id() == node && r.n == n)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameRequest> {
        self.requests.iter()
    }

    /// Requested frame numbers, in request order
    pub fn indices(&self) -> Vec<usize> {
        self.requests.iter().map(|r| r.n).collect()
    }

    /// Whether the requests to each node were issued in ascending frame order
    pub fn is_ascending(&self) -> bool {
        let mut last: HashMap<NodeId, usize> = HashMap::new();
        for req in &self.requests {
            if let Some(prev) = last.insert(req.node.id(), req.n) {
                if prev > req.n {
                    return false;
                }
            }
        }
        true
    }
}

impl IntoIterator for PendingRequests {
    type Item = FrameRequest;
    type IntoIter = std::vec::IntoIter<FrameRequest>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.into_iter()
    }
}

/// Capability interface the host hands to a filter on every call
pub trait FrameContext {
    /// Ask for frame `n` of `node`. Never blocks; the frame becomes available
    /// in the all-frames-ready phase.
    fn request_frame(&mut self, n: usize, node: &Node);

    /// Fetch a frame requested in the initial phase. Each call acquires a new
    /// handle which must be dropped or returned.
    fn get_frame(&mut self, n: usize, node: &Node) -> Result<FrameRef>;
}

/// Per-call activation state: the pending set, the delivered frames and the
/// handle ledger
#[derive(Debug)]
pub struct ActivationContext {
    pending: PendingRequests,
    delivered: HashMap<(NodeId, usize), Arc<VideoFrame>>,
    ledger: Arc<HandleLedger>,
}

impl ActivationContext {
    pub fn new() -> Self {
        ActivationContext {
            pending: PendingRequests::default(),
            delivered: HashMap::new(),
            ledger: HandleLedger::new(),
        }
    }

    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    /// Take the outstanding requests for the host to resolve
    pub fn take_pending(&mut self) -> PendingRequests {
        std::mem::take(&mut self.pending)
    }

    /// Make frame `n` of `node` available to the all-frames-ready phase
    pub fn deliver(&mut self, node: NodeId, n: usize, frame: Arc<VideoFrame>) {
        self.delivered.insert((node, n), frame);
    }

    /// Whether every request has been delivered
    pub fn is_ready(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn ledger(&self) -> &Arc<HandleLedger> {
        &self.ledger
    }
}

impl Default for ActivationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameContext for ActivationContext {
    fn request_frame(&mut self, n: usize, node: &Node) {
        if !self.delivered.contains_key(&(node.id(), n)) {
            self.pending.push(node, n);
        }
    }

    fn get_frame(&mut self, n: usize, node: &Node) -> Result<FrameRef> {
        let frame = self.delivered.get(&(node.id(), n)).ok_or_else(|| {
            Error::invalid_state(format!(
                "Frame {} of {} was not requested or not yet delivered",
                n,
                node.name()
            ))
        })?;
        Ok(self.ledger.acquire(Arc::clone(frame)))
    }
}
