//! Frame handles and their release accounting
//!
//! Every frame a filter obtains from its [`FrameContext`](crate::host::FrameContext)
//! arrives as a [`FrameRef`]. Dropping the handle releases it; returning it
//! from a filter hands it over to the host. The [`HandleLedger`] of the
//! activation keeps the count, so `acquired == released + transferred`
//! holds once a call has returned and its output has been taken.

use super::VideoFrame;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counters shared by all handles acquired during one activation
#[derive(Debug, Default)]
pub struct HandleLedger {
    acquired: AtomicUsize,
    released: AtomicUsize,
    transferred: AtomicUsize,
}

/// Point-in-time copy of a [`HandleLedger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerSnapshot {
    pub acquired: usize,
    pub released: usize,
    pub transferred: usize,
}

impl LedgerSnapshot {
    /// Handles acquired but neither released nor handed to the host
    pub fn outstanding(&self) -> usize {
        self.acquired - self.released - self.transferred
    }

    pub fn is_balanced(&self) -> bool {
        self.acquired == self.released + self.transferred
    }
}

impl HandleLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            acquired: self.acquired.load(Ordering::Acquire),
            released: self.released.load(Ordering::Acquire),
            transferred: self.transferred.load(Ordering::Acquire),
        }
    }

    /// Issue a new tracked handle for `frame`
    pub fn acquire(self: &Arc<Self>, frame: Arc<VideoFrame>) -> FrameRef {
        self.acquired.fetch_add(1, Ordering::AcqRel);
        FrameRef {
            frame,
            ledger: Some(Arc::clone(self)),
        }
    }
}

/// A handle to a frame, released on drop
#[derive(Debug)]
pub struct FrameRef {
    frame: Arc<VideoFrame>,
    ledger: Option<Arc<HandleLedger>>,
}

impl FrameRef {
    /// Wrap a freshly created frame; new output frames are not tracked
    pub fn new(frame: VideoFrame) -> Self {
        FrameRef {
            frame: Arc::new(frame),
            ledger: None,
        }
    }

    /// Whether both handles point at the same frame data
    pub fn ptr_eq(&self, other: &FrameRef) -> bool {
        Arc::ptr_eq(&self.frame, &other.frame)
    }

    /// Whether this handle was acquired from a context (as opposed to created)
    pub fn is_tracked(&self) -> bool {
        self.ledger.is_some()
    }

    /// Hand the frame over to the host without releasing the handle
    pub fn into_shared(mut self) -> Arc<VideoFrame> {
        if let Some(ledger) = self.ledger.take() {
            ledger.transferred.fetch_add(1, Ordering::AcqRel);
        }
        Arc::clone(&self.frame)
    }
}

impl Deref for FrameRef {
    type Target = VideoFrame;

    fn deref(&self) -> &VideoFrame {
        &self.frame
    }
}

impl Drop for FrameRef {
    fn drop(&mut self) {
        if let Some(ledger) = self.ledger.take() {
            ledger.released.fetch_add(1, Ordering::AcqRel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::PixelFormat;

    fn frame() -> Arc<VideoFrame> {
        Arc::new(VideoFrame::from_packed(PixelFormat::Gray8, 1, 1, vec![vec![0]]).unwrap())
    }

    #[test]
    fn test_drop_releases() {
        let ledger = HandleLedger::new();
        {
            let _a = ledger.acquire(frame());
            let _b = ledger.acquire(frame());
            assert_eq!(ledger.snapshot().outstanding(), 2);
        }
        let snap = ledger.snapshot();
        assert_eq!(snap.acquired, 2);
        assert_eq!(snap.released, 2);
        assert!(snap.is_balanced());
    }

    #[test]
    fn test_transfer_is_not_a_release() {
        let ledger = HandleLedger::new();
        let handle = ledger.acquire(frame());
        assert!(handle.is_tracked());
        let _shared = handle.into_shared();

        let snap = ledger.snapshot();
        assert_eq!(snap.released, 0);
        assert_eq!(snap.transferred, 1);
        assert!(snap.is_balanced());
    }

    #[test]
    fn test_untracked_handle() {
        let handle = FrameRef::new(VideoFrame::from_packed(PixelFormat::Gray8, 1, 1, vec![vec![5]]).unwrap());
        assert!(!handle.is_tracked());
        assert_eq!(handle.plane(0).get(0, 0), 5);
    }
}
