//! Animation-frame scheduling.
//!
//! The host owns the real frame source (display refresh, a timer, a test
//! loop). The editor only requests and cancels frames; the host delivers
//! each due handle back through `VideoEditor::on_animation_frame`.

use std::cell::RefCell;
use std::rc::Rc;

use cutframe_editor_state::FrameHandle;

/// Requests and cancels animation-frame callbacks.
pub trait FrameScheduler {
    /// Request one callback on the next available frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a pending request. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct QueueInner {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

/// Single-threaded, host-pumped frame scheduler.
///
/// Clones share the same queue: the editor keeps one handle to request
/// frames, the driver keeps another to [`FrameQueue::take_due`] them.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every pending handle, oldest first.
    pub fn take_due(&self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.inner.borrow_mut().pending)
    }

    pub fn pending(&self) -> Vec<FrameHandle> {
        self.inner.borrow().pending.clone()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.inner.borrow().pending.is_empty()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let handle = FrameHandle(inner.next_id);
        inner.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.inner.borrow_mut().pending.retain(|h| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique_and_cancellable() {
        let driver = FrameQueue::new();
        let mut scheduler = driver.clone();

        let a = scheduler.request_frame();
        let b = scheduler.request_frame();
        assert_ne!(a, b);
        assert_eq!(driver.pending_count(), 2);

        scheduler.cancel_frame(a);
        assert_eq!(driver.pending(), vec![b]);

        assert_eq!(driver.take_due(), vec![b]);
        assert!(driver.is_idle());

        // cancelling something already delivered is harmless
        scheduler.cancel_frame(b);
        assert!(driver.is_idle());
    }
}
