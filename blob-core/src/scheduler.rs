//! Frame scheduling seam between the engine and its host.
//!
//! The engine asks for at most one tick at a time. When the host's display
//! refresh fires it calls [`crate::engine::Engine::tick`] with the elapsed
//! time; the engine then updates, renders and asks for the next tick.

use std::cell::RefCell;
use std::rc::Rc;

/// Opaque handle of a requested tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

pub trait FrameScheduler {
    /// Asks the host for one more frame callback.
    fn request_tick(&mut self) -> TickHandle;

    /// Withdraws a request made with [`FrameScheduler::request_tick`].
    fn cancel_tick(&mut self, handle: TickHandle);
}

#[derive(Debug, Default)]
struct ManualState {
    next: u64,
    pending: Vec<TickHandle>,
    requested: usize,
    cancelled: usize,
}

/// A scheduler that only records requests.
///
/// Clones share state, so a test can keep one clone while the engine owns
/// another, and drive frames by hand.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that have been neither cancelled nor taken.
    pub fn pending(&self) -> Vec<TickHandle> {
        self.state.borrow().pending.clone()
    }

    /// Removes and returns the oldest pending request, as a host does when it
    /// fires the callback.
    pub fn take_next(&self) -> Option<TickHandle> {
        let mut state = self.state.borrow_mut();
        if state.pending.is_empty() {
            None
        } else {
            Some(state.pending.remove(0))
        }
    }

    pub fn requested(&self) -> usize {
        self.state.borrow().requested
    }

    pub fn cancelled(&self) -> usize {
        self.state.borrow().cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_tick(&mut self) -> TickHandle {
        let mut state = self.state.borrow_mut();
        let handle = TickHandle(state.next);
        state.next += 1;
        state.requested += 1;
        state.pending.push(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        let mut state = self.state.borrow_mut();
        let before = state.pending.len();
        state.pending.retain(|&h| h != handle);
        if state.pending.len() != before {
            state.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_and_cancel_are_tracked() {
        let observer = ManualScheduler::new();
        let mut scheduler = observer.clone();

        let a = scheduler.request_tick();
        let b = scheduler.request_tick();
        assert_ne!(a, b);
        assert_eq!(observer.pending(), vec![a, b]);

        scheduler.cancel_tick(a);
        assert_eq!(observer.pending(), vec![b]);
        assert_eq!(observer.requested(), 2);
        assert_eq!(observer.cancelled(), 1);

        // Cancelling twice is a no-op.
        scheduler.cancel_tick(a);
        assert_eq!(observer.cancelled(), 1);
    }

    #[test]
    fn take_next_pops_in_order() {
        let observer = ManualScheduler::new();
        let mut scheduler = observer.clone();
        let a = scheduler.request_tick();
        let b = scheduler.request_tick();

        assert_eq!(observer.take_next(), Some(a));
        assert_eq!(observer.take_next(), Some(b));
        assert_eq!(observer.take_next(), None);
    }
}
