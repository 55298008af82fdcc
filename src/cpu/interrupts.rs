//! Interrupt dispatch (spec §4.7) and the cross-thread interrupt latch
//! (spec §5).
//!
//! `InterruptLatch` is the single point through which an external thread
//! (a keyboard poller, a timer) injects an interrupt vector without going
//! through `&mut Cpu`. It's a single atomic cell, not a queue: spec §5 is
//! explicit that a second request before the first is serviced either gets
//! coalesced or dropped, never buffered. The one piece of policy baked in
//! is that a pending keyboard interrupt (vector 9) is never overwritten by
//! a later timer interrupt (vector 8), so a held key can't be starved by a
//! free-running timer.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

const NO_PENDING: i32 = -1;
const KEYBOARD_VECTOR: u8 = 0x09;

#[derive(Clone)]
pub struct InterruptLatch {
    pending: Arc<AtomicI32>,
}

impl InterruptLatch {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(AtomicI32::new(NO_PENDING)),
        }
    }

    /// Request that `vector` be serviced. If a keyboard interrupt is
    /// already pending, a non-keyboard request is dropped rather than
    /// clobbering it; otherwise the new request wins (spec §5's documented
    /// priority policy, accepted as a benign race between the load and the
    /// store).
    pub fn request(&self, vector: u8) {
        let current = self.pending.load(Ordering::SeqCst);
        if current == KEYBOARD_VECTOR as i32 {
            return;
        }
        self.pending.store(vector as i32, Ordering::SeqCst);
    }

    /// Take the pending vector, if any, clearing the latch.
    pub fn take(&self) -> Option<u8> {
        let previous = self.pending.swap(NO_PENDING, Ordering::SeqCst);
        if previous == NO_PENDING {
            None
        } else {
            Some(previous as u8)
        }
    }
}

impl Default for InterruptLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_the_latch() {
        let latch = InterruptLatch::new();
        latch.request(0x21);
        assert_eq!(latch.take(), Some(0x21));
        assert_eq!(latch.take(), None);
    }

    #[test]
    fn keyboard_request_is_not_overwritten() {
        let latch = InterruptLatch::new();
        latch.request(KEYBOARD_VECTOR);
        latch.request(0x08); // timer tries to clobber it
        assert_eq!(latch.take(), Some(KEYBOARD_VECTOR));
    }

    #[test]
    fn non_keyboard_request_can_be_overwritten() {
        let latch = InterruptLatch::new();
        latch.request(0x08);
        latch.request(0x21);
        assert_eq!(latch.take(), Some(0x21));
    }
}
