//! Caller-side re-entrancy gate for frame processing.

use std::sync::atomic::{AtomicBool, Ordering};

/// In-flight flag that admits at most one frame at a time.
///
/// Capture callbacks call [`FrameGate::try_enter`] and drop the frame when it
/// returns `None`. The returned guard clears the flag when dropped, including
/// on early return.
#[derive(Debug, Default)]
pub struct FrameGate {
    in_flight: AtomicBool,
}

impl FrameGate {
    /// Creates an idle gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the gate, or returns `None` if a frame is already in flight.
    pub fn try_enter(&self) -> Option<FrameGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| FrameGuard { gate: self })
    }

    /// Returns whether a frame is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Holds the gate for the duration of one frame.
#[derive(Debug)]
pub struct FrameGuard<'a> {
    gate: &'a FrameGate,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::Release);
    }
}
