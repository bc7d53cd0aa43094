use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "state changed, redraw" flag.
///
/// Machines raise it on every transition; the main loop takes it once
/// per iteration.
#[derive(Debug, Clone, Default)]
pub struct RenderSignal(Arc<AtomicBool>);

impl RenderSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns whether a redraw was requested and clears the flag
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}
