//! On-screen performance readout.

use crate::time::FrameRate;

/// Snapshot handed to the surface when the overlay is visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStats {
    pub fps: f32,
    pub active: usize,
    pub settled: usize,
    pub frozen: usize,
}

impl std::fmt::Display for OverlayStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.0} fps | active {} | settled {} | frozen {}",
            self.fps, self.active, self.settled, self.frozen
        )
    }
}

/// Smoothed frame rate and population counts, tracked only while shown.
#[derive(Debug, Clone, Default)]
pub struct PerfOverlay {
    visible: bool,
    rate: FrameRate,
}

impl PerfOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            // Stale timestamps would report a bogus first rate.
            self.rate.reset();
        }
        self.visible = visible;
    }

    pub fn toggle(&mut self) -> bool {
        self.set_visible(!self.visible);
        self.visible
    }

    /// Record a rendered frame. Returns `None` while hidden.
    pub fn sample(&mut self, now_ms: f64, active: usize, settled: usize, frozen: usize) -> Option<OverlayStats> {
        if !self.visible {
            return None;
        }
        let fps = self.rate.sample(now_ms);
        Some(OverlayStats {
            fps,
            active,
            settled,
            frozen,
        })
    }
}
