//! Picture-in-picture session configuration

use std::time::Duration;

/// Preferred overlay width in logical units
pub const DEFAULT_OVERLAY_WIDTH: f64 = 140.0;

/// Preferred overlay height in logical units
pub const DEFAULT_OVERLAY_HEIGHT: f64 = 240.0;

/// Wait before the overlay controller is built, so host layout can settle
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Wait before a disabled session's resources are torn down
pub const DEFAULT_TEARDOWN_DELAY: Duration = Duration::from_millis(500);

/// Overlay size in logical (point) units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySize {
    pub width: f64,
    pub height: f64,
}

impl OverlaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for OverlaySize {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLAY_WIDTH, DEFAULT_OVERLAY_HEIGHT)
    }
}

/// Session configuration options
#[derive(Debug, Clone)]
pub struct PipConfig {
    /// Preferred content size of the overlay
    pub preferred_size: OverlaySize,

    /// Delay between `enable` and building the overlay controller
    pub settle_delay: Duration,

    /// Delay between `disable` and releasing the session's resources
    pub teardown_delay: Duration,

    /// Let the platform enter PIP automatically when the host goes inline
    pub auto_start_from_inline: bool,

    /// Mirror the overlay surface horizontally (front-camera style)
    pub mirror_overlay: bool,
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            preferred_size: OverlaySize::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            teardown_delay: DEFAULT_TEARDOWN_DELAY,
            auto_start_from_inline: true,
            mirror_overlay: true,
        }
    }
}

impl PipConfig {
    /// Set the preferred overlay size
    pub fn preferred_size(mut self, size: OverlaySize) -> Self {
        self.preferred_size = size;
        self
    }

    /// Set the settle delay
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the teardown delay
    pub fn teardown_delay(mut self, delay: Duration) -> Self {
        self.teardown_delay = delay;
        self
    }

    /// Disable automatic start from inline
    pub fn disable_auto_start(mut self) -> Self {
        self.auto_start_from_inline = false;
        self
    }

    /// Render the overlay without mirroring
    pub fn unmirrored(mut self) -> Self {
        self.mirror_overlay = false;
        self
    }
}
