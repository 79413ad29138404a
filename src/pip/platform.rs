//! Host capabilities the session manager is built on
//!
//! Everything outside the core is reached through these traits: the RTC
//! track registry, the platform overlay API, and the display surfaces the
//! overlay renders into. Hosts inject implementations when constructing a
//! [`PipSessionManager`](super::PipSessionManager).

use std::sync::Arc;

use crate::media::TimedMediaBuffer;
use crate::registry::SinkError;
use crate::render::VideoSink;

use super::config::OverlaySize;
use super::error::PlatformError;
use super::observer::PipObserver;

/// Opaque handle to the host view the overlay animates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostView(u64);

impl HostView {
    pub fn new(handle: u64) -> Self {
        Self(handle)
    }

    pub fn handle(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for HostView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

/// A live video track from the RTC pipeline
pub trait VideoTrack: Send + Sync {
    /// Track identifier
    fn id(&self) -> &str;

    /// Start delivering frames to `sink`
    fn add_sink(&self, sink: Arc<dyn VideoSink>);

    /// Stop delivering frames to `sink` (matched by pointer identity)
    fn remove_sink(&self, sink: &Arc<dyn VideoSink>);
}

/// Lookup of video tracks by stream id
pub trait TrackRegistry: Send + Sync {
    /// First video track of the given stream, if any
    fn lookup_video_track(&self, stream_id: &str) -> Option<Arc<dyn VideoTrack>>;
}

/// Parameters for a new display surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSpec {
    /// Frame of the surface inside the overlay
    pub size: OverlaySize,
    /// Flip horizontally
    pub mirrored: bool,
}

/// A surface that renders timed buffers
pub trait DisplaySurface: Send + Sync {
    /// Queue a buffer for display
    ///
    /// Called on the frame thread. Must not block: under backpressure the
    /// surface drops or replaces queued buffers instead of stalling.
    fn enqueue(&self, buffer: TimedMediaBuffer) -> Result<(), SinkError>;
}

/// Creates display surfaces for overlay sessions
pub trait SurfaceFactory: Send + Sync {
    fn create_surface(&self, spec: &SurfaceSpec) -> Arc<dyn DisplaySurface>;
}

/// The overlay content descriptor bound to a host view
pub trait ContentSource: Send + Sync {
    /// Add a surface to the overlay's content view
    fn attach_surface(&self, surface: &Arc<dyn DisplaySurface>);

    /// Remove a surface from the overlay's content view
    fn detach_surface(&self, surface: &Arc<dyn DisplaySurface>);

    /// Free platform resources held by the descriptor
    fn release(&self);
}

/// Platform overlay controller for one content source
pub trait OverlayController: Send + Sync {
    fn set_auto_start_from_inline(&self, enabled: bool);

    /// Ask the platform to show the overlay
    fn start(&self);

    /// Ask the platform to hide the overlay
    fn stop(&self);
}

/// The platform picture-in-picture API
pub trait OverlayPlatform: Send + Sync {
    /// Whether picture-in-picture is available at all
    fn is_supported(&self) -> bool;

    /// Build a content descriptor bound to `host`
    fn create_content_source(
        &self,
        host: &HostView,
        preferred_size: OverlaySize,
    ) -> Result<Arc<dyn ContentSource>, PlatformError>;

    /// Build a controller for `source`, reporting lifecycle events to `observer`
    fn create_controller(
        &self,
        source: &Arc<dyn ContentSource>,
        observer: Arc<dyn PipObserver>,
    ) -> Result<Box<dyn OverlayController>, PlatformError>;
}
