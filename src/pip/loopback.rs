//! In-memory implementations of the host capabilities
//!
//! Useful for headless hosts, demos and tests: tracks are fed by hand,
//! surfaces keep a bounded queue of what they were given, and the
//! platform records every descriptor and controller it builds.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::media::{TimedMediaBuffer, VideoFrame};
use crate::registry::SinkError;
use crate::render::VideoSink;

use super::config::OverlaySize;
use super::error::PlatformError;
use super::observer::{PipObserver, RestoreCompletion};
use super::platform::{
    ContentSource, DisplaySurface, HostView, OverlayController, OverlayPlatform, SurfaceFactory,
    SurfaceSpec, TrackRegistry, VideoTrack,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A track whose frames are pushed by the caller
pub struct LoopbackTrack {
    id: String,
    sinks: Mutex<Vec<Arc<dyn VideoSink>>>,
}

impl LoopbackTrack {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sinks: Mutex::new(Vec::new()),
        }
    }

    /// Deliver a frame to every attached sink
    pub fn deliver(&self, frame: &VideoFrame) {
        let sinks: Vec<Arc<dyn VideoSink>> = lock(&self.sinks).clone();
        for sink in sinks {
            sink.on_frame(frame);
        }
    }

    /// Number of attached sinks
    pub fn sink_count(&self) -> usize {
        lock(&self.sinks).len()
    }
}

impl VideoTrack for LoopbackTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn add_sink(&self, sink: Arc<dyn VideoSink>) {
        let mut sinks = lock(&self.sinks);
        if !sinks
            .iter()
            .any(|s| std::ptr::addr_eq(Arc::as_ptr(s), Arc::as_ptr(&sink)))
        {
            sinks.push(sink);
        }
    }

    fn remove_sink(&self, sink: &Arc<dyn VideoSink>) {
        lock(&self.sinks).retain(|s| !std::ptr::addr_eq(Arc::as_ptr(s), Arc::as_ptr(sink)));
    }
}

/// Track registry keyed by stream id
#[derive(Default)]
pub struct LoopbackTracks {
    tracks: Mutex<HashMap<String, Arc<LoopbackTrack>>>,
}

impl LoopbackTracks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stream with one video track and return the track
    pub fn insert(&self, stream_id: impl Into<String>) -> Arc<LoopbackTrack> {
        let stream_id = stream_id.into();
        let track = Arc::new(LoopbackTrack::new(format!("{}-video", stream_id)));
        lock(&self.tracks).insert(stream_id, Arc::clone(&track));
        track
    }

    pub fn remove(&self, stream_id: &str) -> Option<Arc<LoopbackTrack>> {
        lock(&self.tracks).remove(stream_id)
    }
}

impl TrackRegistry for LoopbackTracks {
    fn lookup_video_track(&self, stream_id: &str) -> Option<Arc<dyn VideoTrack>> {
        lock(&self.tracks)
            .get(stream_id)
            .map(|t| Arc::clone(t) as Arc<dyn VideoTrack>)
    }
}

/// Bounded display queue that drops the oldest buffer when full
pub struct LoopbackSurface {
    capacity: usize,
    queue: Mutex<VecDeque<TimedMediaBuffer>>,
    dropped: AtomicU64,
    closed: AtomicBool,
}

impl LoopbackSurface {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            queue: Mutex::new(VecDeque::new()),
            dropped: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Buffers currently queued, oldest first
    pub fn queued(&self) -> Vec<TimedMediaBuffer> {
        lock(&self.queue).iter().cloned().collect()
    }

    /// Take every queued buffer
    pub fn drain(&self) -> Vec<TimedMediaBuffer> {
        lock(&self.queue).drain(..).collect()
    }

    /// Buffers replaced under backpressure
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Refuse further buffers
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl DisplaySurface for LoopbackSurface {
    fn enqueue(&self, buffer: TimedMediaBuffer) -> Result<(), SinkError> {
        if self.is_closed() {
            return Err(SinkError::Closed);
        }

        let mut queue = lock(&self.queue);
        if queue.len() >= self.capacity {
            queue.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(buffer);
        Ok(())
    }
}

/// Surface factory that remembers every surface it created
pub struct LoopbackSurfaces {
    capacity: usize,
    created: Mutex<Vec<(SurfaceSpec, Arc<LoopbackSurface>)>>,
}

impl LoopbackSurfaces {
    /// Surfaces hold at most `capacity` buffers
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            created: Mutex::new(Vec::new()),
        }
    }

    /// Every surface created so far, with the spec it was created for
    pub fn created(&self) -> Vec<(SurfaceSpec, Arc<LoopbackSurface>)> {
        lock(&self.created).clone()
    }

    /// The most recently created surface
    pub fn last(&self) -> Option<Arc<LoopbackSurface>> {
        lock(&self.created).last().map(|(_, s)| Arc::clone(s))
    }
}

impl Default for LoopbackSurfaces {
    fn default() -> Self {
        Self::new(8)
    }
}

impl SurfaceFactory for LoopbackSurfaces {
    fn create_surface(&self, spec: &SurfaceSpec) -> Arc<dyn DisplaySurface> {
        let surface = Arc::new(LoopbackSurface::new(self.capacity));
        lock(&self.created).push((*spec, Arc::clone(&surface)));
        surface
    }
}

/// Content descriptor tracking its attached surfaces
pub struct LoopbackContentSource {
    host: HostView,
    preferred_size: OverlaySize,
    surfaces: Mutex<Vec<Arc<dyn DisplaySurface>>>,
    released: AtomicBool,
}

impl LoopbackContentSource {
    pub fn host(&self) -> HostView {
        self.host
    }

    pub fn preferred_size(&self) -> OverlaySize {
        self.preferred_size
    }

    pub fn surface_count(&self) -> usize {
        lock(&self.surfaces).len()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl ContentSource for LoopbackContentSource {
    fn attach_surface(&self, surface: &Arc<dyn DisplaySurface>) {
        lock(&self.surfaces).push(Arc::clone(surface));
    }

    fn detach_surface(&self, surface: &Arc<dyn DisplaySurface>) {
        lock(&self.surfaces).retain(|s| !std::ptr::addr_eq(Arc::as_ptr(s), Arc::as_ptr(surface)));
    }

    fn release(&self) {
        self.released.store(true, Ordering::Release);
        lock(&self.surfaces).clear();
    }
}

/// Observable state of a loopback overlay controller
pub struct LoopbackControllerState {
    observer: Arc<dyn PipObserver>,
    auto_start: AtomicBool,
    showing: AtomicBool,
    starts: AtomicUsize,
    stops: AtomicUsize,
    restores: Arc<AtomicUsize>,
}

impl LoopbackControllerState {
    pub fn auto_start_from_inline(&self) -> bool {
        self.auto_start.load(Ordering::Acquire)
    }

    pub fn is_showing(&self) -> bool {
        self.showing.load(Ordering::Acquire)
    }

    /// Number of start requests
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::Acquire)
    }

    /// Number of stop requests
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::Acquire)
    }

    /// Number of completed UI restorations
    pub fn restores(&self) -> usize {
        self.restores.load(Ordering::Acquire)
    }

    /// Report a start failure the way a platform would
    pub fn fail_start(&self, error: PlatformError) {
        self.observer.on_failed_to_start(&error);
    }
}

struct LoopbackController {
    state: Arc<LoopbackControllerState>,
}

impl OverlayController for LoopbackController {
    fn set_auto_start_from_inline(&self, enabled: bool) {
        self.state.auto_start.store(enabled, Ordering::Release);
    }

    fn start(&self) {
        self.state.starts.fetch_add(1, Ordering::AcqRel);
        if self.state.showing.swap(true, Ordering::AcqRel) {
            return;
        }
        self.state.observer.on_will_start();
        self.state.observer.on_did_start();
    }

    fn stop(&self) {
        self.state.stops.fetch_add(1, Ordering::AcqRel);
        if !self.state.showing.swap(false, Ordering::AcqRel) {
            return;
        }
        self.state.observer.on_will_stop();
        let restores = Arc::clone(&self.state.restores);
        self.state
            .observer
            .on_restore_ui(RestoreCompletion::new(move |_| {
                restores.fetch_add(1, Ordering::AcqRel);
            }));
        self.state.observer.on_did_stop();
    }
}

/// Overlay platform that records what it builds
pub struct LoopbackPlatform {
    supported: AtomicBool,
    fail_controllers: AtomicBool,
    sources: Mutex<Vec<Arc<LoopbackContentSource>>>,
    controllers: Mutex<Vec<Arc<LoopbackControllerState>>>,
}

impl LoopbackPlatform {
    /// A platform with picture-in-picture support
    pub fn new() -> Self {
        Self {
            supported: AtomicBool::new(true),
            fail_controllers: AtomicBool::new(false),
            sources: Mutex::new(Vec::new()),
            controllers: Mutex::new(Vec::new()),
        }
    }

    /// A platform without picture-in-picture support
    pub fn unsupported() -> Self {
        let platform = Self::new();
        platform.supported.store(false, Ordering::Release);
        platform
    }

    /// Make controller construction fail
    pub fn fail_controllers(&self, fail: bool) {
        self.fail_controllers.store(fail, Ordering::Release);
    }

    /// Every content descriptor built so far
    pub fn content_sources(&self) -> Vec<Arc<LoopbackContentSource>> {
        lock(&self.sources).clone()
    }

    /// Every controller built so far
    pub fn controllers(&self) -> Vec<Arc<LoopbackControllerState>> {
        lock(&self.controllers).clone()
    }
}

impl Default for LoopbackPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayPlatform for LoopbackPlatform {
    fn is_supported(&self) -> bool {
        self.supported.load(Ordering::Acquire)
    }

    fn create_content_source(
        &self,
        host: &HostView,
        preferred_size: OverlaySize,
    ) -> Result<Arc<dyn ContentSource>, PlatformError> {
        let source = Arc::new(LoopbackContentSource {
            host: *host,
            preferred_size,
            surfaces: Mutex::new(Vec::new()),
            released: AtomicBool::new(false),
        });
        lock(&self.sources).push(Arc::clone(&source));
        Ok(source)
    }

    fn create_controller(
        &self,
        _source: &Arc<dyn ContentSource>,
        observer: Arc<dyn PipObserver>,
    ) -> Result<Box<dyn OverlayController>, PlatformError> {
        if self.fail_controllers.load(Ordering::Acquire) {
            return Err(PlatformError::new("overlay controller unavailable"));
        }

        let state = Arc::new(LoopbackControllerState {
            observer,
            auto_start: AtomicBool::new(false),
            showing: AtomicBool::new(false),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            restores: Arc::new(AtomicUsize::new(0)),
        });
        lock(&self.controllers).push(Arc::clone(&state));
        Ok(Box::new(LoopbackController { state }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{FormatDescription, PixelBuffer, PixelFormat, TimingInfo};
    use crate::pip::observer::NoopObserver;
    use crate::render::FrameConverter;

    fn buffer(seconds: f64) -> TimedMediaBuffer {
        let image = PixelBuffer::zeroed(PixelFormat::Nv12, 2, 2);
        let format = FormatDescription::for_pixel_buffer(&image).unwrap();
        TimedMediaBuffer::new(image, format, TimingInfo::from_capture_seconds(seconds)).unwrap()
    }

    #[test]
    fn test_surface_drops_oldest_when_full() {
        let surface = LoopbackSurface::new(2);

        for i in 0..3 {
            surface.enqueue(buffer(i as f64)).unwrap();
        }

        let queued: Vec<i64> = surface.queued().iter().map(|b| b.presentation_nanos()).collect();
        assert_eq!(queued, vec![1_000_000_000, 2_000_000_000]);
        assert_eq!(surface.dropped(), 1);

        assert_eq!(surface.drain().len(), 2);
        assert!(surface.queued().is_empty());
    }

    #[test]
    fn test_track_sink_identity() {
        let track = LoopbackTrack::new("t");
        let converter: Arc<dyn VideoSink> = Arc::new(FrameConverter::new());

        track.add_sink(Arc::clone(&converter));
        track.add_sink(Arc::clone(&converter));
        assert_eq!(track.sink_count(), 1);

        track.remove_sink(&converter);
        assert_eq!(track.sink_count(), 0);
    }

    #[test]
    fn test_track_registry_lookup() {
        let tracks = LoopbackTracks::new();
        tracks.insert("stream-1");

        let track = tracks.lookup_video_track("stream-1").unwrap();
        assert_eq!(track.id(), "stream-1-video");
        assert!(tracks.lookup_video_track("stream-2").is_none());

        tracks.remove("stream-1");
        assert!(tracks.lookup_video_track("stream-1").is_none());
    }

    #[test]
    fn test_controller_reports_lifecycle() {
        let platform = LoopbackPlatform::new();
        let source = platform
            .create_content_source(&HostView::new(1), OverlaySize::default())
            .unwrap();
        let controller = platform
            .create_controller(&source, Arc::new(NoopObserver))
            .unwrap();
        let state = platform.controllers().pop().unwrap();

        controller.start();
        assert!(state.is_showing());

        controller.stop();
        controller.stop();
        assert!(!state.is_showing());
        assert_eq!(state.starts(), 1);
        assert_eq!(state.stops(), 2);
        assert_eq!(state.restores(), 1);
    }
}
