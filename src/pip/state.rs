//! Session state machine
//!
//! Tracks the overlay session from `prepare` through `enable` to `disable`.
//! A generation counter, bumped by every `enable` and `disable`, lets
//! delayed continuations detect that they have been superseded.

use std::sync::Arc;

use crate::registry::SubscriberId;
use crate::render::{FrameConverter, VideoSink};

use super::platform::{ContentSource, DisplaySurface, HostView, OverlayController, VideoTrack};

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipPhase {
    /// No overlay resources attached to a track
    Disabled,
    /// Track attached, waiting for the settle delay before building the controller
    Preparing,
    /// Overlay controller exists; `start`/`stop` are honored
    Active,
}

/// Content descriptor built by `prepare`
pub(crate) struct OverlayContent {
    pub host: HostView,
    pub source: Arc<dyn ContentSource>,
}

/// Everything `enable` wires between a track and the overlay surface
pub(crate) struct TrackAttachment {
    pub track_id: String,
    pub track: Arc<dyn VideoTrack>,
    pub converter: Arc<FrameConverter>,
    /// The converter as registered on the track
    pub sink: Arc<dyn VideoSink>,
    pub subscriber: SubscriberId,
    pub surface: Arc<dyn DisplaySurface>,
}

/// Resources taken out of a session, released after the teardown delay
///
/// Dropping a teardown that has not run runs it, so the track is still
/// unwired when the task holding it is cancelled at runtime shutdown.
pub(crate) struct Teardown {
    pub generation: u64,
    pub controller: Option<Box<dyn OverlayController>>,
    pub attachment: Option<TrackAttachment>,
    pub source: Option<Arc<dyn ContentSource>>,
}

impl Teardown {
    /// Stop the overlay and unwire the track, surface and converter
    pub fn run(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(controller) = self.controller.take() {
            controller.set_auto_start_from_inline(false);
            controller.stop();
        }

        if let Some(attachment) = self.attachment.take() {
            attachment.track.remove_sink(&attachment.sink);
            attachment.converter.unsubscribe(attachment.subscriber);
            if let Some(source) = &self.source {
                source.detach_surface(&attachment.surface);
            }

            let stats = attachment.converter.stats();
            tracing::info!(
                track = %attachment.track_id,
                generation = self.generation,
                frames = stats.frames_received,
                dropped = stats.frames_dropped(),
                "Overlay detached from track"
            );
        }
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        self.release();
    }
}

/// Complete session state
pub(crate) struct SessionState {
    pub phase: PipPhase,
    pub generation: u64,
    pub content: Option<OverlayContent>,
    pub attachment: Option<TrackAttachment>,
    pub controller: Option<Box<dyn OverlayController>>,
    /// Deferred teardowns that have not finished yet
    pub pending_teardowns: usize,
    /// Replaced descriptors held until pending teardowns finish
    pub retired: Vec<Arc<dyn ContentSource>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: PipPhase::Disabled,
            generation: 0,
            content: None,
            attachment: None,
            controller: None,
            pending_teardowns: 0,
            retired: Vec::new(),
        }
    }

    /// Invalidate pending continuations and return the new generation
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Whether a continuation captured at `generation` may still act
    pub fn is_current(&self, generation: u64, phase: PipPhase) -> bool {
        self.generation == generation && self.phase == phase
    }

    pub fn track_id(&self) -> Option<&str> {
        self.attachment.as_ref().map(|a| a.track_id.as_str())
    }

    /// Move all track and overlay resources out and return to `Disabled`
    ///
    /// The content descriptor stays, so the session can be enabled again
    /// without another `prepare`.
    pub fn take_teardown(&mut self) -> Teardown {
        self.phase = PipPhase::Disabled;
        Teardown {
            generation: self.generation,
            controller: self.controller.take(),
            attachment: self.attachment.take(),
            source: self.content.as_ref().map(|c| Arc::clone(&c.source)),
        }
    }

    /// Install a new content descriptor and release the one it replaces
    ///
    /// A pending teardown's controller may still be bound to the old
    /// descriptor, so its release waits for [`finish_teardown`](Self::finish_teardown).
    /// Returns the replaced descriptor's host view.
    pub fn replace_content(&mut self, content: OverlayContent) -> Option<HostView> {
        let previous = self.content.replace(content)?;
        if self.pending_teardowns > 0 {
            self.retired.push(previous.source);
        } else {
            previous.source.release();
        }
        Some(previous.host)
    }

    /// Record that a deferred teardown has run
    ///
    /// Returns the retired descriptors that are now safe to release.
    pub fn finish_teardown(&mut self) -> Vec<Arc<dyn ContentSource>> {
        self.pending_teardowns = self.pending_teardowns.saturating_sub(1);
        if self.pending_teardowns == 0 {
            std::mem::take(&mut self.retired)
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pip::config::OverlaySize;
    use crate::pip::loopback::LoopbackPlatform;
    use crate::pip::platform::OverlayPlatform;

    fn content(platform: &LoopbackPlatform, host: u64) -> OverlayContent {
        let host = HostView::new(host);
        let source = platform
            .create_content_source(&host, OverlaySize::default())
            .unwrap();
        OverlayContent { host, source }
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::new();

        assert_eq!(state.phase, PipPhase::Disabled);
        assert_eq!(state.generation, 0);
        assert!(state.content.is_none());
        assert!(state.track_id().is_none());
        assert_eq!(state.pending_teardowns, 0);
    }

    #[test]
    fn test_generation_invalidates() {
        let mut state = SessionState::new();

        let first = state.next_generation();
        state.phase = PipPhase::Preparing;
        assert!(state.is_current(first, PipPhase::Preparing));

        let second = state.next_generation();
        assert!(second > first);
        assert!(!state.is_current(first, PipPhase::Preparing));
        assert!(!state.is_current(second, PipPhase::Active));
    }

    #[test]
    fn test_take_teardown_resets_phase() {
        let mut state = SessionState::new();
        state.phase = PipPhase::Active;
        state.next_generation();

        let teardown = state.take_teardown();

        assert_eq!(state.phase, PipPhase::Disabled);
        assert_eq!(teardown.generation, 1);
        assert!(teardown.controller.is_none());
        assert!(teardown.attachment.is_none());
        teardown.run();
    }

    #[test]
    fn test_replace_content_releases_at_once_when_idle() {
        let platform = LoopbackPlatform::new();
        let mut state = SessionState::new();

        assert_eq!(state.replace_content(content(&platform, 1)), None);
        assert_eq!(state.replace_content(content(&platform, 2)), Some(HostView::new(1)));

        let sources = platform.content_sources();
        assert!(sources[0].is_released());
        assert!(!sources[1].is_released());
        assert!(state.retired.is_empty());
    }

    #[test]
    fn test_replace_content_waits_for_pending_teardowns() {
        let platform = LoopbackPlatform::new();
        let mut state = SessionState::new();
        state.replace_content(content(&platform, 1));

        state.pending_teardowns = 2;
        state.replace_content(content(&platform, 2));
        assert!(!platform.content_sources()[0].is_released());

        // The first teardown to finish leaves one still pending
        assert!(state.finish_teardown().is_empty());

        let released = state.finish_teardown();
        assert_eq!(released.len(), 1);
        assert_eq!(state.pending_teardowns, 0);
        assert!(state.retired.is_empty());
    }
}
