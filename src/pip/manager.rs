//! Picture-in-picture session manager
//!
//! Owns the single overlay session of a host: the content descriptor built
//! by `prepare`, the converter and surface wired to a track by `enable`,
//! and the platform controller built once the settle delay has passed.
//!
//! Control operations serialize on the session lock. The frame path never
//! takes it: frames flow track → converter → overlay sink → surface.
//!
//! ```text
//!  enable(t) ──► attach sink ──► [settle delay] ──► gen == g? ──► controller, Active
//!                                                      │ no
//!                                                      └──► drop (superseded)
//!  disable(t) ─► gen += 1, take resources, Disabled ──► [teardown delay] ──► release
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::render::{FrameConverter, VideoSink};

use super::config::PipConfig;
use super::error::{PipError, PlatformError};
use super::observer::{NoopObserver, ObserverRelay, PipObserver};
use super::platform::{HostView, OverlayPlatform, SurfaceFactory, SurfaceSpec, TrackRegistry};
use super::sink::OverlaySink;
use super::state::{OverlayContent, PipPhase, SessionState, TrackAttachment};

/// External capabilities a session manager is built on
#[derive(Clone)]
pub struct PipCapabilities {
    pub tracks: Arc<dyn TrackRegistry>,
    pub platform: Arc<dyn OverlayPlatform>,
    pub surfaces: Arc<dyn SurfaceFactory>,
    pub observer: Arc<dyn PipObserver>,
}

impl PipCapabilities {
    /// Capabilities with a no-op observer
    pub fn new(
        tracks: Arc<dyn TrackRegistry>,
        platform: Arc<dyn OverlayPlatform>,
        surfaces: Arc<dyn SurfaceFactory>,
    ) -> Self {
        Self {
            tracks,
            platform,
            surfaces,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Set the host observer
    pub fn observer(mut self, observer: Arc<dyn PipObserver>) -> Self {
        self.observer = observer;
        self
    }
}

struct Inner {
    config: PipConfig,
    caps: PipCapabilities,
    session: Mutex<SessionState>,
}

/// Picture-in-picture session manager
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct PipSessionManager {
    inner: Arc<Inner>,
}

impl PipSessionManager {
    /// Create a manager with the default configuration
    pub fn new(caps: PipCapabilities) -> Self {
        Self::with_config(PipConfig::default(), caps)
    }

    /// Create a manager with custom configuration
    pub fn with_config(config: PipConfig, caps: PipCapabilities) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                caps,
                session: Mutex::new(SessionState::new()),
            }),
        }
    }

    /// Get the session configuration
    pub fn config(&self) -> &PipConfig {
        &self.inner.config
    }

    /// Bind the overlay content to a host view
    ///
    /// Replaces any previous descriptor. Only allowed while the session is
    /// disabled. The old descriptor is released at once, or once every
    /// pending teardown has stopped the controllers bound to it.
    pub async fn prepare(&self, host: HostView) -> Result<(), PipError> {
        let mut session = self.inner.session.lock().await;

        if session.phase != PipPhase::Disabled {
            tracing::warn!(host = %host, phase = ?session.phase, "Prepare rejected, session enabled");
            return Err(PipError::SessionBusy(session.phase));
        }

        let source = self
            .inner
            .caps
            .platform
            .create_content_source(&host, self.inner.config.preferred_size)?;

        if let Some(previous) = session.replace_content(OverlayContent { host, source }) {
            tracing::debug!(
                previous = %previous,
                host = %host,
                deferred = session.pending_teardowns > 0,
                "Replaced previous overlay content"
            );
        }

        tracing::info!(
            host = %host,
            width = self.inner.config.preferred_size.width,
            height = self.inner.config.preferred_size.height,
            "Overlay content prepared"
        );
        Ok(())
    }

    /// Attach the overlay to the first video track of `stream_id`
    ///
    /// The track starts feeding the overlay surface at once; the platform
    /// controller is built after the settle delay, at which point the
    /// session becomes [`PipPhase::Active`].
    pub async fn enable(&self, stream_id: &str) -> Result<(), PipError> {
        let caps = &self.inner.caps;
        let config = &self.inner.config;
        let mut session = self.inner.session.lock().await;

        if session.phase != PipPhase::Disabled {
            tracing::debug!(stream = stream_id, phase = ?session.phase, "Enable ignored, already enabled");
            return Err(PipError::AlreadyEnabled(session.phase));
        }

        if !caps.platform.is_supported() {
            tracing::warn!(stream = stream_id, "Picture-in-picture not supported");
            return Err(PipError::NotSupported);
        }

        let source = match session.content.as_ref() {
            Some(content) => Arc::clone(&content.source),
            None => {
                tracing::warn!(stream = stream_id, "Enable before prepare");
                return Err(PipError::NotPrepared);
            }
        };

        let track = caps.tracks.lookup_video_track(stream_id).ok_or_else(|| {
            tracing::warn!(stream = stream_id, "Video track not found");
            PipError::TrackNotFound(stream_id.to_string())
        })?;

        let surface = caps.surfaces.create_surface(&SurfaceSpec {
            size: config.preferred_size,
            mirrored: config.mirror_overlay,
        });
        source.attach_surface(&surface);

        let converter = Arc::new(FrameConverter::new());
        let subscriber = converter.subscribe(Arc::new(OverlaySink::new(Arc::clone(&surface))));
        let sink: Arc<dyn VideoSink> = converter.clone();
        track.add_sink(Arc::clone(&sink));

        let generation = session.next_generation();
        session.phase = PipPhase::Preparing;
        session.attachment = Some(TrackAttachment {
            track_id: stream_id.to_string(),
            track,
            converter,
            sink,
            subscriber,
            surface,
        });

        tracing::info!(
            stream = stream_id,
            generation = generation,
            settle_ms = config.settle_delay.as_millis() as u64,
            "Overlay attached to track, waiting for layout to settle"
        );

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.config.settle_delay).await;
            inner.activate(generation).await;
        });

        Ok(())
    }

    /// Detach the overlay from its track and return to `Disabled`
    ///
    /// The session is `Disabled` as soon as this returns and any pending
    /// activation is cancelled. The overlay is stopped and its resources
    /// are released after the teardown delay.
    pub async fn disable(&self, stream_id: &str) -> Result<(), PipError> {
        let mut session = self.inner.session.lock().await;

        if session.phase == PipPhase::Disabled {
            tracing::debug!(stream = stream_id, "Disable ignored, already disabled");
            return Ok(());
        }

        if let Some(attached) = session.track_id() {
            if attached != stream_id {
                tracing::warn!(
                    stream = stream_id,
                    attached = attached,
                    "Disable for a different stream, detaching the attached one"
                );
            }
        }

        let generation = session.next_generation();
        let teardown = session.take_teardown();
        session.pending_teardowns += 1;
        drop(session);

        tracing::info!(stream = stream_id, generation = generation, "Overlay disabled");

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.config.teardown_delay).await;
            teardown.run();
            inner.finish_teardown(generation).await;
        });

        Ok(())
    }

    /// Ask the platform to show the overlay
    pub async fn start(&self) -> Result<(), PipError> {
        let session = self.inner.session.lock().await;

        match session.controller.as_ref() {
            Some(controller) => {
                controller.start();
                tracing::debug!(generation = session.generation, "Overlay start requested");
                Ok(())
            }
            None => {
                tracing::debug!(phase = ?session.phase, "Start ignored, no overlay controller");
                Err(PipError::NotActive)
            }
        }
    }

    /// Ask the platform to hide the overlay; a no-op unless active
    pub async fn stop(&self) -> Result<(), PipError> {
        let session = self.inner.session.lock().await;

        if let Some(controller) = session.controller.as_ref() {
            controller.stop();
            tracing::debug!(generation = session.generation, "Overlay stop requested");
        }
        Ok(())
    }

    /// Current phase
    pub async fn phase(&self) -> PipPhase {
        self.inner.session.lock().await.phase
    }

    /// Whether the overlay controller exists
    pub async fn is_active(&self) -> bool {
        self.phase().await == PipPhase::Active
    }

    /// Stream the overlay is attached to, if enabled
    pub async fn track_id(&self) -> Option<String> {
        self.inner.session.lock().await.track_id().map(str::to_string)
    }

    /// Host view the current content descriptor is bound to
    pub async fn host_view(&self) -> Option<HostView> {
        self.inner.session.lock().await.content.as_ref().map(|c| c.host)
    }

    /// Session generation; increments on every `enable` and `disable`
    pub async fn generation(&self) -> u64 {
        self.inner.session.lock().await.generation
    }

    /// Converter feeding the overlay, if enabled
    ///
    /// Hosts use it to report frame size changes (`set_size`), to read
    /// conversion stats, or to attach additional buffer subscribers.
    pub async fn converter(&self) -> Option<Arc<FrameConverter>> {
        self.inner
            .session
            .lock()
            .await
            .attachment
            .as_ref()
            .map(|a| Arc::clone(&a.converter))
    }
}

impl Inner {
    /// Release descriptors replaced while teardowns were pending
    async fn finish_teardown(&self, generation: u64) {
        let retired = self.session.lock().await.finish_teardown();
        if !retired.is_empty() {
            tracing::debug!(
                generation = generation,
                count = retired.len(),
                "Releasing retired overlay content"
            );
        }
        for source in retired {
            source.release();
        }
    }

    /// Settle-delay continuation of `enable`
    async fn activate(&self, generation: u64) {
        let mut session = self.session.lock().await;

        if !session.is_current(generation, PipPhase::Preparing) {
            tracing::debug!(
                generation = generation,
                current = session.generation,
                phase = ?session.phase,
                "Skipping superseded activation"
            );
            return;
        }

        let result = match session.content.as_ref() {
            Some(content) => {
                let relay: Arc<dyn PipObserver> =
                    Arc::new(ObserverRelay::new(Arc::clone(&self.caps.observer)));
                self.caps.platform.create_controller(&content.source, relay)
            }
            None => Err(PlatformError::new("overlay content released")),
        };

        match result {
            Ok(controller) => {
                controller.set_auto_start_from_inline(self.config.auto_start_from_inline);
                session.controller = Some(controller);
                session.phase = PipPhase::Active;
                tracing::info!(
                    stream = session.track_id().unwrap_or_default(),
                    generation = generation,
                    "Overlay active"
                );
            }
            Err(e) => {
                tracing::error!(generation = generation, error = %e, "Failed to create overlay controller");
                session.next_generation();
                let teardown = session.take_teardown();
                drop(session);
                teardown.run();
                self.caps.observer.on_failed_to_start(&e);
            }
        }
    }
}
