//! Overlay lifecycle notifications
//!
//! Hooks are pure notifications: none of them changes session state. All
//! methods have no-op defaults so hosts implement only what they need.

use std::sync::Arc;

use super::error::PlatformError;

/// One-shot signal that the host finished restoring its UI
///
/// The platform waits for this before finishing its restore animation. If
/// it is dropped without being called, it fires with `true`.
pub struct RestoreCompletion {
    handler: Option<Box<dyn FnOnce(bool) + Send>>,
}

impl RestoreCompletion {
    pub fn new(handler: impl FnOnce(bool) + Send + 'static) -> Self {
        Self {
            handler: Some(Box::new(handler)),
        }
    }

    /// Signal completion
    pub fn complete(mut self, restored: bool) {
        if let Some(handler) = self.handler.take() {
            handler(restored);
        }
    }
}

impl Drop for RestoreCompletion {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler(true);
        }
    }
}

impl std::fmt::Debug for RestoreCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestoreCompletion")
            .field("pending", &self.handler.is_some())
            .finish()
    }
}

/// Observer of overlay lifecycle events
pub trait PipObserver: Send + Sync {
    fn on_failed_to_start(&self, _error: &PlatformError) {}

    fn on_will_start(&self) {}

    fn on_did_start(&self) {}

    fn on_will_stop(&self) {}

    fn on_did_stop(&self) {}

    /// Restore the host UI after the overlay stops
    fn on_restore_ui(&self, completion: RestoreCompletion) {
        completion.complete(true);
    }
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipObserver for NoopObserver {}

/// Traces each event, then forwards it to the host observer
pub(crate) struct ObserverRelay {
    observer: Arc<dyn PipObserver>,
}

impl ObserverRelay {
    pub(crate) fn new(observer: Arc<dyn PipObserver>) -> Self {
        Self { observer }
    }
}

impl PipObserver for ObserverRelay {
    fn on_failed_to_start(&self, error: &PlatformError) {
        tracing::warn!(error = %error, "Overlay failed to start");
        self.observer.on_failed_to_start(error);
    }

    fn on_will_start(&self) {
        tracing::debug!("Overlay will start");
        self.observer.on_will_start();
    }

    fn on_did_start(&self) {
        tracing::info!("Overlay started");
        self.observer.on_did_start();
    }

    fn on_will_stop(&self) {
        tracing::debug!("Overlay will stop");
        self.observer.on_will_stop();
    }

    fn on_did_stop(&self) {
        tracing::info!("Overlay stopped");
        self.observer.on_did_stop();
    }

    fn on_restore_ui(&self, completion: RestoreCompletion) {
        tracing::debug!("Restoring host UI");
        self.observer.on_restore_ui(completion);
    }
}
