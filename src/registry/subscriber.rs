//! Subscriber identity and callback contract

use std::sync::Arc;

use crate::media::{DisplayOrientation, ScaleFactor, TimedMediaBuffer};

use super::error::SinkError;

/// Identity of an attached subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(super) u64);

impl SubscriberId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A sink receiving every converted buffer
///
/// Called synchronously on the frame-delivery thread. Implementations must
/// not block; a sink that cannot keep up should drop and return
/// [`SinkError::Full`].
pub trait BufferSubscriber: Send + Sync {
    fn on_buffer(
        &self,
        buffer: &TimedMediaBuffer,
        orientation: DisplayOrientation,
        scale: ScaleFactor,
    ) -> Result<(), SinkError>;
}

/// Closure adapter for [`BufferSubscriber`]
pub struct FnSubscriber<F>(F);

impl<F> BufferSubscriber for FnSubscriber<F>
where
    F: Fn(&TimedMediaBuffer, DisplayOrientation, ScaleFactor) -> Result<(), SinkError>
        + Send
        + Sync,
{
    fn on_buffer(
        &self,
        buffer: &TimedMediaBuffer,
        orientation: DisplayOrientation,
        scale: ScaleFactor,
    ) -> Result<(), SinkError> {
        (self.0)(buffer, orientation, scale)
    }
}

/// Wrap a closure as a shareable subscriber
pub fn subscriber_fn<F>(f: F) -> Arc<dyn BufferSubscriber>
where
    F: Fn(&TimedMediaBuffer, DisplayOrientation, ScaleFactor) -> Result<(), SinkError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnSubscriber(f))
}
