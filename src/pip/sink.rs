//! Subscriber feeding the overlay display surface

use std::sync::Arc;

use crate::media::{DisplayOrientation, ScaleFactor, TimedMediaBuffer};
use crate::registry::{BufferSubscriber, SinkError};

use super::platform::DisplaySurface;

/// Enqueues every buffer into the overlay surface, stamped with its orientation
pub struct OverlaySink {
    surface: Arc<dyn DisplaySurface>,
}

impl OverlaySink {
    pub fn new(surface: Arc<dyn DisplaySurface>) -> Self {
        Self { surface }
    }
}

impl BufferSubscriber for OverlaySink {
    fn on_buffer(
        &self,
        buffer: &TimedMediaBuffer,
        orientation: DisplayOrientation,
        _scale: ScaleFactor,
    ) -> Result<(), SinkError> {
        let mut buffer = buffer.clone();
        buffer.set_orientation(orientation);
        self.surface.enqueue(buffer)
    }
}
