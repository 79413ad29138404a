//! Frame to timed-buffer conversion
//!
//! The per-frame hot path. [`FrameConverter`] is attached to a track as a
//! [`VideoSink`]; for every frame it builds a [`TimedMediaBuffer`], tags it
//! for immediate display, and fans it out through its
//! [`SubscriberRegistry`]. Failures drop the frame and are only counted and
//! traced; nothing propagates back into the frame-delivery thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::media::{
    ConversionError, DisplayOrientation, FormatDescription, ScaleFactor, Size, TimedMediaBuffer,
    TimingInfo, VideoFrame,
};
use crate::registry::{BufferSubscriber, SubscriberId, SubscriberRegistry};
use crate::stats::{RenderCounters, RenderStats};

use super::sink::VideoSink;

/// Result of converting one frame
#[derive(Debug, Clone)]
pub struct ConvertedFrame {
    /// The display-ready buffer
    pub buffer: TimedMediaBuffer,
    /// Orientation derived from the frame's rotation
    pub orientation: DisplayOrientation,
    /// Scale factor last set through [`FrameConverter::set_size`]
    pub scale: ScaleFactor,
}

/// Converts frames into timed buffers and dispatches them to subscribers
pub struct FrameConverter {
    subscribers: SubscriberRegistry,
    /// `ScaleFactor` as raw f64 bits
    scale_bits: AtomicU64,
    counters: RenderCounters,
}

impl FrameConverter {
    /// Create a converter with no subscribers and a unit scale factor
    pub fn new() -> Self {
        Self {
            subscribers: SubscriberRegistry::new(),
            scale_bits: AtomicU64::new(ScaleFactor::UNIT.to_bits()),
            counters: RenderCounters::default(),
        }
    }

    /// Record the current frame size
    ///
    /// Stores `max(w/h, h/w)` as the scale factor attached to every
    /// subsequent buffer. Sizes with a zero side are ignored.
    pub fn set_size(&self, size: Size) {
        match ScaleFactor::from_size(size) {
            Some(scale) => {
                self.scale_bits.store(scale.to_bits(), Ordering::Relaxed);
            }
            None => {
                tracing::debug!(
                    width = size.width,
                    height = size.height,
                    "Ignoring size with empty dimension"
                );
            }
        }
    }

    /// Current scale factor
    pub fn scale_factor(&self) -> ScaleFactor {
        ScaleFactor::from_bits(self.scale_bits.load(Ordering::Relaxed))
    }

    /// Convert a frame without dispatching it
    pub fn convert(&self, frame: &VideoFrame) -> Result<ConvertedFrame, ConversionError> {
        let pixel_buffer = frame.buffer.as_ref().ok_or(ConversionError::MissingBuffer)?;
        let format = FormatDescription::for_pixel_buffer(pixel_buffer)?;
        let timing = TimingInfo::from_capture_seconds(frame.timestamp);

        let mut buffer = TimedMediaBuffer::new(pixel_buffer.clone(), format, timing)?;
        buffer.mark_display_immediately();

        Ok(ConvertedFrame {
            buffer,
            orientation: DisplayOrientation::from_rotation(frame.rotation),
            scale: self.scale_factor(),
        })
    }

    /// Convert a frame and dispatch it to every subscriber
    ///
    /// Returns `true` if the frame was converted. A frame that fails
    /// conversion is dropped; nothing is dispatched for it.
    pub fn render_frame(&self, frame: &VideoFrame) -> bool {
        self.counters.on_received();

        match self.convert(frame) {
            Ok(converted) => {
                let report = self.subscribers.dispatch(
                    &converted.buffer,
                    converted.orientation,
                    converted.scale,
                );
                self.counters.on_converted(report);
                true
            }
            Err(e) => {
                self.counters.on_dropped(&e);
                tracing::trace!(kind = e.kind(), error = %e, "Dropping frame");
                false
            }
        }
    }

    /// Attach a buffer subscriber
    pub fn subscribe(&self, subscriber: Arc<dyn BufferSubscriber>) -> SubscriberId {
        self.subscribers.attach(subscriber)
    }

    /// Detach a buffer subscriber
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.subscribers.detach(id)
    }

    /// The registry buffers are fanned out through
    pub fn subscribers(&self) -> &SubscriberRegistry {
        &self.subscribers
    }

    /// Snapshot of conversion counters
    pub fn stats(&self) -> RenderStats {
        self.counters.snapshot()
    }
}

impl Default for FrameConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSink for FrameConverter {
    fn on_frame(&self, frame: &VideoFrame) {
        self.render_frame(frame);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::Bytes;

    use super::*;
    use crate::media::{PixelBuffer, PixelFormat, VideoRotation};
    use crate::registry::{subscriber_fn, SinkError};

    type Delivery = (i64, DisplayOrientation, f64);

    fn frame(seconds: f64, rotation: i32) -> VideoFrame {
        VideoFrame::new(
            PixelBuffer::zeroed(PixelFormat::Nv12, 8, 6),
            VideoRotation::from_degrees(rotation),
            seconds,
        )
    }

    fn collecting(converter: &FrameConverter) -> Arc<Mutex<Vec<Delivery>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        converter.subscribe(subscriber_fn(move |buffer, orientation, scale| {
            sink.lock()
                .unwrap()
                .push((buffer.presentation_nanos(), orientation, scale.value()));
            Ok(())
        }));
        log
    }

    #[test]
    fn test_convert_timing() {
        let converter = FrameConverter::new();

        for seconds in [0.0, 0.033, 1.5, 3600.25] {
            let converted = converter.convert(&frame(seconds, 0)).unwrap();
            assert_eq!(
                converted.buffer.presentation_nanos(),
                (seconds * 1_000_000_000.0).round() as i64
            );
            assert!(!converted.buffer.timing().duration.is_valid());
            assert!(!converted.buffer.timing().decode_timestamp.is_valid());
        }
    }

    #[test]
    fn test_convert_tags_display_immediately() {
        let converter = FrameConverter::new();
        let converted = converter.convert(&frame(0.0, 0)).unwrap();

        assert!(converted.buffer.attachments().display_immediately);
        assert_eq!(converted.buffer.format().pixel_format, PixelFormat::Nv12);
        assert_eq!(converted.buffer.format().dimensions, Size::new(8, 6));
    }

    #[test]
    fn test_convert_orientation() {
        let converter = FrameConverter::new();

        assert_eq!(converter.convert(&frame(0.0, 0)).unwrap().orientation, DisplayOrientation::Right);
        assert_eq!(converter.convert(&frame(0.0, 90)).unwrap().orientation, DisplayOrientation::Right);
        assert_eq!(converter.convert(&frame(0.0, 180)).unwrap().orientation, DisplayOrientation::Right);
        assert_eq!(converter.convert(&frame(0.0, 270)).unwrap().orientation, DisplayOrientation::Left);
        assert_eq!(converter.convert(&frame(0.0, 45)).unwrap().orientation, DisplayOrientation::Right);
    }

    #[test]
    fn test_convert_missing_buffer() {
        let converter = FrameConverter::new();
        let result = converter.convert(&VideoFrame::without_buffer(VideoRotation::Deg0, 0.0));

        assert_eq!(result.unwrap_err(), ConversionError::MissingBuffer);
    }

    #[test]
    fn test_convert_bad_format() {
        let converter = FrameConverter::new();
        let buffer = PixelBuffer::new(PixelFormat::Bgra32, 16, 16, 64, Bytes::from_static(&[0u8; 8]));
        let result = converter.convert(&VideoFrame::new(buffer, VideoRotation::Deg0, 0.0));

        assert!(matches!(
            result,
            Err(ConversionError::FormatDescriptionFailed(_))
        ));
    }

    #[test]
    fn test_render_frame_absorbs_overflowing_layout() {
        let converter = FrameConverter::new();
        let log = collecting(&converter);
        let buffer = PixelBuffer::new(PixelFormat::Bgra32, 1, 2, 1usize << 63, Bytes::new());

        assert!(!converter.render_frame(&VideoFrame::new(buffer, VideoRotation::Deg0, 0.0)));

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(converter.stats().dropped_format_description, 1);
    }

    #[test]
    fn test_scale_factor_is_metadata() {
        let converter = FrameConverter::new();
        assert_eq!(converter.scale_factor(), ScaleFactor::UNIT);

        converter.set_size(Size::new(1280, 720));
        let expected = 1280.0 / 720.0;
        assert_eq!(converter.scale_factor().value(), expected);

        // Frame dimensions (8x6) do not change the advertised factor
        let converted = converter.convert(&frame(0.0, 0)).unwrap();
        assert_eq!(converted.scale.value(), expected);

        converter.set_size(Size::new(720, 1280));
        assert_eq!(converter.scale_factor().value(), expected);
    }

    #[test]
    fn test_set_size_ignores_empty() {
        let converter = FrameConverter::new();
        converter.set_size(Size::new(640, 480));
        converter.set_size(Size::new(0, 480));

        assert_eq!(converter.scale_factor().value(), 640.0 / 480.0);
    }

    #[test]
    fn test_render_frame_dispatches() {
        let converter = FrameConverter::new();
        let log = collecting(&converter);

        assert!(converter.render_frame(&frame(0.0, 0)));
        assert!(converter.render_frame(&frame(0.033, 270)));

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                (0, DisplayOrientation::Right, 1.0),
                (33_000_000, DisplayOrientation::Left, 1.0),
            ]
        );
    }

    #[test]
    fn test_render_frame_drops_bad_frames() {
        let converter = FrameConverter::new();
        let log = collecting(&converter);

        assert!(!converter.render_frame(&VideoFrame::without_buffer(VideoRotation::Deg0, 0.0)));
        assert!(converter.render_frame(&frame(0.1, 0)));

        assert_eq!(log.lock().unwrap().len(), 1);

        let stats = converter.stats();
        assert_eq!(stats.frames_received, 2);
        assert_eq!(stats.frames_converted, 1);
        assert_eq!(stats.dropped_missing_buffer, 1);
        assert_eq!(stats.buffers_delivered, 1);
    }

    #[test]
    fn test_render_frame_counts_sink_failures() {
        let converter = FrameConverter::new();
        converter.subscribe(subscriber_fn(|_, _, _| Err(SinkError::Closed)));
        let log = collecting(&converter);

        converter.render_frame(&frame(0.0, 0));

        let stats = converter.stats();
        assert_eq!(stats.sink_failures, 1);
        assert_eq!(stats.buffers_delivered, 1);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let converter = FrameConverter::new();
        let log = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&log);
        let id = converter.subscribe(subscriber_fn(move |_, _, _| {
            *counter.lock().unwrap() += 1;
            Ok(())
        }));

        converter.on_frame(&frame(0.0, 0));
        assert!(converter.unsubscribe(id));
        converter.on_frame(&frame(0.1, 0));

        assert_eq!(*log.lock().unwrap(), 1);
        assert!(converter.subscribers().is_empty());
    }
}
