//! Statistics for the frame conversion path

use std::sync::atomic::{AtomicU64, Ordering};

use crate::registry::DispatchReport;
use crate::media::ConversionError;

/// Snapshot of a converter's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames handed to the converter
    pub frames_received: u64,
    /// Frames converted into timed buffers
    pub frames_converted: u64,
    /// Frames dropped because they had no pixel buffer
    pub dropped_missing_buffer: u64,
    /// Frames dropped because no format description could be derived
    pub dropped_format_description: u64,
    /// Frames dropped because the sample could not be built
    pub dropped_sample_construction: u64,
    /// Successful subscriber deliveries
    pub buffers_delivered: u64,
    /// Subscriber deliveries that failed
    pub sink_failures: u64,
}

impl RenderStats {
    /// Total frames dropped for any reason
    pub fn frames_dropped(&self) -> u64 {
        self.dropped_missing_buffer
            + self.dropped_format_description
            + self.dropped_sample_construction
    }

    /// Fraction of received frames that were dropped
    pub fn drop_ratio(&self) -> f64 {
        if self.frames_received > 0 {
            self.frames_dropped() as f64 / self.frames_received as f64
        } else {
            0.0
        }
    }
}

/// Lock-free counters updated from the frame thread
#[derive(Debug, Default)]
pub(crate) struct RenderCounters {
    frames_received: AtomicU64,
    frames_converted: AtomicU64,
    dropped_missing_buffer: AtomicU64,
    dropped_format_description: AtomicU64,
    dropped_sample_construction: AtomicU64,
    buffers_delivered: AtomicU64,
    sink_failures: AtomicU64,
}

impl RenderCounters {
    pub(crate) fn on_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn on_converted(&self, report: DispatchReport) {
        self.frames_converted.fetch_add(1, Ordering::Relaxed);
        self.buffers_delivered
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.sink_failures
            .fetch_add(report.failed as u64, Ordering::Relaxed);
    }

    pub(crate) fn on_dropped(&self, error: &ConversionError) {
        let counter = match error {
            ConversionError::MissingBuffer => &self.dropped_missing_buffer,
            ConversionError::FormatDescriptionFailed(_) => &self.dropped_format_description,
            ConversionError::SampleConstructionFailed(_) => &self.dropped_sample_construction,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RenderStats {
        RenderStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_converted: self.frames_converted.load(Ordering::Relaxed),
            dropped_missing_buffer: self.dropped_missing_buffer.load(Ordering::Relaxed),
            dropped_format_description: self.dropped_format_description.load(Ordering::Relaxed),
            dropped_sample_construction: self.dropped_sample_construction.load(Ordering::Relaxed),
            buffers_delivered: self.buffers_delivered.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_stats_new() {
        let stats = RenderStats::default();
        assert_eq!(stats.frames_received, 0);
        assert_eq!(stats.frames_converted, 0);
        assert_eq!(stats.frames_dropped(), 0);
        assert_eq!(stats.buffers_delivered, 0);
        assert_eq!(stats.sink_failures, 0);
    }

    #[test]
    fn test_drop_ratio_zero_frames() {
        let stats = RenderStats::default();

        // With no frames, ratio should remain 0
        assert_eq!(stats.drop_ratio(), 0.0);
    }

    #[test]
    fn test_counters_by_kind() {
        let counters = RenderCounters::default();

        for _ in 0..4 {
            counters.on_received();
        }
        counters.on_dropped(&ConversionError::MissingBuffer);
        counters.on_dropped(&ConversionError::FormatDescriptionFailed("empty".into()));
        counters.on_converted(DispatchReport { delivered: 2, failed: 1 });
        counters.on_converted(DispatchReport { delivered: 3, failed: 0 });

        let stats = counters.snapshot();
        assert_eq!(stats.frames_received, 4);
        assert_eq!(stats.frames_converted, 2);
        assert_eq!(stats.dropped_missing_buffer, 1);
        assert_eq!(stats.dropped_format_description, 1);
        assert_eq!(stats.dropped_sample_construction, 0);
        assert_eq!(stats.frames_dropped(), 2);
        assert_eq!(stats.buffers_delivered, 5);
        assert_eq!(stats.sink_failures, 1);
        assert_eq!(stats.drop_ratio(), 0.5);
    }
}
