//! Conversion and delivery statistics

pub mod metrics;

pub use metrics::RenderStats;
pub(crate) use metrics::RenderCounters;
