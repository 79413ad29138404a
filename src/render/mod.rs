//! Frame conversion
//!
//! Turns raw frames from a video track into timed, display-ready buffers
//! and fans them out to subscribers.

pub mod converter;
pub mod sink;

pub use crate::media::ConversionError;
pub use converter::{ConvertedFrame, FrameConverter};
pub use sink::VideoSink;
