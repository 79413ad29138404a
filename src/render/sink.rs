//! Track sink contract
//!
//! The RTC pipeline pushes decoded frames into every sink attached to a
//! track, on its own frame-delivery thread.

use crate::media::VideoFrame;

/// Receiver of raw frames from a video track
pub trait VideoSink: Send + Sync {
    /// Called once per delivered frame. Must not block.
    fn on_frame(&self, frame: &VideoFrame);
}
