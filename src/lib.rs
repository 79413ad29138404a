//! Picture-in-picture rendering for real-time video tracks
//!
//! Converts decoded frames from a remote video track into timed,
//! display-ready buffers, fans them out to subscribers, and drives a
//! floating overlay session that shows one track at a time.
//!
//! # Modules
//!
//! - [`media`]: frames, pixel buffers, timing and orientation
//! - [`render`]: the frame converter sitting on a video track
//! - [`registry`]: the subscriber registry the converter dispatches to
//! - [`pip`]: the overlay session state machine and host capabilities
//! - [`stats`]: conversion and delivery counters
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rtc_pip::pip::loopback::{LoopbackPlatform, LoopbackSurfaces, LoopbackTracks};
//! use rtc_pip::pip::{HostView, PipCapabilities, PipSessionManager};
//!
//! #[tokio::main]
//! async fn main() -> rtc_pip::Result<()> {
//!     let tracks = Arc::new(LoopbackTracks::new());
//!     tracks.insert("remote-1");
//!
//!     let manager = PipSessionManager::new(PipCapabilities::new(
//!         tracks,
//!         Arc::new(LoopbackPlatform::new()),
//!         Arc::new(LoopbackSurfaces::default()),
//!     ));
//!
//!     manager.prepare(HostView::new(1)).await?;
//!     manager.enable("remote-1").await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod media;
pub mod pip;
pub mod registry;
pub mod render;
pub mod stats;

pub use error::{Error, Result};
pub use media::{DisplayOrientation, PixelBuffer, PixelFormat, TimedMediaBuffer, VideoFrame};
pub use pip::{PipConfig, PipError, PipPhase, PipSessionManager};
pub use registry::{BufferSubscriber, SubscriberRegistry};
pub use render::FrameConverter;
pub use stats::RenderStats;
