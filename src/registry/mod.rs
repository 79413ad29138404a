//! Subscriber registry for buffer fan-out
//!
//! Every converted buffer is handed to each attached subscriber, in attach
//! order, on the frame-delivery thread.
//!
//! # Architecture
//!
//! ```text
//!   [VideoTrack] ──frame──► FrameConverter::render_frame()
//!                                  │ convert()
//!                                  ▼
//!                      SubscriberRegistry::dispatch()
//!                     ┌────────────┼────────────┐
//!                     ▼            ▼            ▼
//!               [OverlaySink] [Renderer]   [Recorder]
//!                enqueue()     ...          ...
//! ```
//!
//! # Copy-on-Write
//!
//! Attach and detach swap in a new subscriber list; dispatch works from a
//! snapshot. A detach that races a dispatch takes effect on the next frame,
//! and no lock is held while a subscriber runs.

pub mod error;
pub mod store;
pub mod subscriber;

pub use error::SinkError;
pub use store::{DispatchReport, SubscriberRegistry};
pub use subscriber::{subscriber_fn, BufferSubscriber, FnSubscriber, SubscriberId};
