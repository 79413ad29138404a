//! Picture-in-picture session control
//!
//! A [`PipSessionManager`] attaches a floating overlay to one remote video
//! track at a time. The host supplies its capabilities (track lookup,
//! display surfaces, and the platform overlay) as trait objects; the
//! [`loopback`] module provides in-memory versions of all of them.
//!
//! # Lifecycle
//!
//! ```text
//!              prepare(view)
//!                   │
//!   ┌──────────► Disabled ◄──────────────────────┐
//!   │               │ enable(stream)             │
//!   │               ▼                            │
//!   │           Preparing ──── disable ─────────►┤
//!   │               │ settle delay               │
//!   │               ▼                            │
//!   │            Active ────── disable ─────────►┘
//!   │          start/stop
//!   └── controller failure
//! ```

pub mod config;
pub mod error;
pub mod loopback;
pub mod manager;
pub mod observer;
pub mod platform;
pub mod sink;
pub mod state;

pub use config::{OverlaySize, PipConfig};
pub use error::{PipError, PlatformError};
pub use manager::{PipCapabilities, PipSessionManager};
pub use observer::{NoopObserver, PipObserver, RestoreCompletion};
pub use platform::{
    ContentSource, DisplaySurface, HostView, OverlayController, OverlayPlatform, SurfaceFactory,
    SurfaceSpec, TrackRegistry, VideoTrack,
};
pub use sink::OverlaySink;
pub use state::PipPhase;
