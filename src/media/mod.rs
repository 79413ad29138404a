//! Media types for the frame conversion path
//!
//! This module provides:
//! - Decoded frames and native pixel buffers
//! - Rotation to display orientation mapping
//! - Presentation timing synthesis
//! - Timed, display-ready sample buffers
//! - The aspect scale factor advertised to consumers

pub mod buffer;
pub mod error;
pub mod frame;
pub mod orientation;
pub mod scale;
pub mod timing;

pub use buffer::{FormatDescription, SampleAttachments, TimedMediaBuffer};
pub use error::ConversionError;
pub use frame::{PixelBuffer, PixelFormat, Size, VideoFrame, VideoRotation};
pub use orientation::DisplayOrientation;
pub use scale::ScaleFactor;
pub use timing::{MediaTime, TimeFlags, TimingInfo, NANOS_PER_SEC};
