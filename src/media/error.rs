//! Conversion error types
//!
//! Per-frame failures. These never leave the frame-delivery thread: the
//! converter counts them, drops the frame, and keeps going.

/// Error type for frame conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The frame carried no native pixel buffer
    MissingBuffer,
    /// A format description could not be derived from the pixel buffer
    FormatDescriptionFailed(String),
    /// The timed sample could not be built
    SampleConstructionFailed(String),
}

impl ConversionError {
    /// Short label, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            ConversionError::MissingBuffer => "missing_buffer",
            ConversionError::FormatDescriptionFailed(_) => "format_description",
            ConversionError::SampleConstructionFailed(_) => "sample_construction",
        }
    }
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionError::MissingBuffer => write!(f, "Frame has no pixel buffer"),
            ConversionError::FormatDescriptionFailed(reason) => {
                write!(f, "Format description failed: {}", reason)
            }
            ConversionError::SampleConstructionFailed(reason) => {
                write!(f, "Sample construction failed: {}", reason)
            }
        }
    }
}

impl std::error::Error for ConversionError {}
