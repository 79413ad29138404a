//! Sink error types
//!
//! Returned by a subscriber that could not accept a buffer. The registry
//! logs these and moves on to the next subscriber.

/// Error type for subscriber callbacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The sink has been torn down and no longer accepts buffers
    Closed,
    /// The sink is applying backpressure and dropped the buffer
    Full,
    /// Any other sink-specific failure
    Other(String),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Closed => write!(f, "Sink closed"),
            SinkError::Full => write!(f, "Sink full, buffer dropped"),
            SinkError::Other(msg) => write!(f, "Sink failed: {}", msg),
        }
    }
}

impl std::error::Error for SinkError {}
