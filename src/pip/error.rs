//! Session error types

use super::state::PipPhase;

/// Failure reported by the host platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError {
    message: String,
}

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PlatformError {}

/// Error type for session operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipError {
    /// The platform has no picture-in-picture capability
    NotSupported,
    /// `enable` was called before `prepare`
    NotPrepared,
    /// No video track for the given stream id
    TrackNotFound(String),
    /// The session is already enabled
    AlreadyEnabled(PipPhase),
    /// No overlay controller exists yet
    NotActive,
    /// The operation is not allowed while a session is enabled
    SessionBusy(PipPhase),
    /// The platform refused an operation
    Platform(PlatformError),
}

impl std::fmt::Display for PipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipError::NotSupported => write!(f, "Picture-in-picture not supported"),
            PipError::NotPrepared => write!(f, "Picture-in-picture not prepared"),
            PipError::TrackNotFound(id) => write!(f, "Video track not found: {}", id),
            PipError::AlreadyEnabled(phase) => write!(f, "Session already enabled ({:?})", phase),
            PipError::NotActive => write!(f, "Session not active"),
            PipError::SessionBusy(phase) => write!(f, "Session busy ({:?})", phase),
            PipError::Platform(e) => write!(f, "Platform error: {}", e),
        }
    }
}

impl std::error::Error for PipError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipError::Platform(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PlatformError> for PipError {
    fn from(e: PlatformError) -> Self {
        PipError::Platform(e)
    }
}
