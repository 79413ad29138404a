//! Crate-level error type

use crate::media::ConversionError;
use crate::pip::{PipError, PlatformError};
use crate::registry::SinkError;

/// Any error produced by this crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A frame could not be converted
    Conversion(ConversionError),
    /// A subscriber refused a buffer
    Sink(SinkError),
    /// A session operation failed
    Pip(PipError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Conversion(e) => write!(f, "Conversion error: {}", e),
            Error::Sink(e) => write!(f, "Sink error: {}", e),
            Error::Pip(e) => write!(f, "Session error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Conversion(e) => Some(e),
            Error::Sink(e) => Some(e),
            Error::Pip(e) => Some(e),
        }
    }
}

impl From<ConversionError> for Error {
    fn from(e: ConversionError) -> Self {
        Error::Conversion(e)
    }
}

impl From<SinkError> for Error {
    fn from(e: SinkError) -> Self {
        Error::Sink(e)
    }
}

impl From<PipError> for Error {
    fn from(e: PipError) -> Self {
        Error::Pip(e)
    }
}

impl From<PlatformError> for Error {
    fn from(e: PlatformError) -> Self {
        Error::Pip(PipError::Platform(e))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_question_mark_conversion() {
        fn enable() -> std::result::Result<(), PipError> {
            Err(PipError::NotPrepared)
        }

        fn fails() -> Result<()> {
            enable()?;
            Ok(())
        }

        assert_eq!(fails(), Err(Error::Pip(PipError::NotPrepared)));
    }

    #[test]
    fn test_source_chain() {
        let err = Error::from(PlatformError::new("no window"));

        let pip = err.source().unwrap();
        assert_eq!(pip.to_string(), "Platform error: no window");
        assert_eq!(pip.source().unwrap().to_string(), "no window");
    }

    #[test]
    fn test_display() {
        let err = Error::from(ConversionError::MissingBuffer);
        assert!(err.to_string().starts_with("Conversion error"));

        let err = Error::from(SinkError::Closed);
        assert!(err.to_string().starts_with("Sink error"));
    }
}
