//! Errors raised by the outer surfaces of the crate.
//!
//! The fixer itself never fails. Loading configuration, reading input, and
//! decoding post fields can.

use std::fmt;
use std::io;

/// Errors from configuration, I/O, and post-field decoding.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Json(serde_json::Error),
    Config(config::ConfigError),
    /// Post fields were valid JSON but not an object.
    NotAnObject(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Json(err) => write!(f, "Invalid post fields: {}", err),
            Error::Config(err) => write!(f, "Configuration error: {}", err),
            Error::NotAnObject(found) => {
                write!(f, "Post fields must be a JSON object, found {}", found)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Config(err) => Some(err),
            Error::NotAnObject(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err)
    }
}
