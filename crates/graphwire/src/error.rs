// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate-wide error type.
//!
//! Every failure terminates the current operation. None of them are retried
//! or hidden at this layer: after an error the stream must be closed.

use std::fmt;
use std::io;

use crate::splitter::SplitterError;

/// Errors raised by the stream stack and the type registry.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// A received tag, control code or type number is outside its expected set.
    StreamCorrupted { reason: String },
    /// A handle or unshared read violated the identity rules.
    InvalidObject { reason: String },
    /// Internal consistency check failed (only raised with `asserts` on).
    Internal { reason: String },

    // ========================================================================
    // Type Errors
    // ========================================================================
    /// A type name on the wire cannot be resolved to a known type.
    ClassNotFound { type_name: String },
    /// The type resolves to the unsupported strategy.
    NotSerializable { type_name: String },
    /// A type registration was rejected.
    Registration { reason: String },

    // ========================================================================
    // Stream State Errors
    // ========================================================================
    /// The source ran dry before a read could be satisfied.
    EndOfStream,
    /// Operation attempted on a closed stream.
    Closed,
    /// A nesting-context call was made outside any object serialization.
    NotActive,

    // ========================================================================
    // Environment Errors
    // ========================================================================
    /// Failure of the underlying sink or source.
    Io(io::Error),
    /// Invalid configuration value.
    Config { reason: String },
    /// One or more sinks of an output splitter failed.
    Splitter(SplitterError),
}

impl Error {
    pub(crate) fn corrupted(reason: impl Into<String>) -> Self {
        Error::StreamCorrupted {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_object(reason: impl Into<String>) -> Self {
        Error::InvalidObject {
            reason: reason.into(),
        }
    }

    pub(crate) fn internal(reason: impl Into<String>) -> Self {
        Error::Internal {
            reason: reason.into(),
        }
    }

    pub(crate) fn not_serializable(type_name: impl Into<String>) -> Self {
        Error::NotSerializable {
            type_name: type_name.into(),
        }
    }

    pub(crate) fn class_not_found(type_name: impl Into<String>) -> Self {
        Error::ClassNotFound {
            type_name: type_name.into(),
        }
    }

    /// True for errors caused by the data on the wire rather than the environment.
    #[must_use]
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Error::StreamCorrupted { .. } | Error::InvalidObject { .. } | Error::Internal { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::StreamCorrupted { reason } => write!(f, "stream corrupted: {}", reason),
            Error::InvalidObject { reason } => write!(f, "invalid object: {}", reason),
            Error::Internal { reason } => write!(f, "internal error: {}", reason),
            Error::ClassNotFound { type_name } => write!(f, "class not found: {}", type_name),
            Error::NotSerializable { type_name } => write!(f, "not serializable: {}", type_name),
            Error::Registration { reason } => write!(f, "type registration failed: {}", reason),
            Error::EndOfStream => write!(f, "end of stream"),
            Error::Closed => write!(f, "stream closed"),
            Error::NotActive => write!(f, "not active: no object is being serialized"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Config { reason } => write!(f, "invalid configuration: {}", reason),
            Error::Splitter(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Splitter(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            return Error::EndOfStream;
        }
        // A splitter reports through io::Write; unwrap its composite error.
        if e.get_ref().is_some_and(|inner| inner.is::<SplitterError>()) {
            if let Some(inner) = e.into_inner() {
                return match inner.downcast::<SplitterError>() {
                    Ok(splitter) => Error::Splitter(*splitter),
                    Err(other) => Error::Io(io::Error::other(other)),
                };
            }
            return Error::Io(io::Error::other("splitter failure"));
        }
        Error::Io(e)
    }
}

impl From<SplitterError> for Error {
    fn from(e: SplitterError) -> Self {
        Error::Splitter(e)
    }
}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_variants() {
        assert_eq!(
            Error::corrupted("bad tag 0x99 for double").to_string(),
            "stream corrupted: bad tag 0x99 for double"
        );
        assert_eq!(
            Error::class_not_found("demo.Missing").to_string(),
            "class not found: demo.Missing"
        );
        assert_eq!(
            Error::not_serializable("demo.Socket").to_string(),
            "not serializable: demo.Socket"
        );
        assert_eq!(Error::EndOfStream.to_string(), "end of stream");
        assert_eq!(Error::Closed.to_string(), "stream closed");
    }

    #[test]
    fn test_unexpected_eof_maps_to_end_of_stream() {
        let err: Error = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(err, Error::EndOfStream));

        let err: Error = io::Error::new(io::ErrorKind::BrokenPipe, "pipe").into();
        match err {
            Error::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_splitter_error_unwrapped_from_io() {
        let mut failures = SplitterError::default();
        failures.push(1, io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let err: Error = io::Error::other(failures).into();
        match err {
            Error::Splitter(inner) => assert_eq!(inner.failures().len(), 1),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_protocol_classification() {
        assert!(Error::corrupted("x").is_protocol());
        assert!(Error::invalid_object("x").is_protocol());
        assert!(!Error::EndOfStream.is_protocol());
    }
}
