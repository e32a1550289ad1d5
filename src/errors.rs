//! Errors produced by the readers and writers.
//!
//! There are three kinds of codec failure and they are never conflated:
//!
//! * [`Error::MalformedDocument`]: the bytes (or the value being written) break the
//!   format. The caller can only abandon the document.
//! * [`Error::ProtocolViolation`]: a method was called in a state that does not
//!   permit it.
//! * [`Error::UseAfterClose`]: a method was called after `close`.
//!
//! [`Error::Io`] only ever comes out of a writer's destination: `flush` on a binary
//! writer that owns one, or the [`std::fmt::Write`] behind a JSON writer.

use crate::{element::ElementType, io::State};
use failure::Fail;
use std::{fmt, io};

#[derive(Debug, Fail)]
/// An error encountered while reading or writing BSON.
pub enum Error {
    /// The document does not follow the wire format.
    #[fail(display = "malformed document: {}", _0)]
    MalformedDocument(#[cause] Malformed),
    /// The operation is not legal in the current state.
    #[fail(display = "{} cannot be called when state is {:?}", operation, state)]
    ProtocolViolation {
        /// Name of the offending operation.
        operation: &'static str,
        /// State the instance was in.
        state: State,
    },
    /// The instance was already closed.
    #[fail(display = "{} called after close", _0)]
    UseAfterClose(&'static str),
    /// The destination failed.
    #[fail(display = "output failed: {}", _0)]
    Io(#[cause] io::Error),
}

#[derive(Debug, Fail, Clone, PartialEq, Eq)]
/// The reason a document was rejected.
pub enum Malformed {
    /// An element of a specific type was demanded but another was found.
    #[fail(display = "expected element of type {:?}, found {:?}", expected, found)]
    WrongType {
        /// Demanded type.
        expected: ElementType,
        /// Type on the wire.
        found: ElementType,
    },
    /// An element with a specific name was demanded but another was found.
    #[fail(display = "expected element named `{}`, found `{}`", expected, found)]
    NameMismatch {
        /// Demanded name.
        expected: String,
        /// Name on the wire.
        found: String,
    },
    /// Bytes consumed by a container differ from its declared length.
    #[fail(display = "declared size {} but consumed {} bytes", declared, actual)]
    SizeMismatch {
        /// Length field of the container.
        declared: usize,
        /// Bytes actually consumed.
        actual: usize,
    },
    /// A size field was negative or below the minimum for its type.
    #[fail(display = "invalid size {}", _0)]
    InvalidSize(i64),
    /// A size exceeded the configured maximum document size.
    #[fail(display = "size {} is larger than the maximum document size {}", size, max)]
    DocumentTooLarge {
        /// Offending size.
        size: usize,
        /// Configured limit.
        max: usize,
    },
    /// Containers were nested deeper than the configured maximum.
    #[fail(display = "nesting depth {} is deeper than the maximum {}", depth, max)]
    TooDeep {
        /// Depth the offending container would have.
        depth: usize,
        /// Configured limit.
        max: usize,
    },
    /// The terminator byte was not found where it should be.
    #[fail(display = "missing end of document")]
    MissingTerminator,
    /// The two length fields of a legacy binary value disagree.
    #[fail(display = "binary sub type OldBinary has inconsistent sizes")]
    InconsistentBinaryLength,
    /// The buffer ended in the middle of a value.
    #[fail(display = "tried to read {} bytes at offset {} from buffer of size {}", wanted, offset, len)]
    UnexpectedEnd {
        /// Bytes required.
        wanted: usize,
        /// Cursor position.
        offset: usize,
        /// Buffer length.
        len: usize,
    },
    /// A type tag that is not part of the format.
    #[fail(display = "unknown element type 0x{:02x}", _0)]
    UnknownElementType(u8),
    /// A string or name was not valid UTF-8.
    #[fail(display = "invalid UTF-8 in string")]
    InvalidUtf8,
    /// A boolean byte that was neither 0 nor 1.
    #[fail(display = "invalid boolean byte {}", _0)]
    InvalidBoolean(u8),
    /// A name, pattern or option string containing a null byte.
    #[fail(display = "c-string `{}` contains a null byte", _0)]
    NullInCString(String),
    /// A date outside the range representable in memory.
    #[fail(display = "date {} ms is out of range", _0)]
    DateOutOfRange(i64),
}

impl From<Malformed> for Error {
    fn from(m: Malformed) -> Self { Error::MalformedDocument(m) }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self { Error::Io(e) }
}

impl From<fmt::Error> for Error {
    fn from(e: fmt::Error) -> Self { Error::Io(io::Error::new(io::ErrorKind::Other, e)) }
}

impl Error {
    /// Indicates whether this is a [`Error::MalformedDocument`].
    pub fn is_malformed(&self) -> bool {
        match self {
            Error::MalformedDocument(_) => true,
            _ => false,
        }
    }

    /// Indicates whether this is a [`Error::ProtocolViolation`].
    pub fn is_protocol_violation(&self) -> bool {
        match self {
            Error::ProtocolViolation { .. } => true,
            _ => false,
        }
    }

    /// Indicates whether this is a [`Error::UseAfterClose`].
    pub fn is_use_after_close(&self) -> bool {
        match self {
            Error::UseAfterClose(_) => true,
            _ => false,
        }
    }
}

/// Returns early with a [`Error::MalformedDocument`], like `failure::bail!`.
macro_rules! malformed {
    ($reason:expr) => {
        return Err($crate::errors::Error::MalformedDocument($reason))
    };
}
