//! Streaming readers and writers.
//!
//! Every reader and writer is a state machine over a stack of open containers. The
//! [`State`] tells which calls are currently legal; anything else is rejected with
//! [`Error::ProtocolViolation`] and leaves the instance untouched.

pub mod binary_reader;
pub mod binary_writer;
pub mod buffer;
pub(crate) mod context;
pub mod json_writer;

pub use binary_reader::{BinaryReader, BinaryReaderSettings, Bookmark};
pub use binary_writer::{BinaryWriter, BinaryWriterSettings};
pub use json_writer::{JsonOutputMode, JsonWriter, JsonWriterSettings};

use crate::{errors::Error, values::Binary, values::ObjectId};
use chrono::{DateTime, Utc};

/// The state of a reader or writer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum State {
    /// Nothing has been read or written yet.
    Initial,
    /// Inside a top level document.
    Document,
    /// Inside an embedded document.
    EmbeddedDocument,
    /// Inside an array.
    Array,
    /// The code of a JavaScript with scope value is done, the scope document is next.
    JavaScriptWithScope,
    /// Inside the scope document of a JavaScript with scope value.
    ScopeDocument,
    /// A top level document was completed.
    Done,
    /// `close` was called.
    Closed,
}

impl State {
    /// Indicates whether a container is open.
    ///
    /// # Example
    ///
    /// ```
    /// use bson_io::io::State;
    ///
    /// assert!(State::Array.is_document());
    /// assert!(State::JavaScriptWithScope.is_document());
    /// assert!(!State::Done.is_document());
    /// ```
    pub fn is_document(self) -> bool {
        match self {
            State::Document
            | State::EmbeddedDocument
            | State::Array
            | State::JavaScriptWithScope
            | State::ScopeDocument => true,
            State::Initial | State::Done | State::Closed => false,
        }
    }

    /// Indicates whether elements may be read or written.
    pub fn accepts_elements(self) -> bool {
        self.is_document() && self != State::JavaScriptWithScope
    }

    /// Indicates whether a top level document may be started.
    pub(crate) fn at_top_level(self) -> bool {
        self == State::Initial || self == State::Done
    }

    /// Indicates whether `end_document` closes something in this state.
    pub(crate) fn closes_document(self) -> bool {
        match self {
            State::Document | State::EmbeddedDocument | State::ScopeDocument => true,
            _ => false,
        }
    }
}

/// Checks that elements may be written or read, naming `operation` in the error.
pub(crate) fn check_element_state(operation: &'static str, state: State) -> Result<(), Error> {
    match state {
        State::Closed => Err(Error::UseAfterClose(operation)),
        s if s.accepts_elements() => Ok(()),
        s => Err(Error::ProtocolViolation {
            operation,
            state: s,
        }),
    }
}

/// Fails with [`Error::ProtocolViolation`] unless `legal` holds for `state`.
pub(crate) fn check_state(
    operation: &'static str,
    state: State,
    legal: fn(State) -> bool,
) -> Result<(), Error> {
    match state {
        State::Closed => Err(Error::UseAfterClose(operation)),
        s if legal(s) => Ok(()),
        s => Err(Error::ProtocolViolation {
            operation,
            state: s,
        }),
    }
}

/// The write contract shared by every output format.
///
/// A document is produced by an ordered sequence of calls:
///
/// ```
/// use bson_io::prelude::*;
///
/// fn write_point<W: BsonWriter>(w: &mut W) -> Result<(), Error> {
///     w.write_start_document()?;
///     w.write_double("x", 1.5)?;
///     w.write_double("y", -2.0)?;
///     w.write_end_document()
/// }
///
/// let mut json = JsonWriter::new(String::new(), JsonWriterSettings::default());
/// write_point(&mut json).unwrap();
/// assert_eq!(json.into_inner(), "{ \"x\" : 1.5, \"y\" : -2 }");
/// ```
pub trait BsonWriter {
    /// The current state.
    fn state(&self) -> State;

    /// Closes the writer. Further calls other than `close` fail with
    /// [`Error::UseAfterClose`].
    fn close(&mut self);

    /// Pushes completed output to the destination. Legal only in [`State::Done`].
    fn flush(&mut self) -> Result<(), Error>;

    /// Starts a top level document, or the scope document of a JavaScript with scope
    /// value.
    fn write_start_document(&mut self) -> Result<(), Error>;

    /// Ends the innermost document. Ending a scope document also ends its JavaScript
    /// with scope value.
    fn write_end_document(&mut self) -> Result<(), Error>;

    /// Starts a document nested in the current one.
    fn write_start_embedded_document(&mut self, name: &str) -> Result<(), Error>;

    fn write_start_array(&mut self, name: &str) -> Result<(), Error>;

    fn write_end_array(&mut self) -> Result<(), Error>;

    /// Writes the code of a JavaScript with scope value. The scope document must be
    /// written next, starting with [`BsonWriter::write_start_document`].
    fn write_start_javascript_with_scope(&mut self, name: &str, code: &str)
        -> Result<(), Error>;

    fn write_double(&mut self, name: &str, value: f64) -> Result<(), Error>;

    fn write_string(&mut self, name: &str, value: &str) -> Result<(), Error>;

    fn write_binary(&mut self, name: &str, value: &Binary) -> Result<(), Error>;

    fn write_object_id(&mut self, name: &str, value: ObjectId) -> Result<(), Error>;

    fn write_boolean(&mut self, name: &str, value: bool) -> Result<(), Error>;

    fn write_date_time(&mut self, name: &str, value: DateTime<Utc>) -> Result<(), Error>;

    fn write_null(&mut self, name: &str) -> Result<(), Error>;

    fn write_regular_expression(
        &mut self,
        name: &str,
        pattern: &str,
        options: &str,
    ) -> Result<(), Error>;

    fn write_javascript(&mut self, name: &str, code: &str) -> Result<(), Error>;

    fn write_symbol(&mut self, name: &str, value: &str) -> Result<(), Error>;

    fn write_int32(&mut self, name: &str, value: i32) -> Result<(), Error>;

    fn write_timestamp(&mut self, name: &str, value: i64) -> Result<(), Error>;

    fn write_int64(&mut self, name: &str, value: i64) -> Result<(), Error>;

    fn write_min_key(&mut self, name: &str) -> Result<(), Error>;

    fn write_max_key(&mut self, name: &str) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_group() {
        let all = [
            State::Initial,
            State::Document,
            State::EmbeddedDocument,
            State::Array,
            State::JavaScriptWithScope,
            State::ScopeDocument,
            State::Done,
            State::Closed,
        ];
        let docs: Vec<State> = all.iter().cloned().filter(|s| s.is_document()).collect();
        assert_eq!(docs.len(), 5);

        let accepting: Vec<State> = all.iter().cloned().filter(|s| s.accepts_elements()).collect();
        assert_eq!(
            accepting,
            vec![
                State::Document,
                State::EmbeddedDocument,
                State::Array,
                State::ScopeDocument
            ]
        );
    }

    #[test]
    fn element_state_errors() {
        assert!(check_element_state("write_int32", State::Initial)
            .unwrap_err()
            .is_protocol_violation());
        assert!(check_element_state("write_int32", State::Closed)
            .unwrap_err()
            .is_use_after_close());
        assert!(check_element_state("write_int32", State::Array).is_ok());
    }
}
