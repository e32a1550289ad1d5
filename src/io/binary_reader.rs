//! The binary decoder.
//!
//! The reader walks a byte buffer once, front to back. Every length it reads is checked
//! against the configured maximum and against the bytes actually consumed, so a hostile
//! buffer can make it fail but never read out of bounds.

use super::{
    buffer::BsonBuffer,
    check_element_state, check_state,
    context::{Context, ContextStack, ContextType},
    State,
};
use crate::{
    constants::*,
    element::{BinarySubType, ElementType, SkipRule},
    errors::{Error, Malformed},
    values::{Binary, ObjectId, Regex},
};
use chrono::{DateTime, Utc};
use tracing::{debug, trace};

/// Settings for a [`BinaryReader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinaryReaderSettings {
    /// Largest length field the reader accepts.
    pub max_document_size: usize,
    /// Report binary values of sub type [`BinarySubType::OldBinary`] as
    /// [`BinarySubType::Generic`].
    pub fix_old_binary_subtype_on_input: bool,
    /// Most containers open at once, counting the top level document. A code with
    /// scope value and its scope count as two.
    pub max_nesting_depth: usize,
}

impl Default for BinaryReaderSettings {
    fn default() -> Self {
        BinaryReaderSettings {
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            fix_old_binary_subtype_on_input: true,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// A saved reader position, see [`BinaryReader::bookmark`].
#[derive(Clone, Debug)]
pub struct Bookmark {
    position: usize,
    state: State,
    contexts: ContextStack<Context>,
}

/// Reads BSON from a byte buffer.
///
/// Values are read by name: `read_int32("x")` fails unless the next element is an
/// `Int32` named `x`. On a type or name mismatch nothing is consumed, so the caller may
/// inspect the element with [`BinaryReader::peek_type`] and [`BinaryReader::peek_name`].
///
/// # Example
///
/// ```
/// use bson_io::prelude::*;
///
/// let bytes = [12, 0, 0, 0, 0x10, b'x', 0, 1, 0, 0, 0, 0];
/// let mut r = BinaryReader::new(&bytes, BinaryReaderSettings::default());
///
/// r.read_start_document().unwrap();
/// assert_eq!(r.peek_type().unwrap(), ElementType::Int32);
/// assert_eq!(r.read_int32("x").unwrap(), 1);
/// assert!(!r.has_element().unwrap());
/// r.read_end_document().unwrap();
/// assert!(r.is_at_end_of_file());
/// ```
#[derive(Clone, Debug)]
pub struct BinaryReader {
    buffer: BsonBuffer,
    settings: BinaryReaderSettings,
    contexts: ContextStack<Context>,
    state: State,
}

impl BinaryReader {
    /// Creates a reader positioned at the start of `bytes`.
    pub fn new(bytes: &[u8], settings: BinaryReaderSettings) -> BinaryReader {
        BinaryReader {
            buffer: BsonBuffer::from_slice(bytes),
            settings,
            contexts: ContextStack::new(),
            state: State::Initial,
        }
    }

    pub fn state(&self) -> State { self.state }

    /// Offset of the cursor from the start of the buffer.
    pub fn position(&self) -> usize { self.buffer.position() }

    /// Indicates whether every byte has been consumed.
    pub fn is_at_end_of_file(&self) -> bool { self.buffer.remaining() == 0 }

    /// Closes the reader. Further calls other than `close` fail with
    /// [`Error::UseAfterClose`].
    pub fn close(&mut self) {
        if self.state != State::Closed {
            self.contexts.clear();
            self.state = State::Closed;
            debug!("binary reader closed");
        }
    }

    /// Saves the current position and state.
    pub fn bookmark(&self) -> Bookmark {
        Bookmark {
            position: self.buffer.position(),
            state: self.state,
            contexts: self.contexts.clone(),
        }
    }

    /// Rewinds to a position saved by [`BinaryReader::bookmark`].
    pub fn return_to_bookmark(&mut self, bookmark: Bookmark) -> Result<(), Error> {
        if self.state == State::Closed {
            return Err(Error::UseAfterClose("return_to_bookmark"));
        }
        self.buffer.set_position(bookmark.position)?;
        self.state = bookmark.state;
        self.contexts = bookmark.contexts;
        Ok(())
    }

    /// Reads a length field, checking it is at least `min` and within the limit.
    fn read_size(&mut self, min: usize) -> Result<usize, Error> {
        let size = self.buffer.read_i32()?;
        if size < 0 || (size as usize) < min {
            malformed!(Malformed::InvalidSize(size as i64))
        }
        let size = size as usize;
        let max = self.settings.max_document_size;
        if size > max {
            malformed!(Malformed::DocumentTooLarge { size, max })
        }
        Ok(size)
    }

    fn read_sized_string(&mut self) -> Result<String, Error> {
        let len = self.read_size(MIN_STRING_SIZE)?;
        Ok(self.buffer.read_string(len)?)
    }

    fn open(&mut self, kind: ContextType, min: usize) -> Result<(), Error> {
        let depth = self.contexts.depth() + 1;
        let max = self.settings.max_nesting_depth;
        if depth > max {
            malformed!(Malformed::TooDeep { depth, max })
        }
        let start = self.buffer.position();
        let size = self.read_size(min)?;
        self.contexts.push(Context { kind, start, size });
        self.state = kind.state();
        trace!(?kind, start, size, "opened container");
        Ok(())
    }

    /// Checks and pops the innermost container.
    fn close_container(&mut self) -> Result<(), Error> {
        if let Some(context) = self.contexts.top().cloned() {
            let actual = self.buffer.position() - context.start;
            if actual != context.size {
                malformed!(Malformed::SizeMismatch {
                    declared: context.size,
                    actual,
                })
            }
            self.contexts.pop();
            trace!(kind = ?context.kind, size = actual, "closed container");
        }
        self.state = match self.contexts.top() {
            Some(parent) => parent.kind.state(),
            None => State::Done,
        };
        Ok(())
    }

    fn read_terminator(&mut self) -> Result<(), Error> {
        if self.buffer.peek_u8()? != 0 {
            malformed!(Malformed::MissingTerminator)
        }
        self.buffer.read_u8()?;
        Ok(())
    }

    /// Consumes the tag and name of the next element if they match.
    fn read_element_header(
        &mut self,
        operation: &'static str,
        expected: ElementType,
        name: &str,
    ) -> Result<(), Error> {
        check_element_state(operation, self.state)?;
        let start = self.buffer.position();
        let found = ElementType::from_u8(self.buffer.peek_u8()?)?;
        if found != expected {
            malformed!(Malformed::WrongType { expected, found })
        }
        self.buffer.read_u8()?;
        let actual = self.buffer.read_cstring()?;
        if actual != name {
            self.buffer.set_position(start)?;
            malformed!(Malformed::NameMismatch {
                expected: name.to_owned(),
                found: actual,
            })
        }
        Ok(())
    }

    /// Advances past a value using the skip table.
    fn skip_value(&mut self, element_type: ElementType) -> Result<(), Error> {
        match element_type.skip_rule() {
            SkipRule::Fixed(len) => self.buffer.skip(len)?,
            SkipRule::LengthPrefixed => {
                let len = self.read_size(MIN_STRING_SIZE)?;
                self.buffer.skip(len)?
            }
            SkipRule::Binary => {
                let len = self.read_size(0)?;
                self.buffer.skip(len + 1)?
            }
            SkipRule::Container => {
                let len = self.read_size(MIN_DOCUMENT_SIZE)?;
                self.buffer.skip(len - 4)?
            }
            SkipRule::CStringPair => {
                self.buffer.skip_cstring()?;
                self.buffer.skip_cstring()?
            }
        }
        Ok(())
    }

    /// Indicates whether the current container has another element.
    pub fn has_element(&self) -> Result<bool, Error> {
        check_element_state("has_element", self.state)?;
        Ok(self.buffer.peek_u8()? != 0)
    }

    /// The type of the next element, [`ElementType::EndOfDocument`] at the end of the
    /// container.
    pub fn peek_type(&self) -> Result<ElementType, Error> {
        check_element_state("peek_type", self.state)?;
        Ok(ElementType::from_u8(self.buffer.peek_u8()?)?)
    }

    /// The name of the next element, `None` at the end of the container.
    pub fn peek_name(&mut self) -> Result<Option<String>, Error> {
        check_element_state("peek_name", self.state)?;
        let start = self.buffer.position();
        if self.buffer.read_u8()? == 0 {
            self.buffer.set_position(start)?;
            return Ok(None);
        }
        let name = self.buffer.read_cstring();
        self.buffer.set_position(start)?;
        Ok(Some(name?))
    }

    /// Advances past the next element without decoding it. Returns `false`, consuming
    /// nothing, at the end of the container.
    pub fn skip_element(&mut self) -> Result<bool, Error> {
        let element_type = self.peek_type()?;
        if element_type == ElementType::EndOfDocument {
            return Ok(false);
        }
        self.buffer.read_u8()?;
        self.buffer.skip_cstring()?;
        self.skip_value(element_type)?;
        Ok(true)
    }

    /// Looks for a `String` element named `name` among the elements of the current
    /// container, from its first element, without descending into nested containers.
    /// The cursor is left where it was.
    ///
    /// # Example
    ///
    /// ```
    /// use bson_io::prelude::*;
    ///
    /// let mut doc = Document::new();
    /// doc.insert("n", 1);
    /// doc.insert("ns", "db.coll");
    /// let bytes = encode_full(&doc).unwrap();
    ///
    /// let mut r = BinaryReader::new(&bytes, BinaryReaderSettings::default());
    /// r.read_start_document().unwrap();
    /// assert_eq!(r.find_string("ns").unwrap(), Some("db.coll".to_string()));
    /// assert_eq!(r.find_string("n").unwrap(), None);
    /// assert_eq!(r.read_int32("n").unwrap(), 1);
    /// ```
    pub fn find_string(&mut self, name: &str) -> Result<Option<String>, Error> {
        check_element_state("find_string", self.state)?;
        let (first, end) = match self.contexts.top() {
            Some(context) => (context.start + 4, context.start + context.size),
            None => return Ok(None),
        };
        let saved = self.buffer.position();
        let found = self.scan_for_string(name, first, end);
        self.buffer.set_position(saved)?;
        trace!(name, found = found.as_ref().map(Option::is_some).unwrap_or(false), "find_string");
        found
    }

    fn scan_for_string(
        &mut self,
        name: &str,
        first: usize,
        end: usize,
    ) -> Result<Option<String>, Error> {
        self.buffer.set_position(first)?;
        loop {
            if self.buffer.position() >= end {
                malformed!(Malformed::MissingTerminator)
            }
            let tag = self.buffer.read_u8()?;
            if tag == 0 {
                return Ok(None);
            }
            let element_type = ElementType::from_u8(tag)?;
            let element_name = self.buffer.read_cstring()?;
            if element_type == ElementType::String && element_name == name {
                return self.read_sized_string().map(Some);
            }
            self.skip_value(element_type)?;
        }
    }

    /// Starts a top level document, or the scope document of a JavaScript with scope
    /// value. A buffer may hold several top level documents back to back.
    pub fn read_start_document(&mut self) -> Result<(), Error> {
        check_state("read_start_document", self.state, |s| {
            s.at_top_level() || s == State::JavaScriptWithScope
        })?;
        let kind = if self.state == State::JavaScriptWithScope {
            ContextType::ScopeDocument
        } else {
            ContextType::Document
        };
        self.open(kind, MIN_DOCUMENT_SIZE)
    }

    /// Ends the innermost document. Ending a scope document also ends its JavaScript
    /// with scope value.
    pub fn read_end_document(&mut self) -> Result<(), Error> {
        check_state("read_end_document", self.state, State::closes_document)?;
        self.read_terminator()?;
        self.close_container()?;
        if self.state == State::JavaScriptWithScope {
            self.close_container()?;
        }
        Ok(())
    }

    pub fn read_start_embedded_document(&mut self, name: &str) -> Result<(), Error> {
        self.read_element_header("read_start_embedded_document", ElementType::Document, name)?;
        self.open(ContextType::EmbeddedDocument, MIN_DOCUMENT_SIZE)
    }

    pub fn read_start_array(&mut self, name: &str) -> Result<(), Error> {
        self.read_element_header("read_start_array", ElementType::Array, name)?;
        self.open(ContextType::Array, MIN_DOCUMENT_SIZE)
    }

    pub fn read_end_array(&mut self) -> Result<(), Error> {
        check_state("read_end_array", self.state, |s| s == State::Array)?;
        self.read_terminator()?;
        self.close_container()
    }

    /// Reads the code of a JavaScript with scope value. The scope document is read next,
    /// starting with [`BinaryReader::read_start_document`].
    pub fn read_start_javascript_with_scope(&mut self, name: &str) -> Result<String, Error> {
        self.read_element_header(
            "read_start_javascript_with_scope",
            ElementType::JavaScriptWithScope,
            name,
        )?;
        self.open(ContextType::JavaScriptWithScope, MIN_CODE_WITH_SCOPE_SIZE)?;
        self.read_sized_string()
    }

    pub fn read_double(&mut self, name: &str) -> Result<f64, Error> {
        self.read_element_header("read_double", ElementType::Double, name)?;
        Ok(self.buffer.read_f64()?)
    }

    pub fn read_string(&mut self, name: &str) -> Result<String, Error> {
        self.read_element_header("read_string", ElementType::String, name)?;
        self.read_sized_string()
    }

    pub fn read_binary(&mut self, name: &str) -> Result<Binary, Error> {
        self.read_element_header("read_binary", ElementType::Binary, name)?;
        let size = self.read_size(0)?;
        let mut subtype = BinarySubType::from(self.buffer.read_u8()?);
        let len = if subtype == BinarySubType::OldBinary {
            let inner = self.read_size(0)?;
            if size.checked_sub(4) != Some(inner) {
                malformed!(Malformed::InconsistentBinaryLength)
            }
            if self.settings.fix_old_binary_subtype_on_input {
                debug!(name, "reading OldBinary sub type as Generic");
                subtype = BinarySubType::Generic;
            }
            inner
        } else {
            size
        };
        let bytes = self.buffer.read_bytes(len)?;
        Ok(Binary { subtype, bytes })
    }

    pub fn read_object_id(&mut self, name: &str) -> Result<ObjectId, Error> {
        self.read_element_header("read_object_id", ElementType::ObjectId, name)?;
        let mut raw = [0u8; 12];
        raw.copy_from_slice(&self.buffer.read_bytes(12)?);
        Ok(ObjectId::from_bytes(raw))
    }

    pub fn read_boolean(&mut self, name: &str) -> Result<bool, Error> {
        self.read_element_header("read_boolean", ElementType::Boolean, name)?;
        match self.buffer.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => malformed!(Malformed::InvalidBoolean(b)),
        }
    }

    /// Reads a date. The value for 10000-01-01 is read as the last millisecond of 9999,
    /// the largest date other drivers will produce.
    pub fn read_date_time(&mut self, name: &str) -> Result<DateTime<Utc>, Error> {
        self.read_element_header("read_date_time", ElementType::DateTime, name)?;
        let mut millis = self.buffer.read_i64()?;
        if millis == DATE_TIME_MAX_SENTINEL {
            millis = DATE_TIME_MAX_MILLIS;
        }
        match DateTime::<Utc>::from_timestamp_millis(millis) {
            Some(date) => Ok(date),
            None => malformed!(Malformed::DateOutOfRange(millis)),
        }
    }

    pub fn read_null(&mut self, name: &str) -> Result<(), Error> {
        self.read_element_header("read_null", ElementType::Null, name)
    }

    pub fn read_regular_expression(&mut self, name: &str) -> Result<Regex, Error> {
        self.read_element_header("read_regular_expression", ElementType::RegularExpression, name)?;
        let pattern = self.buffer.read_cstring()?;
        let options = self.buffer.read_cstring()?;
        Ok(Regex { pattern, options })
    }

    pub fn read_javascript(&mut self, name: &str) -> Result<String, Error> {
        self.read_element_header("read_javascript", ElementType::JavaScript, name)?;
        self.read_sized_string()
    }

    pub fn read_symbol(&mut self, name: &str) -> Result<String, Error> {
        self.read_element_header("read_symbol", ElementType::Symbol, name)?;
        self.read_sized_string()
    }

    pub fn read_int32(&mut self, name: &str) -> Result<i32, Error> {
        self.read_element_header("read_int32", ElementType::Int32, name)?;
        Ok(self.buffer.read_i32()?)
    }

    pub fn read_timestamp(&mut self, name: &str) -> Result<i64, Error> {
        self.read_element_header("read_timestamp", ElementType::Timestamp, name)?;
        Ok(self.buffer.read_i64()?)
    }

    pub fn read_int64(&mut self, name: &str) -> Result<i64, Error> {
        self.read_element_header("read_int64", ElementType::Int64, name)?;
        Ok(self.buffer.read_i64()?)
    }

    pub fn read_min_key(&mut self, name: &str) -> Result<(), Error> {
        self.read_element_header("read_min_key", ElementType::MinKey, name)
    }

    pub fn read_max_key(&mut self, name: &str) -> Result<(), Error> {
        self.read_element_header("read_max_key", ElementType::MaxKey, name)
    }
}
