//! The binary encoder.
//!
//! Lengths are not known when a container is opened, so the writer reserves four bytes
//! for each one and backpatches the exact byte count when the container is closed.

use super::{
    buffer::{length_field, BsonBuffer},
    check_element_state, check_state,
    context::{Context, ContextStack, ContextType},
    BsonWriter, State,
};
use crate::{
    constants::DEFAULT_MAX_DOCUMENT_SIZE,
    element::{BinarySubType, ElementType},
    errors::{Error, Malformed},
    values::{Binary, ObjectId},
};
use chrono::{DateTime, Utc};
use std::io;
use tracing::{debug, trace};

/// Settings for a [`BinaryWriter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinaryWriterSettings {
    /// Largest container the writer will produce.
    pub max_document_size: usize,
    /// Write binary values of sub type [`BinarySubType::OldBinary`] as
    /// [`BinarySubType::Generic`] in the modern layout.
    pub fix_old_binary_subtype_on_output: bool,
}

impl Default for BinaryWriterSettings {
    fn default() -> Self {
        BinaryWriterSettings {
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            fix_old_binary_subtype_on_output: true,
        }
    }
}

/// Writes BSON into a buffer, and optionally from there into an owned destination.
///
/// # Example
///
/// ```
/// use bson_io::prelude::*;
///
/// let mut w = BinaryWriter::with_output(Vec::new(), BinaryWriterSettings::default());
/// w.write_start_document().unwrap();
/// w.write_boolean("ok", true).unwrap();
/// w.write_end_document().unwrap();
/// w.flush().unwrap();
///
/// assert_eq!(w.get_ref().map(|v| v.len()), Some(10));
/// ```
#[derive(Debug)]
pub struct BinaryWriter<W = io::Sink> {
    buffer: BsonBuffer,
    output: Option<W>,
    settings: BinaryWriterSettings,
    max_document_sizes: Vec<usize>,
    contexts: ContextStack<Context>,
    state: State,
}

impl BinaryWriter<io::Sink> {
    /// Creates a writer that keeps its output in memory, see [`BinaryWriter::into_bytes`].
    pub fn new(settings: BinaryWriterSettings) -> Self { BinaryWriter::build(None, settings) }
}

impl<W: io::Write> BinaryWriter<W> {
    /// Creates a writer that hands completed documents to `output` on
    /// [`BsonWriter::flush`].
    pub fn with_output(output: W, settings: BinaryWriterSettings) -> Self {
        BinaryWriter::build(Some(output), settings)
    }

    fn build(output: Option<W>, settings: BinaryWriterSettings) -> Self {
        BinaryWriter {
            buffer: BsonBuffer::new(),
            output,
            settings,
            max_document_sizes: vec![settings.max_document_size],
            contexts: ContextStack::new(),
            state: State::Initial,
        }
    }

    /// The bytes written and not yet flushed.
    pub fn buffer(&self) -> &BsonBuffer { &self.buffer }

    /// Consumes the writer, returning the bytes written and not yet flushed.
    pub fn into_bytes(self) -> Vec<u8> { self.buffer.into_vec() }

    /// The owned destination, if any.
    pub fn get_ref(&self) -> Option<&W> { self.output.as_ref() }

    /// The limit in effect.
    pub fn max_document_size(&self) -> usize {
        self.max_document_sizes
            .last()
            .cloned()
            .unwrap_or(self.settings.max_document_size)
    }

    /// Tightens the limit until the matching [`BinaryWriter::pop_max_document_size`].
    /// A larger value than the one in effect has no effect.
    pub fn push_max_document_size(&mut self, max_document_size: usize) {
        let effective = max_document_size.min(self.max_document_size());
        self.max_document_sizes.push(effective);
    }

    /// Restores the limit in effect before the last push.
    pub fn pop_max_document_size(&mut self) {
        if self.max_document_sizes.len() > 1 {
            self.max_document_sizes.pop();
        }
    }

    fn open(&mut self, kind: ContextType) {
        let start = self.buffer.position();
        self.contexts.push(Context {
            kind,
            start,
            size: 0,
        });
        self.buffer.write_i32(0);
        self.state = kind.state();
        trace!(?kind, start, "opened container");
    }

    /// Checks that every container ended by the next terminator fits the limit: the
    /// innermost one, and the code with scope value a scope document belongs to.
    /// Nothing is written, so a failed end leaves the writer as it was.
    fn check_end_fits(&self) -> Result<(), Error> {
        let end = self.buffer.position() + 1;
        let max = self.max_document_size();
        let scope_owner = self
            .contexts
            .parent()
            .filter(|c| c.kind == ContextType::JavaScriptWithScope);
        for context in self.contexts.top().into_iter().chain(scope_owner) {
            let size = end - context.start;
            if size > max {
                malformed!(Malformed::DocumentTooLarge { size, max })
            }
            length_field(size)?;
        }
        Ok(())
    }

    /// Backpatches and pops the innermost container. The terminator must already be
    /// written and the size checked by [`BinaryWriter::check_end_fits`].
    fn close_container(&mut self) -> Result<(), Error> {
        if let Some(context) = self.contexts.pop() {
            let size = self.buffer.position() - context.start;
            self.buffer.backpatch(context.start, length_field(size)?);
            trace!(kind = ?context.kind, size, "closed container");
        }
        self.state = match self.contexts.top() {
            Some(parent) => parent.kind.state(),
            None => State::Done,
        };
        Ok(())
    }

    fn write_element_header(
        &mut self,
        operation: &'static str,
        element_type: ElementType,
        name: &str,
    ) -> Result<(), Error> {
        check_element_state(operation, self.state)?;
        check_cstring(name)?;
        self.buffer.write_u8(element_type.to_u8());
        self.buffer.write_cstring(name)?;
        Ok(())
    }
}

fn check_cstring(s: &str) -> Result<(), Error> {
    if s.as_bytes().contains(&0) {
        malformed!(Malformed::NullInCString(s.to_owned()))
    }
    Ok(())
}

impl<W: io::Write> BsonWriter for BinaryWriter<W> {
    fn state(&self) -> State { self.state }

    fn close(&mut self) {
        if self.state == State::Closed {
            return;
        }
        if self.state == State::Done && self.output.is_some() {
            if let Err(e) = self.flush() {
                debug!(error = %e, "flush on close failed");
            }
        }
        self.contexts.clear();
        self.state = State::Closed;
        debug!("binary writer closed");
    }

    fn flush(&mut self) -> Result<(), Error> {
        check_state("flush", self.state, |s| s == State::Done)?;
        if let Some(output) = self.output.as_mut() {
            output.write_all(self.buffer.as_slice())?;
            output.flush()?;
            debug!(bytes = self.buffer.len(), "flushed");
            self.buffer.clear();
        }
        Ok(())
    }

    fn write_start_document(&mut self) -> Result<(), Error> {
        check_state("write_start_document", self.state, |s| {
            s.at_top_level() || s == State::JavaScriptWithScope
        })?;
        let kind = if self.state == State::JavaScriptWithScope {
            ContextType::ScopeDocument
        } else {
            ContextType::Document
        };
        self.open(kind);
        Ok(())
    }

    fn write_end_document(&mut self) -> Result<(), Error> {
        check_state("write_end_document", self.state, State::closes_document)?;
        self.check_end_fits()?;
        self.buffer.write_u8(0);
        self.close_container()?;
        // the scope closes its code with scope value
        if self.state == State::JavaScriptWithScope {
            self.close_container()?;
        }
        Ok(())
    }

    fn write_start_embedded_document(&mut self, name: &str) -> Result<(), Error> {
        self.write_element_header("write_start_embedded_document", ElementType::Document, name)?;
        self.open(ContextType::EmbeddedDocument);
        Ok(())
    }

    fn write_start_array(&mut self, name: &str) -> Result<(), Error> {
        self.write_element_header("write_start_array", ElementType::Array, name)?;
        self.open(ContextType::Array);
        Ok(())
    }

    fn write_end_array(&mut self) -> Result<(), Error> {
        check_state("write_end_array", self.state, |s| s == State::Array)?;
        self.check_end_fits()?;
        self.buffer.write_u8(0);
        self.close_container()
    }

    fn write_start_javascript_with_scope(&mut self, name: &str, code: &str) -> Result<(), Error> {
        length_field(code.len() + 1)?;
        self.write_element_header(
            "write_start_javascript_with_scope",
            ElementType::JavaScriptWithScope,
            name,
        )?;
        self.open(ContextType::JavaScriptWithScope);
        self.buffer.write_string(code)?;
        Ok(())
    }

    fn write_double(&mut self, name: &str, value: f64) -> Result<(), Error> {
        self.write_element_header("write_double", ElementType::Double, name)?;
        self.buffer.write_f64(value);
        Ok(())
    }

    fn write_string(&mut self, name: &str, value: &str) -> Result<(), Error> {
        length_field(value.len() + 1)?;
        self.write_element_header("write_string", ElementType::String, name)?;
        self.buffer.write_string(value)?;
        Ok(())
    }

    fn write_binary(&mut self, name: &str, value: &Binary) -> Result<(), Error> {
        let mut subtype = value.subtype;
        if subtype == BinarySubType::OldBinary && self.settings.fix_old_binary_subtype_on_output {
            debug!(name, "writing OldBinary sub type as Generic");
            subtype = BinarySubType::Generic;
        }
        let len = length_field(value.bytes.len())?;
        let outer = length_field(value.bytes.len() + 4)?;
        self.write_element_header("write_binary", ElementType::Binary, name)?;
        if subtype == BinarySubType::OldBinary {
            self.buffer.write_i32(outer);
            self.buffer.write_u8(subtype.into());
            self.buffer.write_i32(len);
        } else {
            self.buffer.write_i32(len);
            self.buffer.write_u8(subtype.into());
        }
        self.buffer.write_bytes(&value.bytes);
        Ok(())
    }

    fn write_object_id(&mut self, name: &str, value: ObjectId) -> Result<(), Error> {
        self.write_element_header("write_object_id", ElementType::ObjectId, name)?;
        self.buffer.write_bytes(&value.bytes());
        Ok(())
    }

    fn write_boolean(&mut self, name: &str, value: bool) -> Result<(), Error> {
        self.write_element_header("write_boolean", ElementType::Boolean, name)?;
        self.buffer.write_u8(value as u8);
        Ok(())
    }

    fn write_date_time(&mut self, name: &str, value: DateTime<Utc>) -> Result<(), Error> {
        self.write_element_header("write_date_time", ElementType::DateTime, name)?;
        self.buffer.write_i64(value.timestamp_millis());
        Ok(())
    }

    fn write_null(&mut self, name: &str) -> Result<(), Error> {
        self.write_element_header("write_null", ElementType::Null, name)
    }

    fn write_regular_expression(
        &mut self,
        name: &str,
        pattern: &str,
        options: &str,
    ) -> Result<(), Error> {
        check_cstring(pattern)?;
        check_cstring(options)?;
        self.write_element_header(
            "write_regular_expression",
            ElementType::RegularExpression,
            name,
        )?;
        self.buffer.write_cstring(pattern)?;
        self.buffer.write_cstring(options)?;
        Ok(())
    }

    fn write_javascript(&mut self, name: &str, code: &str) -> Result<(), Error> {
        length_field(code.len() + 1)?;
        self.write_element_header("write_javascript", ElementType::JavaScript, name)?;
        self.buffer.write_string(code)?;
        Ok(())
    }

    fn write_symbol(&mut self, name: &str, value: &str) -> Result<(), Error> {
        length_field(value.len() + 1)?;
        self.write_element_header("write_symbol", ElementType::Symbol, name)?;
        self.buffer.write_string(value)?;
        Ok(())
    }

    fn write_int32(&mut self, name: &str, value: i32) -> Result<(), Error> {
        self.write_element_header("write_int32", ElementType::Int32, name)?;
        self.buffer.write_i32(value);
        Ok(())
    }

    fn write_timestamp(&mut self, name: &str, value: i64) -> Result<(), Error> {
        self.write_element_header("write_timestamp", ElementType::Timestamp, name)?;
        self.buffer.write_i64(value);
        Ok(())
    }

    fn write_int64(&mut self, name: &str, value: i64) -> Result<(), Error> {
        self.write_element_header("write_int64", ElementType::Int64, name)?;
        self.buffer.write_i64(value);
        Ok(())
    }

    fn write_min_key(&mut self, name: &str) -> Result<(), Error> {
        self.write_element_header("write_min_key", ElementType::MinKey, name)
    }

    fn write_max_key(&mut self, name: &str) -> Result<(), Error> {
        self.write_element_header("write_max_key", ElementType::MaxKey, name)
    }
}
