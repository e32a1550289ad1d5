//! # bson-io
//!
//! Readers and writers for BSON, the length-prefixed, self-describing binary document
//! format used on the wire and on disk by document databases.
//!
//! # Usage
//!
//! Whole documents go through [`encode_full`] and [`decode_full`]:
//!
//! ```
//! use bson_io::prelude::*;
//!
//! let mut doc = Document::new();
//! doc.insert("x", 1);
//!
//! let bytes = encode_full(&doc).unwrap();
//! assert_eq!(bytes, vec![12, 0, 0, 0, 0x10, b'x', 0, 1, 0, 0, 0, 0]);
//!
//! let decoded = decode_full(&bytes).unwrap();
//! assert_eq!(decoded, doc);
//! ```
//!
//! For streaming, drive a [`BinaryReader`] or any [`BsonWriter`] directly. Both are state
//! machines: every call is checked against the container currently open, and the reader
//! checks every length it is handed.
//!
//! ```
//! use bson_io::prelude::*;
//!
//! let mut w = BinaryWriter::new(BinaryWriterSettings::default());
//! w.write_start_document().unwrap();
//! w.write_string("name", "tbl").unwrap();
//! w.write_start_array("tags").unwrap();
//! w.write_int32("0", 7).unwrap();
//! w.write_end_array().unwrap();
//! w.write_end_document().unwrap();
//! let bytes = w.into_bytes();
//!
//! let mut r = BinaryReader::new(&bytes, BinaryReaderSettings::default());
//! r.read_start_document().unwrap();
//! assert_eq!(r.find_string("name").unwrap(), Some("tbl".to_string()));
//! assert_eq!(r.read_string("name").unwrap(), "tbl");
//! r.read_start_array("tags").unwrap();
//! assert_eq!(r.read_int32("0").unwrap(), 7);
//! r.read_end_array().unwrap();
//! r.read_end_document().unwrap();
//! ```
//!
//! The same calls against a [`JsonWriter`] produce text instead, see [`io::json_writer`].
//!
//! # Specification
//!
//! All integers are little endian.
//!
//! ## Documents
//!
//! | int32        | elements    | 0x00       |
//! | ---          | ---         | ---        |
//! | Total length | Zero or more | Terminator |
//!
//! The total length counts itself and the terminator, so the empty document is
//! `05 00 00 00 00`.
//!
//! ## Elements
//!
//! | u8   | cstring | ...   |
//! | ---  | ---     | ---   |
//! | Type | Name    | Value |
//!
//! Names are UTF-8 terminated by a single null byte. Arrays are documents whose names are
//! `"0"`, `"1"`, and so on.
//!
//! ## Values
//!
//! | Tag    | Type                  | Encoding                                     |
//! | ---    | ---                   | ---                                          |
//! | `0x01` | Double                | 8 byte IEEE 754                              |
//! | `0x02` | String                | int32 length (with terminator), UTF-8, 0x00  |
//! | `0x03` | Document              | document                                     |
//! | `0x04` | Array                 | document                                     |
//! | `0x05` | Binary                | int32 length, u8 sub type, bytes             |
//! | `0x07` | ObjectId              | 12 bytes                                     |
//! | `0x08` | Boolean               | 0x00 or 0x01                                 |
//! | `0x09` | DateTime              | int64 milliseconds since the epoch           |
//! | `0x0a` | Null                  | nothing                                      |
//! | `0x0b` | RegularExpression     | cstring pattern, cstring options             |
//! | `0x0d` | JavaScript            | string                                       |
//! | `0x0e` | Symbol                | string                                       |
//! | `0x0f` | JavaScriptWithScope   | int32 total length, string code, document    |
//! | `0x10` | Int32                 | int32                                        |
//! | `0x11` | Timestamp             | int64                                        |
//! | `0x12` | Int64                 | int64                                        |
//! | `0xff` | MinKey                | nothing                                      |
//! | `0x7f` | MaxKey                | nothing                                      |
//!
//! Binary sub type `0x02` is an obsolete form that repeats the length:
//! `int32 (length + 4), 0x02, int32 length, bytes`.
//!
//! A DateTime of `253402300800000` (10000-01-01) decodes to the largest representable
//! date, 9999-12-31T23:59:59.999Z.

#![warn(
//    missing_docs,
    deprecated_in_future,
    unsafe_code,
    unused_labels,
    keyword_idents,
    missing_copy_implementations,
    missing_debug_implementations,
    macro_use_extern_crate,
    unreachable_pub,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces
)]
#![allow(clippy::cast_lossless)]

#[macro_use]
mod util;
#[macro_use]
pub mod errors;

mod constants;
pub mod document;
pub mod element;
pub mod encoding;
pub mod io;
pub mod prelude;
pub mod values;

pub use crate::{
    document::Document,
    encoding::{decode_full, encode_full},
    errors::Error,
    io::{BinaryReader, BinaryWriter, BsonWriter, JsonWriter},
};

use chrono::{DateTime, Utc};
use element::ElementType;
use std::collections::BTreeMap;
use values::{Binary, JavaScriptWithScope, ObjectId, Regex};

#[derive(PartialEq, Clone, Debug)]
/// A BSON value.
///
/// # Example
///
/// ```
/// use bson_io::prelude::*;
///
/// let b = Bson::from(true);
///
/// let val = match b {
///     Bson::Boolean(b) => b,
///     _ => panic!(),
/// };
///
/// assert!(val);
/// ```
pub enum Bson {
    /// 64-bit floating point.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Embedded document.
    Document(Document),
    /// Array.
    Array(Vec<Bson>),
    /// Binary data.
    Binary(Binary),
    ObjectId(ObjectId),
    Boolean(bool),
    /// UTC datetime with millisecond precision.
    DateTime(DateTime<Utc>),
    Null,
    RegularExpression(Regex),
    /// JavaScript code.
    JavaScript(String),
    Symbol(String),
    JavaScriptWithScope(JavaScriptWithScope),
    Int32(i32),
    /// Internal replication timestamp.
    Timestamp(i64),
    Int64(i64),
    MinKey,
    MaxKey,
}


impl Bson {
    /// The element type this value is encoded as.
    ///
    /// # Example
    ///
    /// ```
    /// use bson_io::prelude::*;
    ///
    /// assert_eq!(Bson::from(1i64).element_type(), ElementType::Int64);
    /// ```
    pub fn element_type(&self) -> ElementType {
        match self {
            Bson::Double(_) => ElementType::Double,
            Bson::String(_) => ElementType::String,
            Bson::Document(_) => ElementType::Document,
            Bson::Array(_) => ElementType::Array,
            Bson::Binary(_) => ElementType::Binary,
            Bson::ObjectId(_) => ElementType::ObjectId,
            Bson::Boolean(_) => ElementType::Boolean,
            Bson::DateTime(_) => ElementType::DateTime,
            Bson::Null => ElementType::Null,
            Bson::RegularExpression(_) => ElementType::RegularExpression,
            Bson::JavaScript(_) => ElementType::JavaScript,
            Bson::Symbol(_) => ElementType::Symbol,
            Bson::JavaScriptWithScope(_) => ElementType::JavaScriptWithScope,
            Bson::Int32(_) => ElementType::Int32,
            Bson::Timestamp(_) => ElementType::Timestamp,
            Bson::Int64(_) => ElementType::Int64,
            Bson::MinKey => ElementType::MinKey,
            Bson::MaxKey => ElementType::MaxKey,
        }
    }

    /// Indicates whether a value is [`Bson::Null`].
    pub fn is_null(&self) -> bool {
        match self {
            Bson::Null => true,
            _ => false,
        }
    }

    /// The string, if this is a [`Bson::String`].
    ///
    /// # Example
    ///
    /// ```
    /// use bson_io::prelude::*;
    ///
    /// assert_eq!(Bson::from("a").as_str(), Some("a"));
    /// assert_eq!(Bson::Null.as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Bson::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Bson::Int32(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Bson::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Bson::Double(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Bson::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Bson::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Bson>> {
        match self {
            Bson::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl From<&str> for Bson {
    fn from(s: &str) -> Bson { Bson::String(s.to_owned()) }
}

impl<T: Into<Bson>> From<Vec<T>> for Bson {
    fn from(v: Vec<T>) -> Bson { Bson::Array(v.into_iter().map(T::into).collect()) }
}

from_fn!(Bson, f64, Bson::Double);
from_fn!(Bson, String, Bson::String);
from_fn!(Bson, Document, Bson::Document);
from_fn!(Bson, Binary, Bson::Binary);
from_fn!(Bson, ObjectId, Bson::ObjectId);
from_fn!(Bson, bool, Bson::Boolean);
from_fn!(Bson, DateTime<Utc>, Bson::DateTime);
from_fn!(Bson, Regex, Bson::RegularExpression);
from_fn!(Bson, JavaScriptWithScope, Bson::JavaScriptWithScope);
from_fn!(Bson, i32, Bson::Int32);
from_fn!(Bson, i64, Bson::Int64);

// Narrow integers and floats widen
from_as!(Bson, i8, i32);
from_as!(Bson, u8, i32);
from_as!(Bson, i16, i32);
from_as!(Bson, u16, i32);
from_as!(Bson, u32, i64);
from_as!(Bson, f32, f64);

compose_from!(Bson, Document, BTreeMap<String, Bson>);
