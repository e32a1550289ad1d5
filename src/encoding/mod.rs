//! # Document encoding and decoding
//!
//! Functions that drive a [`BsonWriter`] from a [`Document`] and build a [`Document`]
//! back from a [`BinaryReader`].
//!
//! # Example
//!
//! ```
//! use bson_io::prelude::*;
//!
//! let mut doc = Document::new();
//! doc.insert("name", "widget");
//! doc.insert("tags", vec![Bson::from("a"), Bson::from("b")]);
//!
//! // encode in one go
//! let enc_full = encode_full(&doc).unwrap();
//!
//! // or through a writer we own
//! let mut w = BinaryWriter::new(BinaryWriterSettings::default());
//! encode(&doc, &mut w).unwrap();
//!
//! // both are the same bytes
//! assert_eq!(w.into_bytes(), enc_full);
//!
//! // and decoding gives the document back
//! let dec = decode_full(&enc_full).unwrap();
//! assert_eq!(dec, doc);
//!
//! // the same writer calls produce JSON
//! let json = to_json(&doc, JsonWriterSettings::default()).unwrap();
//! assert_eq!(json, r#"{ "name" : "widget", "tags" : ["a", "b"] }"#);
//! ```

use crate::{
    element::ElementType,
    errors::{Error, Malformed},
    io::{
        BinaryReader, BinaryReaderSettings, BinaryWriter, BinaryWriterSettings, BsonWriter,
        JsonWriter, JsonWriterSettings,
    },
    values::JavaScriptWithScope,
    Bson, Document,
};

pub mod ser;
pub use ser::*;
pub mod de;
pub use de::*;

/// Writes `doc` as a top level document through `w`.
///
/// # Arguments
///
/// * `doc: &Document` - The document to write.
/// * `w: &mut W` - Any [`BsonWriter`] in its initial or done state.
///
/// # Example
///
/// ```
/// use bson_io::prelude::*;
///
/// let mut doc = Document::new();
/// doc.insert("x", 1);
///
/// let mut w = BinaryWriter::new(BinaryWriterSettings::default());
/// encode(&doc, &mut w).unwrap();
///
/// assert_eq!(w.state(), State::Done);
/// assert_eq!(w.into_bytes(), vec![12, 0, 0, 0, 0x10, b'x', 0, 1, 0, 0, 0, 0]);
/// ```
pub fn encode<W: BsonWriter>(doc: &Document, w: &mut W) -> Result<(), Error> {
    w.write_start_document()?;
    ser_elements(doc, w)?;
    w.write_end_document()
}

/// Reads one top level document from `r`.
///
/// If two elements share a name, the later value wins.
///
/// # Example
///
/// ```
/// use bson_io::prelude::*;
///
/// let bytes = [12, 0, 0, 0, 0x10, b'x', 0, 1, 0, 0, 0, 0];
/// let mut r = BinaryReader::new(&bytes, BinaryReaderSettings::default());
///
/// let doc = decode(&mut r).unwrap();
/// assert_eq!(doc.get("x"), Some(&Bson::Int32(1)));
/// assert!(r.is_at_end_of_file());
/// ```
pub fn decode(r: &mut BinaryReader) -> Result<Document, Error> {
    r.read_start_document()?;
    let doc = de_elements(r)?;
    r.read_end_document()?;
    Ok(doc)
}

/// Encodes `doc` into a new buffer with the default [`BinaryWriterSettings`].
///
/// # Errors
///
/// Fails if an element name contains a null byte or the document exceeds the default
/// maximum size.
pub fn encode_full(doc: &Document) -> Result<Vec<u8>, Error> {
    let mut w = BinaryWriter::new(BinaryWriterSettings::default());
    encode(doc, &mut w)?;
    Ok(w.into_bytes())
}

/// Decodes `bytes`, which must hold exactly one document, with the default
/// [`BinaryReaderSettings`].
///
/// # Errors
///
/// Fails with [`Malformed::SizeMismatch`] if bytes remain after the document, and with
/// the reader's error if the document itself is malformed.
pub fn decode_full(bytes: &[u8]) -> Result<Document, Error> {
    let mut r = BinaryReader::new(bytes, BinaryReaderSettings::default());
    let doc = decode(&mut r)?;
    if !r.is_at_end_of_file() {
        malformed!(Malformed::SizeMismatch {
            declared: r.position(),
            actual: bytes.len(),
        });
    }
    Ok(doc)
}

/// Renders `doc` as JSON text.
///
/// # Example
///
/// ```
/// use bson_io::prelude::*;
///
/// let mut doc = Document::new();
/// doc.insert("_id", ObjectId::from_bytes([0xab; 12]));
///
/// let strict = to_json(&doc, JsonWriterSettings::default()).unwrap();
/// assert_eq!(strict, r#"{ "_id" : { "$oid" : "abababababababababababab" } }"#);
///
/// let shell = JsonWriterSettings {
///     output_mode: JsonOutputMode::TenGen,
///     ..JsonWriterSettings::default()
/// };
/// assert_eq!(
///     to_json(&doc, shell).unwrap(),
///     r#"{ "_id" : ObjectId("abababababababababababab") }"#
/// );
/// ```
pub fn to_json(doc: &Document, settings: JsonWriterSettings) -> Result<String, Error> {
    let mut w = JsonWriter::new(String::new(), settings);
    encode(doc, &mut w)?;
    Ok(w.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        element::BinarySubType,
        io::State,
        values::{Binary, ObjectId, Regex},
    };
    use chrono::{TimeZone, Utc};

    fn every_type() -> Document {
        let mut scope = Document::new();
        scope.insert("x", 1);

        let mut inner = Document::new();
        inner.insert("a", Bson::Null);

        let mut doc = Document::new();
        doc.insert("double", 1.5);
        doc.insert("string", "hi");
        doc.insert("document", inner);
        doc.insert("array", vec![Bson::Int32(1), Bson::from("two")]);
        doc.insert("binary", Binary::generic(vec![1, 2, 3]));
        doc.insert("oid", ObjectId::from_bytes([7; 12]));
        doc.insert("bool", true);
        doc.insert("date", Utc.timestamp_millis_opt(1_234_567).unwrap());
        doc.insert("null", Bson::Null);
        doc.insert("regex", Regex::new("^a.*", "i"));
        doc.insert("js", Bson::JavaScript("f()".to_owned()));
        doc.insert("symbol", Bson::Symbol("sym".to_owned()));
        doc.insert(
            "jsws",
            JavaScriptWithScope {
                code: "x + 1".to_owned(),
                scope,
            },
        );
        doc.insert("int32", 42);
        doc.insert("timestamp", Bson::Timestamp(99));
        doc.insert("int64", 1i64 << 40);
        doc.insert("min", Bson::MinKey);
        doc.insert("max", Bson::MaxKey);
        doc
    }

    #[test]
    fn int32_bytes() {
        let mut doc = Document::new();
        doc.insert("a", 1);
        assert_eq!(
            encode_full(&doc).unwrap(),
            vec![0x0C, 0, 0, 0, 0x10, 0x61, 0, 1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn empty_document() {
        let doc = Document::new();
        let enc = encode_full(&doc).unwrap();
        assert_eq!(enc, vec![5, 0, 0, 0, 0]);
        assert_eq!(decode_full(&enc).unwrap(), doc);
    }

    #[test]
    fn every_type_round_trips() {
        let doc = every_type();
        let enc = encode_full(&doc).unwrap();
        assert_eq!(enc.len() as i32, i32::from_le_bytes([enc[0], enc[1], enc[2], enc[3]]));
        assert_eq!(decode_full(&enc).unwrap(), doc);
    }

    #[test]
    fn array_uses_index_names() {
        let mut doc = Document::new();
        doc.insert("a", vec![Bson::Boolean(true), Bson::Boolean(false)]);
        let enc = encode_full(&doc).unwrap();
        let expected: Vec<u8> = vec![
            21, 0, 0, 0, // document
            0x04, b'a', 0, 13, 0, 0, 0, // array
            0x08, b'0', 0, 1, // "0"
            0x08, b'1', 0, 0, // "1"
            0, 0,
        ];
        assert_eq!(enc, expected);
    }

    #[test]
    fn javascript_with_scope_round_trips() {
        let mut scope = Document::new();
        scope.insert("x", 1);
        let mut doc = Document::new();
        doc.insert(
            "f",
            JavaScriptWithScope {
                code: "x".to_owned(),
                scope,
            },
        );

        let mut w = BinaryWriter::new(BinaryWriterSettings::default());
        encode(&doc, &mut w).unwrap();
        assert_eq!(w.state(), State::Done);
        let enc = w.into_bytes();

        // total, then the code with scope length covering code and scope
        assert_eq!(enc[0] as usize, enc.len());
        assert_eq!(enc[7], 22);
        assert_eq!(decode_full(&enc).unwrap(), doc);
    }

    #[test]
    fn old_binary_is_read_as_generic() {
        let bytes: Vec<u8> = vec![
            19, 0, 0, 0, // document
            0x05, b'b', 0, // header
            6, 0, 0, 0, // outer length
            0x02, // old binary
            2, 0, 0, 0, // inner length
            0xaa, 0xbb, // payload
            0,
        ];
        let doc = decode_full(&bytes).unwrap();
        match doc.get("b") {
            Some(Bson::Binary(b)) => {
                assert_eq!(b.subtype, BinarySubType::Generic);
                assert_eq!(b.bytes, vec![0xaa, 0xbb]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut enc = encode_full(&Document::new()).unwrap();
        enc.push(0);
        match decode_full(&enc) {
            Err(Error::MalformedDocument(Malformed::SizeMismatch { declared, actual })) => {
                assert_eq!(declared, 5);
                assert_eq!(actual, 6);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn truncated_input_is_malformed() {
        let enc = encode_full(&every_type()).unwrap();
        for cut in [0, 3, 4, 10, enc.len() - 1].iter() {
            assert!(decode_full(&enc[..*cut]).unwrap_err().is_malformed());
        }
    }

    #[test]
    fn duplicate_names_keep_last_value() {
        let bytes: Vec<u8> = vec![
            19, 0, 0, 0, // document
            0x10, b'a', 0, 1, 0, 0, 0, // a = 1
            0x10, b'a', 0, 2, 0, 0, 0, // a = 2
            0,
        ];
        let doc = decode_full(&bytes).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get("a"), Some(&Bson::Int32(2)));
    }

    #[test]
    fn null_in_name_fails_to_encode() {
        let mut doc = Document::new();
        doc.insert("a\0b", 1);
        assert!(encode_full(&doc).unwrap_err().is_malformed());
    }

    #[test]
    fn dates_before_epoch_round_trip() {
        let mut doc = Document::new();
        doc.insert("d", Utc.timestamp_millis_opt(-86_400_001).unwrap());
        let enc = encode_full(&doc).unwrap();
        assert_eq!(&enc[7..15], &(-86_400_001i64).to_le_bytes()[..]);
        assert_eq!(decode_full(&enc).unwrap(), doc);
    }

    #[test]
    fn json_strict_every_type() {
        let json = to_json(&every_type(), JsonWriterSettings::default()).unwrap();
        assert!(json.starts_with(r#"{ "double" : 1.5, "string" : "hi", "#));
        assert!(json.contains(r#""binary" : { "$binary" : "AQID", "$type" : "00" }"#));
        assert!(json.contains(r#""date" : { "$date" : 1234567 }"#));
        assert!(json.contains(r#""jsws" : { "$code" : "x + 1", "$scope" : { "x" : 1 } }"#));
        assert!(json.contains(r#""min" : { "$minkey" : 1 }"#));
        assert!(json.ends_with(r#""max" : { "$maxkey" : 1 } }"#));
    }
}
