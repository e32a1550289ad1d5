//! A [`BsonWriter`] producing JSON text.
//!
//! Types JSON has no syntax for are written as small documents with `$`-prefixed keys,
//! or, in the [`JsonOutputMode::JavaScript`] and [`JsonOutputMode::TenGen`] modes, as the
//! literals the database shell understands.
//!
//! | Type          | Strict                                 | JavaScript             | TenGen               |
//! | ---           | ---                                    | ---                    | ---                  |
//! | DateTime      | `{ "$date" : ms }`                     | `Date(ms)`             | `Date(ms)`           |
//! | ObjectId      | `{ "$oid" : "hex" }`                   | `{ "$oid" : "hex" }`   | `ObjectId("hex")`    |
//! | Regex         | `{ "$regex" : p, "$options" : o }`     | `/p/o`                 | `/p/o`               |
//!
//! Binary, JavaScript, Symbol, Timestamp, MinKey and MaxKey use `$binary`/`$type`,
//! `$code`, `$symbol`, `$timestamp`, `$minkey` and `$maxkey` in every mode.
//!
//! # Example
//!
//! ```
//! use bson_io::prelude::*;
//!
//! let settings = JsonWriterSettings {
//!     output_mode: JsonOutputMode::TenGen,
//!     ..JsonWriterSettings::default()
//! };
//! let mut w = JsonWriter::new(String::new(), settings);
//! w.write_start_document().unwrap();
//! w.write_object_id("_id", "4d88d8e3c7f9b51b1c000001".parse().unwrap()).unwrap();
//! w.write_start_array("v").unwrap();
//! w.write_int32("0", 1).unwrap();
//! w.write_string("1", "a/b").unwrap();
//! w.write_end_array().unwrap();
//! w.write_end_document().unwrap();
//!
//! assert_eq!(
//!     w.into_inner(),
//!     r#"{ "_id" : ObjectId("4d88d8e3c7f9b51b1c000001"), "v" : [1, "a\/b"] }"#
//! );
//! ```

use super::{
    check_element_state, check_state,
    context::{ContextStack, ContextType, JsonContext},
    BsonWriter, State,
};
use crate::{
    errors::Error,
    values::{Binary, ObjectId},
};
use chrono::{DateTime, Utc};
use std::fmt::{self, Write};
use tracing::{debug, trace};
use unicode_general_category::{get_general_category, GeneralCategory};

/// How types without a JSON counterpart are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JsonOutputMode {
    /// Only valid JSON.
    Strict,
    /// JavaScript literals for dates and regular expressions.
    JavaScript,
    /// JavaScript literals plus `ObjectId(...)`.
    TenGen,
}

/// Settings for a [`JsonWriter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonWriterSettings {
    pub output_mode: JsonOutputMode,
    /// Put every document element on its own line.
    pub indent: bool,
    /// Added once per nesting level when indenting.
    pub indent_chars: String,
    pub new_line_chars: String,
}

impl Default for JsonWriterSettings {
    fn default() -> Self {
        JsonWriterSettings {
            output_mode: JsonOutputMode::Strict,
            indent: false,
            indent_chars: "  ".to_owned(),
            new_line_chars: "\n".to_owned(),
        }
    }
}

/// Writes JSON text into any [`fmt::Write`].
#[derive(Debug)]
pub struct JsonWriter<W = String> {
    output: W,
    settings: JsonWriterSettings,
    contexts: ContextStack<JsonContext>,
    state: State,
}

impl<W: fmt::Write> JsonWriter<W> {
    pub fn new(output: W, settings: JsonWriterSettings) -> Self {
        JsonWriter {
            output,
            settings,
            contexts: ContextStack::new(),
            state: State::Initial,
        }
    }

    pub fn get_ref(&self) -> &W { &self.output }

    /// Consumes the writer, returning the destination.
    pub fn into_inner(self) -> W { self.output }

    fn push(&mut self, kind: ContextType) {
        let mut indentation = match self.contexts.top() {
            Some(parent) => parent.indentation.clone(),
            None => String::new(),
        };
        indentation.push_str(&self.settings.indent_chars);
        self.contexts.push(JsonContext {
            kind,
            indentation,
            has_elements: false,
        });
        self.state = kind.state();
        trace!(?kind, depth = self.contexts.depth(), "opened container");
    }

    /// Writes the separator and, inside documents, the quoted name.
    fn write_name(&mut self, name: &str) -> Result<(), Error> {
        if let Some(context) = self.contexts.top_mut() {
            if context.kind == ContextType::Array {
                if context.has_elements {
                    self.output.write_str(", ")?;
                }
            } else {
                if context.has_elements {
                    self.output.write_char(',')?;
                }
                if self.settings.indent {
                    self.output.write_str(&self.settings.new_line_chars)?;
                    self.output.write_str(&context.indentation)?;
                } else {
                    self.output.write_char(' ')?;
                }
                write_quoted(&mut self.output, name)?;
                self.output.write_str(" : ")?;
            }
            context.has_elements = true;
        }
        Ok(())
    }

    fn close_context(&mut self) -> Result<(), Error> {
        if let Some(context) = self.contexts.pop() {
            if context.kind == ContextType::Array {
                self.output.write_char(']')?;
            } else if self.settings.indent && context.has_elements {
                self.output.write_str(&self.settings.new_line_chars)?;
                if let Some(parent) = self.contexts.top() {
                    self.output.write_str(&parent.indentation)?;
                }
                self.output.write_char('}')?;
            } else {
                self.output.write_str(" }")?;
            }
            trace!(kind = ?context.kind, "closed container");
        }
        self.state = match self.contexts.top() {
            Some(parent) => parent.kind.state(),
            None => State::Done,
        };
        Ok(())
    }

    /// Checks the state and writes the name, ready for a bare value.
    fn start_value(&mut self, operation: &'static str, name: &str) -> Result<(), Error> {
        check_element_state(operation, self.state)?;
        self.write_name(name)
    }

    /// Opens the `$`-keyed document a value JSON has no syntax for is written as.
    fn start_extended(&mut self, operation: &'static str, name: &str) -> Result<(), Error> {
        check_element_state(operation, self.state)?;
        self.write_start_embedded_document(name)
    }
}

impl<W: fmt::Write> BsonWriter for JsonWriter<W> {
    fn state(&self) -> State { self.state }

    fn close(&mut self) {
        if self.state != State::Closed {
            self.contexts.clear();
            self.state = State::Closed;
            debug!("json writer closed");
        }
    }

    fn flush(&mut self) -> Result<(), Error> {
        check_state("flush", self.state, |s| s == State::Done)?;
        debug!("flushed");
        Ok(())
    }

    fn write_start_document(&mut self) -> Result<(), Error> {
        check_state("write_start_document", self.state, |s| {
            s.at_top_level() || s == State::JavaScriptWithScope
        })?;
        if self.state == State::JavaScriptWithScope {
            self.write_name("$scope")?;
            self.output.write_char('{')?;
            self.push(ContextType::ScopeDocument);
        } else {
            self.output.write_char('{')?;
            self.push(ContextType::Document);
        }
        Ok(())
    }

    fn write_end_document(&mut self) -> Result<(), Error> {
        check_state("write_end_document", self.state, State::closes_document)?;
        self.close_context()?;
        if self.state == State::JavaScriptWithScope {
            self.close_context()?;
        }
        Ok(())
    }

    fn write_start_embedded_document(&mut self, name: &str) -> Result<(), Error> {
        self.start_value("write_start_embedded_document", name)?;
        self.output.write_char('{')?;
        self.push(ContextType::EmbeddedDocument);
        Ok(())
    }

    fn write_start_array(&mut self, name: &str) -> Result<(), Error> {
        self.start_value("write_start_array", name)?;
        self.output.write_char('[')?;
        self.push(ContextType::Array);
        Ok(())
    }

    fn write_end_array(&mut self) -> Result<(), Error> {
        check_state("write_end_array", self.state, |s| s == State::Array)?;
        self.close_context()
    }

    fn write_start_javascript_with_scope(&mut self, name: &str, code: &str) -> Result<(), Error> {
        self.start_value("write_start_javascript_with_scope", name)?;
        self.output.write_char('{')?;
        self.push(ContextType::JavaScriptWithScope);
        self.write_name("$code")?;
        write_quoted(&mut self.output, code)?;
        Ok(())
    }

    fn write_double(&mut self, name: &str, value: f64) -> Result<(), Error> {
        self.start_value("write_double", name)?;
        self.output.write_str(&format_double(value))?;
        Ok(())
    }

    fn write_string(&mut self, name: &str, value: &str) -> Result<(), Error> {
        self.start_value("write_string", name)?;
        write_quoted(&mut self.output, value)?;
        Ok(())
    }

    fn write_binary(&mut self, name: &str, value: &Binary) -> Result<(), Error> {
        use base64::Engine;

        self.start_extended("write_binary", name)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&value.bytes);
        self.write_string("$binary", &encoded)?;
        self.write_string("$type", &format!("{:02x}", u8::from(value.subtype)))?;
        self.write_end_document()
    }

    fn write_object_id(&mut self, name: &str, value: ObjectId) -> Result<(), Error> {
        match self.settings.output_mode {
            JsonOutputMode::Strict | JsonOutputMode::JavaScript => {
                self.start_extended("write_object_id", name)?;
                self.write_string("$oid", &value.to_hex())?;
                self.write_end_document()
            }
            JsonOutputMode::TenGen => {
                self.start_value("write_object_id", name)?;
                write!(self.output, "ObjectId(\"{}\")", value.to_hex())?;
                Ok(())
            }
        }
    }

    fn write_boolean(&mut self, name: &str, value: bool) -> Result<(), Error> {
        self.start_value("write_boolean", name)?;
        self.output.write_str(if value { "true" } else { "false" })?;
        Ok(())
    }

    fn write_date_time(&mut self, name: &str, value: DateTime<Utc>) -> Result<(), Error> {
        let millis = value.timestamp_millis();
        match self.settings.output_mode {
            JsonOutputMode::Strict => {
                self.start_extended("write_date_time", name)?;
                self.write_int64("$date", millis)?;
                self.write_end_document()
            }
            JsonOutputMode::JavaScript | JsonOutputMode::TenGen => {
                self.start_value("write_date_time", name)?;
                write!(self.output, "Date({})", millis)?;
                Ok(())
            }
        }
    }

    fn write_null(&mut self, name: &str) -> Result<(), Error> {
        self.start_value("write_null", name)?;
        self.output.write_str("null")?;
        Ok(())
    }

    fn write_regular_expression(
        &mut self,
        name: &str,
        pattern: &str,
        options: &str,
    ) -> Result<(), Error> {
        match self.settings.output_mode {
            JsonOutputMode::Strict => {
                self.start_extended("write_regular_expression", name)?;
                self.write_string("$regex", pattern)?;
                self.write_string("$options", options)?;
                self.write_end_document()
            }
            JsonOutputMode::JavaScript | JsonOutputMode::TenGen => {
                self.start_value("write_regular_expression", name)?;
                self.output.write_char('/')?;
                self.output.write_str(&pattern.replace('\\', "\\\\"))?;
                self.output.write_char('/')?;
                for c in options.to_lowercase().chars() {
                    if c == 'g' || c == 'i' || c == 'm' {
                        self.output.write_char(c)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn write_javascript(&mut self, name: &str, code: &str) -> Result<(), Error> {
        self.start_extended("write_javascript", name)?;
        self.write_string("$code", code)?;
        self.write_end_document()
    }

    fn write_symbol(&mut self, name: &str, value: &str) -> Result<(), Error> {
        self.start_extended("write_symbol", name)?;
        self.write_string("$symbol", value)?;
        self.write_end_document()
    }

    fn write_int32(&mut self, name: &str, value: i32) -> Result<(), Error> {
        self.start_value("write_int32", name)?;
        write!(self.output, "{}", value)?;
        Ok(())
    }

    fn write_timestamp(&mut self, name: &str, value: i64) -> Result<(), Error> {
        self.start_extended("write_timestamp", name)?;
        self.write_int64("$timestamp", value)?;
        self.write_end_document()
    }

    fn write_int64(&mut self, name: &str, value: i64) -> Result<(), Error> {
        self.start_value("write_int64", name)?;
        write!(self.output, "{}", value)?;
        Ok(())
    }

    fn write_min_key(&mut self, name: &str) -> Result<(), Error> {
        self.start_extended("write_min_key", name)?;
        self.write_int32("$minkey", 1)?;
        self.write_end_document()
    }

    fn write_max_key(&mut self, name: &str) -> Result<(), Error> {
        self.start_extended("write_max_key", name)?;
        self.write_int32("$maxkey", 1)?;
        self.write_end_document()
    }
}

/// `NaN`, `INF` and `-INF` for non-finite values, otherwise the shortest digits that
/// read back as the same value. Decimal exponents from -4 to 14 are written in fixed
/// notation, anything else as `1.5E+20` or `1E-07`.
fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        let s = if value > 0.0 { "INF" } else { "-INF" };
        return s.to_owned();
    }
    let scientific = format!("{:e}", value);
    let parts = scientific
        .split_once('e')
        .and_then(|(mantissa, exp)| exp.parse::<i32>().ok().map(|exp| (mantissa, exp)));
    match parts {
        Some((mantissa, exp)) if exp >= 15 || exp < -4 => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}E{}{:02}", mantissa, sign, exp.abs())
        }
        _ => value.to_string(),
    }
}

/// Whether a UTF-16 unit is written as is. Everything outside these categories is
/// written as a `\uXXXX` escape: marks, modifier letters, separators other than the
/// space separators, control, format, private use and unassigned code points, and
/// every surrogate, so characters outside the BMP become an escaped surrogate pair.
fn is_verbatim(c: char) -> bool {
    use GeneralCategory::*;

    if c as u32 > 0xffff {
        return false;
    }
    match get_general_category(c) {
        UppercaseLetter | LowercaseLetter | TitlecaseLetter | OtherLetter => true,
        DecimalNumber | LetterNumber | OtherNumber => true,
        SpaceSeparator => true,
        ConnectorPunctuation | DashPunctuation | OpenPunctuation | ClosePunctuation => true,
        InitialPunctuation | FinalPunctuation | OtherPunctuation => true,
        MathSymbol | CurrencySymbol | ModifierSymbol | OtherSymbol => true,
        _ => false,
    }
}

fn write_quoted<W: fmt::Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '/' => out.write_str("\\/")?,
            '\u{8}' => out.write_str("\\b")?,
            '\u{c}' => out.write_str("\\f")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if is_verbatim(c) => out.write_char(c)?,
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(out, "\\u{:04x}", unit)?;
                }
            }
        }
    }
    out.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::BinarySubType;
    use chrono::TimeZone;

    fn writer(mode: JsonOutputMode) -> JsonWriter {
        JsonWriter::new(
            String::new(),
            JsonWriterSettings {
                output_mode: mode,
                ..JsonWriterSettings::default()
            },
        )
    }

    fn single<F: FnOnce(&mut JsonWriter)>(mode: JsonOutputMode, f: F) -> String {
        let mut w = writer(mode);
        w.write_start_document().unwrap();
        f(&mut w);
        w.write_end_document().unwrap();
        w.into_inner()
    }

    #[test]
    fn empty_and_simple() {
        assert_eq!(single(JsonOutputMode::Strict, |_| {}), "{ }");
        assert_eq!(
            single(JsonOutputMode::Strict, |w| w.write_int32("x", 1).unwrap()),
            "{ \"x\" : 1 }"
        );
        assert_eq!(
            single(JsonOutputMode::Strict, |w| {
                w.write_boolean("a", true).unwrap();
                w.write_null("b").unwrap();
            }),
            "{ \"a\" : true, \"b\" : null }"
        );
    }

    #[test]
    fn arrays_have_no_names() {
        let s = single(JsonOutputMode::Strict, |w| {
            w.write_start_array("a").unwrap();
            w.write_int32("0", 1).unwrap();
            w.write_start_embedded_document("1").unwrap();
            w.write_int64("n", 2).unwrap();
            w.write_end_document().unwrap();
            w.write_end_array().unwrap();
            w.write_start_array("e").unwrap();
            w.write_end_array().unwrap();
        });
        assert_eq!(s, "{ \"a\" : [1, { \"n\" : 2 }], \"e\" : [] }");
    }

    #[test]
    fn indentation() {
        let mut w = JsonWriter::new(
            String::new(),
            JsonWriterSettings {
                indent: true,
                ..JsonWriterSettings::default()
            },
        );
        w.write_start_document().unwrap();
        w.write_int32("a", 1).unwrap();
        w.write_start_embedded_document("d").unwrap();
        w.write_string("s", "x").unwrap();
        w.write_end_document().unwrap();
        w.write_start_embedded_document("empty").unwrap();
        w.write_end_document().unwrap();
        w.write_end_document().unwrap();
        assert_eq!(
            w.into_inner(),
            "{\n  \"a\" : 1,\n  \"d\" : {\n    \"s\" : \"x\"\n  },\n  \"empty\" : { }\n}"
        );
    }

    #[test]
    fn extended_types_by_mode() {
        let oid: ObjectId = "4d88d8e3c7f9b51b1c000001".parse().unwrap();
        let date = DateTime::<Utc>::from_timestamp_millis(1_000).unwrap();

        let strict = single(JsonOutputMode::Strict, |w| {
            w.write_date_time("d", date).unwrap();
            w.write_object_id("o", oid).unwrap();
            w.write_regular_expression("r", "a\\d", "imx").unwrap();
        });
        assert_eq!(
            strict,
            "{ \"d\" : { \"$date\" : 1000 }, \
             \"o\" : { \"$oid\" : \"4d88d8e3c7f9b51b1c000001\" }, \
             \"r\" : { \"$regex\" : \"a\\\\d\", \"$options\" : \"imx\" } }"
        );

        let js = single(JsonOutputMode::JavaScript, |w| {
            w.write_date_time("d", date).unwrap();
            w.write_object_id("o", oid).unwrap();
            w.write_regular_expression("r", "a\\d", "IMXg").unwrap();
        });
        assert_eq!(
            js,
            "{ \"d\" : Date(1000), \
             \"o\" : { \"$oid\" : \"4d88d8e3c7f9b51b1c000001\" }, \
             \"r\" : /a\\\\d/img }"
        );

        let tengen = single(JsonOutputMode::TenGen, |w| {
            w.write_object_id("o", oid).unwrap();
        });
        assert_eq!(tengen, "{ \"o\" : ObjectId(\"4d88d8e3c7f9b51b1c000001\") }");
    }

    #[test]
    fn mode_independent_types() {
        for mode in &[JsonOutputMode::Strict, JsonOutputMode::JavaScript, JsonOutputMode::TenGen] {
            let s = single(*mode, |w| {
                w.write_binary(
                    "b",
                    &Binary {
                        subtype: BinarySubType::Uuid,
                        bytes: vec![1, 2, 3],
                    },
                )
                .unwrap();
                w.write_javascript("c", "f()").unwrap();
                w.write_symbol("s", "sym").unwrap();
                w.write_timestamp("t", 5).unwrap();
                w.write_min_key("lo").unwrap();
                w.write_max_key("hi").unwrap();
            });
            assert_eq!(
                s,
                "{ \"b\" : { \"$binary\" : \"AQID\", \"$type\" : \"04\" }, \
                 \"c\" : { \"$code\" : \"f()\" }, \
                 \"s\" : { \"$symbol\" : \"sym\" }, \
                 \"t\" : { \"$timestamp\" : 5 }, \
                 \"lo\" : { \"$minkey\" : 1 }, \
                 \"hi\" : { \"$maxkey\" : 1 } }"
            );
        }
    }

    #[test]
    fn javascript_with_scope() {
        let mut w = writer(JsonOutputMode::Strict);
        w.write_start_document().unwrap();
        w.write_start_javascript_with_scope("f", "x + y").unwrap();
        assert_eq!(w.state(), State::JavaScriptWithScope);
        w.write_start_document().unwrap();
        w.write_int32("y", 1).unwrap();
        w.write_end_document().unwrap();
        assert_eq!(w.state(), State::Document);
        w.write_int32("after", 2).unwrap();
        w.write_end_document().unwrap();
        assert_eq!(
            w.into_inner(),
            "{ \"f\" : { \"$code\" : \"x + y\", \"$scope\" : { \"y\" : 1 } }, \"after\" : 2 }"
        );
    }

    #[test]
    fn doubles() {
        assert_eq!(format_double(1.0), "1");
        assert_eq!(format_double(-2.5), "-2.5");
        assert_eq!(format_double(0.1), "0.1");
        assert_eq!(format_double(f64::NAN), "NaN");
        assert_eq!(format_double(f64::INFINITY), "INF");
        assert_eq!(format_double(f64::NEG_INFINITY), "-INF");
        assert_eq!(format_double(-0.0), "-0");
        assert_eq!(format_double(0.0001), "0.0001");
        assert_eq!(format_double(1e14), "100000000000000");
        assert_eq!(format_double(123456789012345.6), "123456789012345.6");
        assert_eq!(format_double(1e15), "1E+15");
        assert_eq!(format_double(1e300), "1E+300");
        assert_eq!(format_double(1.2345e20), "1.2345E+20");
        assert_eq!(format_double(1e-5), "1E-05");
        assert_eq!(format_double(1e-7), "1E-07");
        assert_eq!(format_double(-1.5e-7), "-1.5E-07");
        assert_eq!(format_double(5e-324), "5E-324");
    }

    #[test]
    fn escaping() {
        let mut s = String::new();
        write_quoted(&mut s, "a\"b\\c/d\u{8}\u{c}\n\r\t").unwrap();
        assert_eq!(s, r#""a\"b\\c\/d\b\f\n\r\t""#);

        let mut s = String::new();
        write_quoted(&mut s, "\u{1}\u{7f}\u{2028}\u{feff}\u{e000}\u{fffe}\u{10fffd}é€ ¬").unwrap();
        assert_eq!(
            s,
            "\"\\u0001\\u007f\\u2028\\ufeff\\ue000\\ufffe\\udbff\\udffd\u{e9}\u{20ac} \u{ac}\""
        );
    }

    #[test]
    fn marks_modifiers_and_astral_characters_are_escaped() {
        let out = single(JsonOutputMode::Strict, |w| {
            w.write_string("s", "e\u{301}\u{2b0}\u{1f600}").unwrap();
        });
        assert_eq!(out, r#"{ "s" : "e\u0301\u02b0\ud83d\ude00" }"#);

        // unassigned in every version of the tables
        let mut s = String::new();
        write_quoted(&mut s, "\u{378}\u{ffff}").unwrap();
        assert_eq!(s, r#""\u0378\uffff""#);
    }

    #[test]
    fn extended_types_report_their_own_operation() {
        let mut w = writer(JsonOutputMode::Strict);
        match w.write_date_time("d", Utc.timestamp_millis_opt(0).unwrap()) {
            Err(Error::ProtocolViolation { operation, state }) => {
                assert_eq!(operation, "write_date_time");
                assert_eq!(state, State::Initial);
            }
            other => panic!("unexpected {:?}", other),
        }
        match w.write_min_key("m") {
            Err(Error::ProtocolViolation { operation, .. }) => assert_eq!(operation, "write_min_key"),
            other => panic!("unexpected {:?}", other),
        }
        w.close();
        match w.write_binary("b", &Binary::generic(vec![1])) {
            Err(Error::UseAfterClose(operation)) => assert_eq!(operation, "write_binary"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn protocol() {
        let mut w = writer(JsonOutputMode::Strict);
        assert!(w.write_int32("x", 1).unwrap_err().is_protocol_violation());
        assert!(w.flush().unwrap_err().is_protocol_violation());
        w.write_start_document().unwrap();
        w.write_end_document().unwrap();
        w.flush().unwrap();
        w.close();
        w.close();
        assert!(w.write_start_document().unwrap_err().is_use_after_close());
    }
}
