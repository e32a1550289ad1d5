/// End of document, 0x00
pub(crate) const TAG_END: u8 = 0x00;
/// Double tag, 0x01
pub(crate) const TAG_DOUBLE: u8 = 0x01;
/// String tag, 0x02
pub(crate) const TAG_STRING: u8 = 0x02;
/// Embedded document tag, 0x03
pub(crate) const TAG_DOCUMENT: u8 = 0x03;
/// Array tag, 0x04
pub(crate) const TAG_ARRAY: u8 = 0x04;
/// Binary tag, 0x05
pub(crate) const TAG_BINARY: u8 = 0x05;
/// ObjectId tag, 0x07
pub(crate) const TAG_OBJECT_ID: u8 = 0x07;
/// Boolean tag, 0x08
pub(crate) const TAG_BOOLEAN: u8 = 0x08;
/// UTC datetime tag, 0x09
pub(crate) const TAG_DATE_TIME: u8 = 0x09;
/// Null tag, 0x0a
pub(crate) const TAG_NULL: u8 = 0x0a;
/// Regular expression tag, 0x0b
pub(crate) const TAG_REGEX: u8 = 0x0b;
/// JavaScript code tag, 0x0d
pub(crate) const TAG_JAVASCRIPT: u8 = 0x0d;
/// Symbol tag, 0x0e
pub(crate) const TAG_SYMBOL: u8 = 0x0e;
/// JavaScript code with scope tag, 0x0f
pub(crate) const TAG_JAVASCRIPT_WITH_SCOPE: u8 = 0x0f;
/// Int32 tag, 0x10
pub(crate) const TAG_INT32: u8 = 0x10;
/// Timestamp tag, 0x11
pub(crate) const TAG_TIMESTAMP: u8 = 0x11;
/// Int64 tag, 0x12
pub(crate) const TAG_INT64: u8 = 0x12;
/// MaxKey tag, 0x7f
pub(crate) const TAG_MAX_KEY: u8 = 0x7f;
/// MinKey tag, 0xff
pub(crate) const TAG_MIN_KEY: u8 = 0xff;

/// Generic binary sub type.
pub(crate) const SUBTYPE_GENERIC: u8 = 0x00;
/// Function binary sub type.
pub(crate) const SUBTYPE_FUNCTION: u8 = 0x01;
/// Obsolete binary sub type with two length fields.
pub(crate) const SUBTYPE_OLD_BINARY: u8 = 0x02;
/// Legacy UUID sub type.
pub(crate) const SUBTYPE_UUID_LEGACY: u8 = 0x03;
/// UUID sub type.
pub(crate) const SUBTYPE_UUID: u8 = 0x04;
/// MD5 sub type.
pub(crate) const SUBTYPE_MD5: u8 = 0x05;
/// First user defined sub type.
pub(crate) const SUBTYPE_USER_DEFINED: u8 = 0x80;

/// Length field plus terminator.
pub(crate) const MIN_DOCUMENT_SIZE: usize = 5;
/// A string length counts its terminator.
pub(crate) const MIN_STRING_SIZE: usize = 1;
/// Default for `max_document_size`, 4 MiB.
pub(crate) const DEFAULT_MAX_DOCUMENT_SIZE: usize = 4 * 1024 * 1024;
/// Default for `max_nesting_depth`. The top level document counts as one.
pub(crate) const DEFAULT_MAX_NESTING_DEPTH: usize = 100;

/// Milliseconds since the epoch of 10000-01-01T00:00:00Z.
pub(crate) const DATE_TIME_MAX_SENTINEL: i64 = 253_402_300_800_000;
/// Milliseconds since the epoch of 9999-12-31T23:59:59.999Z.
pub(crate) const DATE_TIME_MAX_MILLIS: i64 = DATE_TIME_MAX_SENTINEL - 1;
/// Total length, the smallest code string and the smallest scope document.
pub(crate) const MIN_CODE_WITH_SCOPE_SIZE: usize = 4 + 4 + MIN_STRING_SIZE + MIN_DOCUMENT_SIZE;
