//! Element type tags, the skip table and binary sub types.

use crate::{constants::*, errors::Malformed};

/// BSON element types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Terminator of a document; never the type of a value.
    EndOfDocument,
    Double,
    String,
    Document,
    Array,
    Binary,
    ObjectId,
    Boolean,
    DateTime,
    Null,
    RegularExpression,
    JavaScript,
    Symbol,
    JavaScriptWithScope,
    Int32,
    Timestamp,
    Int64,
    MinKey,
    MaxKey,
}

/// How to advance past a value without decoding it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkipRule {
    /// A value of constant width.
    Fixed(usize),
    /// An `int32` byte count followed by that many bytes.
    LengthPrefixed,
    /// An `int32` byte count, one sub type byte, then that many bytes.
    Binary,
    /// An `int32` total length that counts itself.
    Container,
    /// Two c-strings.
    CStringPair,
}

use ElementType::*;

impl ElementType {
    /// Tries to read a tag byte as an [`ElementType`].
    ///
    /// # Example
    ///
    /// ```
    /// use bson_io::element::ElementType;
    ///
    /// assert_eq!(ElementType::from_u8(0x10).unwrap(), ElementType::Int32);
    /// assert!(ElementType::from_u8(0x06).is_err());
    /// ```
    pub fn from_u8(byte: u8) -> Result<ElementType, Malformed> {
        Ok(match byte {
            TAG_END => EndOfDocument,
            TAG_DOUBLE => Double,
            TAG_STRING => String,
            TAG_DOCUMENT => Document,
            TAG_ARRAY => Array,
            TAG_BINARY => Binary,
            TAG_OBJECT_ID => ObjectId,
            TAG_BOOLEAN => Boolean,
            TAG_DATE_TIME => DateTime,
            TAG_NULL => Null,
            TAG_REGEX => RegularExpression,
            TAG_JAVASCRIPT => JavaScript,
            TAG_SYMBOL => Symbol,
            TAG_JAVASCRIPT_WITH_SCOPE => JavaScriptWithScope,
            TAG_INT32 => Int32,
            TAG_TIMESTAMP => Timestamp,
            TAG_INT64 => Int64,
            TAG_MIN_KEY => MinKey,
            TAG_MAX_KEY => MaxKey,
            unknown => return Err(Malformed::UnknownElementType(unknown)),
        })
    }

    /// The tag byte of this type.
    pub fn to_u8(self) -> u8 {
        match self {
            EndOfDocument => TAG_END,
            Double => TAG_DOUBLE,
            String => TAG_STRING,
            Document => TAG_DOCUMENT,
            Array => TAG_ARRAY,
            Binary => TAG_BINARY,
            ObjectId => TAG_OBJECT_ID,
            Boolean => TAG_BOOLEAN,
            DateTime => TAG_DATE_TIME,
            Null => TAG_NULL,
            RegularExpression => TAG_REGEX,
            JavaScript => TAG_JAVASCRIPT,
            Symbol => TAG_SYMBOL,
            JavaScriptWithScope => TAG_JAVASCRIPT_WITH_SCOPE,
            Int32 => TAG_INT32,
            Timestamp => TAG_TIMESTAMP,
            Int64 => TAG_INT64,
            MinKey => TAG_MIN_KEY,
            MaxKey => TAG_MAX_KEY,
        }
    }

    /// The skip rule for values of this type.
    ///
    /// This is the only place value widths are recorded; lookups that skip elements go
    /// through it.
    pub fn skip_rule(self) -> SkipRule {
        match self {
            EndOfDocument | Null | MinKey | MaxKey => SkipRule::Fixed(0),
            Boolean => SkipRule::Fixed(1),
            Int32 => SkipRule::Fixed(4),
            Double | DateTime | Timestamp | Int64 => SkipRule::Fixed(8),
            ObjectId => SkipRule::Fixed(12),
            String | JavaScript | Symbol => SkipRule::LengthPrefixed,
            Binary => SkipRule::Binary,
            Document | Array | JavaScriptWithScope => SkipRule::Container,
            RegularExpression => SkipRule::CStringPair,
        }
    }
}

/// Sub types of binary values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinarySubType {
    Generic,
    Function,
    /// The obsolete form carrying a second, redundant length field.
    OldBinary,
    UuidLegacy,
    Uuid,
    Md5,
    /// `0x80` to `0xff`.
    UserDefined(u8),
    /// Any unassigned value below `0x80`.
    Other(u8),
}

impl From<u8> for BinarySubType {
    fn from(byte: u8) -> Self {
        use BinarySubType::*;
        match byte {
            SUBTYPE_GENERIC => Generic,
            SUBTYPE_FUNCTION => Function,
            SUBTYPE_OLD_BINARY => OldBinary,
            SUBTYPE_UUID_LEGACY => UuidLegacy,
            SUBTYPE_UUID => Uuid,
            SUBTYPE_MD5 => Md5,
            b if b >= SUBTYPE_USER_DEFINED => UserDefined(b),
            b => Other(b),
        }
    }
}

impl From<BinarySubType> for u8 {
    fn from(st: BinarySubType) -> u8 {
        use BinarySubType::*;
        match st {
            Generic => SUBTYPE_GENERIC,
            Function => SUBTYPE_FUNCTION,
            OldBinary => SUBTYPE_OLD_BINARY,
            UuidLegacy => SUBTYPE_UUID_LEGACY,
            Uuid => SUBTYPE_UUID,
            Md5 => SUBTYPE_MD5,
            UserDefined(b) | Other(b) => b,
        }
    }
}
