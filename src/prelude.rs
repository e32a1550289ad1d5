pub use crate::{
    document::Document,
    element::{BinarySubType, ElementType},
    encoding::{decode, decode_full, encode, encode_full, to_json, De, Ser},
    errors::{Error, Malformed},
    io::{
        BinaryReader, BinaryReaderSettings, BinaryWriter, BinaryWriterSettings, Bookmark,
        BsonWriter, JsonOutputMode, JsonWriter, JsonWriterSettings, State,
    },
    values::{Binary, JavaScriptWithScope, ObjectId, Regex},
    Bson,
};
pub use chrono::{DateTime, TimeZone, Utc};
pub use std::{convert::TryFrom, str::FromStr};
