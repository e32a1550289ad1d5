//! Values of the BSON types that have no natural Rust counterpart.

use crate::{document::Document, element::BinarySubType};
use std::{convert::TryFrom, fmt, str::FromStr};

#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
/// A 12 byte object id: a 4 byte big-endian timestamp followed by 8 bytes of machine,
/// process and counter.
///
/// # Example
///
/// ```
/// use bson_io::prelude::*;
///
/// let oid: ObjectId = "4d88d8e3c7f9b51b1c000001".parse().unwrap();
///
/// assert_eq!(oid.timestamp(), 0x4d88_d8e3);
/// assert_eq!(oid.to_string(), "4d88d8e3c7f9b51b1c000001");
/// ```
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Creates an [`ObjectId`] from its raw bytes.
    pub fn from_bytes(bytes: [u8; 12]) -> ObjectId { ObjectId(bytes) }

    /// The raw bytes.
    pub fn bytes(&self) -> [u8; 12] { self.0 }

    /// Seconds since the epoch at which the id was generated.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Lower case hex representation.
    pub fn to_hex(&self) -> String { hex::encode(self.0) }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(&self.to_hex()) }
}

impl FromStr for ObjectId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<ObjectId, hex::FromHexError> {
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(ObjectId(bytes))
    }
}

impl<'a> TryFrom<&'a [u8]> for ObjectId {
    type Error = &'a [u8];

    fn try_from(bytes: &'a [u8]) -> Result<ObjectId, &'a [u8]> {
        if bytes.len() == 12 {
            let mut out = [0u8; 12];
            out.copy_from_slice(bytes);
            Ok(ObjectId(out))
        } else {
            Err(bytes)
        }
    }
}

#[derive(Eq, PartialEq, Clone, Hash, Debug)]
/// Binary data tagged with a sub type.
pub struct Binary {
    /// The sub type.
    pub subtype: BinarySubType,
    /// The payload, without any length fields.
    pub bytes: Vec<u8>,
}

impl Binary {
    /// Creates binary data of sub type [`BinarySubType::Generic`].
    pub fn generic(bytes: Vec<u8>) -> Binary {
        Binary {
            subtype: BinarySubType::Generic,
            bytes,
        }
    }
}

#[derive(Eq, PartialEq, Clone, Hash, Debug)]
/// A regular expression as stored by the database: a pattern and its option letters.
pub struct Regex {
    pub pattern: String,
    pub options: String,
}

impl Regex {
    pub fn new(pattern: &str, options: &str) -> Regex {
        Regex {
            pattern: pattern.to_owned(),
            options: options.to_owned(),
        }
    }
}

#[derive(PartialEq, Clone, Debug)]
/// JavaScript code together with the variable bindings it runs under.
pub struct JavaScriptWithScope {
    pub code: String,
    pub scope: Document,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_hex() {
        let oid = ObjectId::from_bytes([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 0xff]);
        assert_eq!(oid.to_hex(), "000102030405060708090aff");
        assert_eq!("000102030405060708090aff".parse::<ObjectId>().unwrap(), oid);
        assert!("0001".parse::<ObjectId>().is_err());
        assert!("zz0102030405060708090aff".parse::<ObjectId>().is_err());
    }

    #[test]
    fn object_id_from_slice() {
        let bytes = [7u8; 12];
        assert_eq!(ObjectId::try_from(&bytes[..]).unwrap().bytes(), bytes);
        assert!(ObjectId::try_from(&bytes[..11]).is_err());
    }
}
