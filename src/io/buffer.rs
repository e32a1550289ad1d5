//! A positionable byte buffer with little endian primitives.
//!
//! Reads start at the current position and advance it. Writes always append and leave
//! the position at the end; earlier bytes only change through [`BsonBuffer::backpatch`].

use crate::{constants::MIN_STRING_SIZE, errors::Malformed};
use byteorder::{ByteOrder, LittleEndian};
use bytes::BytesMut;
use std::{convert::TryFrom, str};

type Endian = LittleEndian;

/// Converts a byte count to an `int32` length field.
pub fn length_field(len: usize) -> Result<i32, Malformed> {
    i32::try_from(len).map_err(|_| Malformed::DocumentTooLarge {
        size: len,
        max: i32::MAX as usize,
    })
}

/// The byte cursor behind the binary reader and writer.
#[derive(Clone, Debug, Default)]
pub struct BsonBuffer {
    bytes: BytesMut,
    position: usize,
}

impl BsonBuffer {
    /// Creates an empty buffer for writing.
    pub fn new() -> BsonBuffer {
        BsonBuffer {
            bytes: BytesMut::with_capacity(256),
            position: 0,
        }
    }

    /// Creates a buffer for reading, positioned at the start of `bytes`.
    pub fn from_slice(bytes: &[u8]) -> BsonBuffer {
        BsonBuffer {
            bytes: BytesMut::from(bytes),
            position: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize { self.bytes.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    #[inline]
    pub fn position(&self) -> usize { self.position }

    /// Moves the cursor. Positions past the end are rejected.
    pub fn set_position(&mut self, position: usize) -> Result<(), Malformed> {
        if position > self.len() {
            return Err(Malformed::UnexpectedEnd {
                wanted: position - self.position,
                offset: self.position,
                len: self.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Bytes between the cursor and the end.
    #[inline]
    pub fn remaining(&self) -> usize { self.len() - self.position }

    pub fn as_slice(&self) -> &[u8] { &self.bytes[..] }

    /// Drops the contents and rewinds.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.position = 0;
    }

    pub fn into_vec(self) -> Vec<u8> { self.bytes.to_vec() }

    #[inline]
    fn take(&mut self, len: usize) -> Result<&[u8], Malformed> {
        if self.remaining() < len {
            return Err(Malformed::UnexpectedEnd {
                wanted: len,
                offset: self.position,
                len: self.len(),
            });
        }
        let start = self.position;
        self.position += len;
        Ok(&self.bytes[start..start + len])
    }

    /// Reads a byte without consuming it.
    #[inline]
    pub fn peek_u8(&self) -> Result<u8, Malformed> {
        match self.bytes.get(self.position) {
            Some(byte) => Ok(*byte),
            None => Err(Malformed::UnexpectedEnd {
                wanted: 1,
                offset: self.position,
                len: self.len(),
            }),
        }
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, Malformed> {
        let byte = self.peek_u8()?;
        self.position += 1;
        Ok(byte)
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, Malformed> { Ok(Endian::read_i32(self.take(4)?)) }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64, Malformed> { Ok(Endian::read_i64(self.take(8)?)) }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, Malformed> { Ok(Endian::read_f64(self.take(8)?)) }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, Malformed> {
        Ok(self.take(len)?.to_vec())
    }

    /// Advances the cursor by `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<(), Malformed> {
        self.take(len)?;
        Ok(())
    }

    fn cstring_len(&self) -> Result<usize, Malformed> {
        self.bytes[self.position..]
            .iter()
            .position(|b| *b == 0)
            .ok_or(Malformed::MissingTerminator)
    }

    /// Reads a null terminated UTF-8 string.
    pub fn read_cstring(&mut self) -> Result<String, Malformed> {
        let len = self.cstring_len()?;
        let bytes = self.take(len + 1)?;
        match str::from_utf8(&bytes[..len]) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => Err(Malformed::InvalidUtf8),
        }
    }

    pub fn skip_cstring(&mut self) -> Result<(), Malformed> {
        let len = self.cstring_len()?;
        self.skip(len + 1)
    }

    /// Reads the body of a length prefixed string: `len` bytes, the last of which is the
    /// terminator.
    pub fn read_string(&mut self, len: usize) -> Result<String, Malformed> {
        if len < MIN_STRING_SIZE {
            return Err(Malformed::InvalidSize(len as i64));
        }
        let bytes = self.take(len)?;
        if bytes[len - 1] != 0 {
            return Err(Malformed::MissingTerminator);
        }
        match str::from_utf8(&bytes[..len - 1]) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => Err(Malformed::InvalidUtf8),
        }
    }

    #[inline]
    fn append(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
        self.position = self.bytes.len();
    }

    #[inline]
    pub fn write_u8(&mut self, byte: u8) { self.append(&[byte]) }

    #[inline]
    pub fn write_i32(&mut self, i: i32) {
        let mut buf = [0u8; 4];
        Endian::write_i32(&mut buf, i);
        self.append(&buf)
    }

    #[inline]
    pub fn write_i64(&mut self, i: i64) {
        let mut buf = [0u8; 8];
        Endian::write_i64(&mut buf, i);
        self.append(&buf)
    }

    #[inline]
    pub fn write_f64(&mut self, f: f64) {
        let mut buf = [0u8; 8];
        Endian::write_f64(&mut buf, f);
        self.append(&buf)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) { self.append(bytes) }

    /// Writes `s` followed by a null byte. Strings containing a null byte are rejected.
    pub fn write_cstring(&mut self, s: &str) -> Result<(), Malformed> {
        if s.as_bytes().contains(&0) {
            return Err(Malformed::NullInCString(s.to_owned()));
        }
        self.append(s.as_bytes());
        self.write_u8(0);
        Ok(())
    }

    /// Writes an `int32` length counting the terminator, the bytes, then the terminator.
    /// Nothing is written if the length does not fit an `int32`.
    pub fn write_string(&mut self, s: &str) -> Result<(), Malformed> {
        self.write_i32(length_field(s.len() + 1)?);
        self.append(s.as_bytes());
        self.write_u8(0);
        Ok(())
    }

    /// Overwrites the `int32` at `offset`.
    pub fn backpatch(&mut self, offset: usize, value: i32) {
        Endian::write_i32(&mut self.bytes[offset..offset + 4], value)
    }
}
