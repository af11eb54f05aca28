//! Trailing payload region with a read/write cursor
//!
//! Writes land at the cursor, overwriting existing bytes and growing the
//! buffer as needed. Reads consume from the cursor and fail with
//! [`ProtocolError::MessageTooSmall`] past the end, leaving the cursor where
//! it was.

use byteorder::{ByteOrder, LittleEndian};
use bytes::{Bytes, BytesMut};

use crate::error::{ProtocolError, ProtocolResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    buf: BytesMut,
    position: usize,
}

impl Payload {
    pub fn with_capacity(reserve: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(reserve),
            position: 0,
        }
    }

    /// Payload holding `data` with the cursor at the start
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            buf: BytesMut::from(data),
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.position)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.buf)
    }

    /// Move the cursor; `position == len` is allowed
    pub fn seek(&mut self, position: usize) -> ProtocolResult<()> {
        if position > self.buf.len() {
            return Err(ProtocolError::SeekOutOfRange {
                position,
                len: self.buf.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.position = 0;
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        let end = self.position + data.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.position..end].copy_from_slice(data);
        self.position = end;
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_bytes(&[value]);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// UTF-8 bytes followed by a single NUL
    pub fn write_null_term_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
        self.write_u8(0);
    }

    pub fn read_bytes(&mut self, len: usize) -> ProtocolResult<&[u8]> {
        if self.remaining() < len {
            return Err(ProtocolError::message_too_small(
                self.position + len,
                self.buf.len(),
                "payload read",
            ));
        }
        let start = self.position;
        self.position += len;
        Ok(&self.buf[start..start + len])
    }

    pub fn read_u8(&mut self) -> ProtocolResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> ProtocolResult<i8> {
        Ok(self.read_bytes(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> ProtocolResult<u16> {
        Ok(LittleEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_i16(&mut self) -> ProtocolResult<i16> {
        Ok(LittleEndian::read_i16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> ProtocolResult<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_i32(&mut self) -> ProtocolResult<i32> {
        Ok(LittleEndian::read_i32(self.read_bytes(4)?))
    }

    pub fn read_u64(&mut self) -> ProtocolResult<u64> {
        Ok(LittleEndian::read_u64(self.read_bytes(8)?))
    }

    pub fn read_i64(&mut self) -> ProtocolResult<i64> {
        Ok(LittleEndian::read_i64(self.read_bytes(8)?))
    }

    pub fn read_f32(&mut self) -> ProtocolResult<f32> {
        Ok(LittleEndian::read_f32(self.read_bytes(4)?))
    }

    pub fn read_f64(&mut self) -> ProtocolResult<f64> {
        Ok(LittleEndian::read_f64(self.read_bytes(8)?))
    }

    /// Read UTF-8 up to the next NUL, consuming the terminator
    pub fn read_null_term_string(&mut self) -> ProtocolResult<String> {
        let start = self.position;
        let rest = &self.buf[start.min(self.buf.len())..];
        let Some(nul) = rest.iter().position(|&b| b == 0) else {
            return Err(ProtocolError::message_too_small(
                self.buf.len() + 1,
                self.buf.len(),
                "payload null-terminated string without terminator",
            ));
        };

        let value = std::str::from_utf8(&rest[..nul])
            .map_err(|e| ProtocolError::InvalidString {
                offset: start,
                reason: e.to_string(),
            })?
            .to_string();
        self.position = start + nul + 1;
        Ok(value)
    }
}
