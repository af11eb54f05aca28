//! Bounded little-endian reader over a byte slice
//!
//! Every read checks the remaining length first and reports a
//! [`ProtocolError::MessageTooSmall`] naming the field being read, so a
//! truncated frame is never partially consumed silently.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{ProtocolError, ProtocolResult};

#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Bytes not yet consumed
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// Consume and return everything left
    pub fn take_rest(&mut self) -> &'a [u8] {
        let rest = self.rest();
        self.position = self.data.len();
        rest
    }

    pub fn read_bytes(&mut self, len: usize, context: &str) -> ProtocolResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(ProtocolError::message_too_small(
                self.position + len,
                self.data.len(),
                context,
            ));
        }
        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self, context: &str) -> ProtocolResult<u8> {
        Ok(self.read_bytes(1, context)?[0])
    }

    pub fn read_u16(&mut self, context: &str) -> ProtocolResult<u16> {
        Ok(LittleEndian::read_u16(self.read_bytes(2, context)?))
    }

    pub fn read_i32(&mut self, context: &str) -> ProtocolResult<i32> {
        Ok(LittleEndian::read_i32(self.read_bytes(4, context)?))
    }

    pub fn read_u32(&mut self, context: &str) -> ProtocolResult<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(4, context)?))
    }

    pub fn read_u64(&mut self, context: &str) -> ProtocolResult<u64> {
        Ok(LittleEndian::read_u64(self.read_bytes(8, context)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian() {
        let data = [0x27, 0x03, 0x00, 0x00, 0x24, 0x02, 0x00];
        let mut reader = WireReader::new(&data);
        assert_eq!(reader.read_u32("emsg").unwrap(), 807);
        assert_eq!(reader.read_u8("size").unwrap(), 36);
        assert_eq!(reader.read_u16("version").unwrap(), 2);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_truncated_read_reports_context() {
        let data = [1, 2, 3];
        let mut reader = WireReader::new(&data);
        let err = reader.read_u64("target job id").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::message_too_small(8, 3, "target job id")
        );
        // Failed read does not advance
        assert_eq!(reader.position(), 0);
    }
}
