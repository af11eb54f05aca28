//! Encode/decode contract shared by headers and fixed-layout bodies

use std::fmt;

use bytes::BytesMut;

use crate::emsg::EMsg;
use crate::error::ProtocolResult;
use crate::reader::WireReader;

/// A value with an explicit little-endian wire layout
pub trait Serializable: Sized {
    /// Append the wire form of `self` to `out`
    fn encode(&self, out: &mut BytesMut);

    /// Read one value from the cursor, consuming exactly its wire size
    fn decode(reader: &mut WireReader<'_>) -> ProtocolResult<Self>;

    fn to_bytes(&self) -> BytesMut {
        let mut out = BytesMut::new();
        self.encode(&mut out);
        out
    }
}

/// Fixed-layout message body that declares its own message type
pub trait StructBody: Serializable + Default + Clone + fmt::Debug {
    const EMSG: EMsg;
}
