//! # Message Headers
//!
//! ## Purpose
//!
//! Three header layouts prefix every Steam client message:
//!
//! - [`MsgHdr`]: 20 bytes, used for the channel-encryption handshake
//! - [`ExtendedClientMsgHdr`]: 36 bytes, carries steam id and session id directly
//! - [`MsgHdrProtoBuf`]: 8 bytes plus an embedded [`CMsgProtoBufHeader`] of
//!   declared length
//!
//! ## Wire Format
//!
//! ```text
//! MsgHdr                 ExtendedClientMsgHdr         MsgHdrProtoBuf
//! ┌──────────────┐       ┌──────────────────┐         ┌─────────────────────┐
//! │ emsg     i32 │       │ emsg         i32 │         │ emsg | 0x80000000   │
//! │ target   u64 │       │ header_size   u8 │ = 36    │ header_length   i32 │
//! │ source   u64 │       │ header_ver   u16 │ = 2     │ CMsgProtoBufHeader  │
//! └──────────────┘       │ target       u64 │         │ (header_length B)   │
//!                        │ source       u64 │         └─────────────────────┘
//!                        │ canary        u8 │ = 0xEF
//!                        │ steam_id     u64 │
//!                        │ session_id   i32 │
//!                        └──────────────────┘
//! ```
//!
//! All integers are little-endian. The "no job" value is `u64::MAX` in every
//! layout.

use std::fmt;

use bytes::{BufMut, BytesMut};
use prost::Message;
use steam_types::{JobId, SteamId};

use crate::emsg::{self, EMsg};
use crate::error::{ProtocolError, ProtocolResult};
use crate::proto::CMsgProtoBufHeader;
use crate::reader::WireReader;
use crate::serializable::Serializable;

/// Header family of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderKind {
    Basic,
    Extended,
    Protobuf,
}

impl HeaderKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "MsgHdr",
            Self::Extended => "ExtendedClientMsgHdr",
            Self::Protobuf => "MsgHdrProtoBuf",
        }
    }
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::MsgHdr {}
    impl Sealed for super::ExtendedClientMsgHdr {}
    impl Sealed for super::MsgHdrProtoBuf {}
}

/// Uniform access to the three header layouts
pub trait MessageHeader: Serializable + Default + Clone + fmt::Debug + sealed::Sealed {
    const KIND: HeaderKind;

    fn msg_type(&self) -> EMsg;
    fn set_msg_type(&mut self, msg: EMsg);

    fn target_job_id(&self) -> JobId;
    fn set_target_job_id(&mut self, job_id: JobId);

    fn source_job_id(&self) -> JobId;
    fn set_source_job_id(&mut self, job_id: JobId);
}

/// Basic 20-byte header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgHdr {
    pub msg: EMsg,
    pub target_job_id: JobId,
    pub source_job_id: JobId,
}

impl MsgHdr {
    pub const SIZE: usize = 20;
}

impl Default for MsgHdr {
    fn default() -> Self {
        Self {
            msg: EMsg::INVALID,
            target_job_id: JobId::INVALID,
            source_job_id: JobId::INVALID,
        }
    }
}

impl Serializable for MsgHdr {
    fn encode(&self, out: &mut BytesMut) {
        out.reserve(Self::SIZE);
        out.put_u32_le(self.msg.value());
        out.put_u64_le(self.target_job_id.to_u64());
        out.put_u64_le(self.source_job_id.to_u64());
    }

    fn decode(reader: &mut WireReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            msg: EMsg(reader.read_u32("MsgHdr.msg")?),
            target_job_id: JobId::from_u64(reader.read_u64("MsgHdr.target_job_id")?),
            source_job_id: JobId::from_u64(reader.read_u64("MsgHdr.source_job_id")?),
        })
    }
}

impl MessageHeader for MsgHdr {
    const KIND: HeaderKind = HeaderKind::Basic;

    fn msg_type(&self) -> EMsg {
        self.msg
    }

    fn set_msg_type(&mut self, msg: EMsg) {
        self.msg = msg;
    }

    fn target_job_id(&self) -> JobId {
        self.target_job_id
    }

    fn set_target_job_id(&mut self, job_id: JobId) {
        self.target_job_id = job_id;
    }

    fn source_job_id(&self) -> JobId {
        self.source_job_id
    }

    fn set_source_job_id(&mut self, job_id: JobId) {
        self.source_job_id = job_id;
    }
}

/// Extended 36-byte client header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedClientMsgHdr {
    pub msg: EMsg,
    pub header_size: u8,
    pub header_version: u16,
    pub target_job_id: JobId,
    pub source_job_id: JobId,
    pub header_canary: u8,
    pub steam_id: SteamId,
    pub session_id: i32,
}

impl ExtendedClientMsgHdr {
    pub const SIZE: usize = 36;
    pub const HEADER_SIZE: u8 = 36;
    pub const HEADER_VERSION: u16 = 2;
    pub const HEADER_CANARY: u8 = 239;

    /// Check the three sentinel fields against their fixed values
    pub fn validate_constants(&self) -> ProtocolResult<()> {
        if self.header_size != Self::HEADER_SIZE {
            return Err(ProtocolError::InvalidHeaderConstant {
                field: "header_size",
                expected: Self::HEADER_SIZE as u32,
                actual: self.header_size as u32,
            });
        }
        if self.header_version != Self::HEADER_VERSION {
            return Err(ProtocolError::InvalidHeaderConstant {
                field: "header_version",
                expected: Self::HEADER_VERSION as u32,
                actual: self.header_version as u32,
            });
        }
        if self.header_canary != Self::HEADER_CANARY {
            return Err(ProtocolError::InvalidHeaderConstant {
                field: "header_canary",
                expected: Self::HEADER_CANARY as u32,
                actual: self.header_canary as u32,
            });
        }
        Ok(())
    }
}

impl Default for ExtendedClientMsgHdr {
    fn default() -> Self {
        Self {
            msg: EMsg::INVALID,
            header_size: Self::HEADER_SIZE,
            header_version: Self::HEADER_VERSION,
            target_job_id: JobId::INVALID,
            source_job_id: JobId::INVALID,
            header_canary: Self::HEADER_CANARY,
            steam_id: SteamId::default(),
            session_id: 0,
        }
    }
}

impl Serializable for ExtendedClientMsgHdr {
    fn encode(&self, out: &mut BytesMut) {
        out.reserve(Self::SIZE);
        out.put_u32_le(self.msg.value());
        out.put_u8(self.header_size);
        out.put_u16_le(self.header_version);
        out.put_u64_le(self.target_job_id.to_u64());
        out.put_u64_le(self.source_job_id.to_u64());
        out.put_u8(self.header_canary);
        out.put_u64_le(self.steam_id.to_u64());
        out.put_i32_le(self.session_id);
    }

    fn decode(reader: &mut WireReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            msg: EMsg(reader.read_u32("ExtendedClientMsgHdr.msg")?),
            header_size: reader.read_u8("ExtendedClientMsgHdr.header_size")?,
            header_version: reader.read_u16("ExtendedClientMsgHdr.header_version")?,
            target_job_id: JobId::from_u64(reader.read_u64("ExtendedClientMsgHdr.target_job_id")?),
            source_job_id: JobId::from_u64(reader.read_u64("ExtendedClientMsgHdr.source_job_id")?),
            header_canary: reader.read_u8("ExtendedClientMsgHdr.header_canary")?,
            steam_id: SteamId::from_u64(reader.read_u64("ExtendedClientMsgHdr.steam_id")?),
            session_id: reader.read_i32("ExtendedClientMsgHdr.session_id")?,
        })
    }
}

impl MessageHeader for ExtendedClientMsgHdr {
    const KIND: HeaderKind = HeaderKind::Extended;

    fn msg_type(&self) -> EMsg {
        self.msg
    }

    fn set_msg_type(&mut self, msg: EMsg) {
        self.msg = msg;
    }

    fn target_job_id(&self) -> JobId {
        self.target_job_id
    }

    fn set_target_job_id(&mut self, job_id: JobId) {
        self.target_job_id = job_id;
    }

    fn source_job_id(&self) -> JobId {
        self.source_job_id
    }

    fn set_source_job_id(&mut self, job_id: JobId) {
        self.source_job_id = job_id;
    }
}

/// Protobuf header: masked message type, declared length, embedded sub-message
///
/// `msg` holds the logical type; the protobuf flag is applied on encode and
/// stripped on decode.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MsgHdrProtoBuf {
    pub msg: EMsg,
    pub proto: CMsgProtoBufHeader,
}

impl MsgHdrProtoBuf {
    /// Masked type plus length prefix
    pub const FIXED_SIZE: usize = 8;

    pub fn encoded_len(&self) -> usize {
        Self::FIXED_SIZE + self.proto.encoded_len()
    }
}

impl Serializable for MsgHdrProtoBuf {
    fn encode(&self, out: &mut BytesMut) {
        let proto_len = self.proto.encoded_len();
        out.reserve(Self::FIXED_SIZE + proto_len);
        out.put_u32_le(emsg::encode_with_protobuf_flag(self.msg));
        out.put_i32_le(proto_len as i32);
        // BytesMut grows on demand, so encoding cannot run out of room
        let _ = self.proto.encode(out);
    }

    fn decode(reader: &mut WireReader<'_>) -> ProtocolResult<Self> {
        let (msg, _) = emsg::decode_stripping_protobuf_flag(reader.read_u32("MsgHdrProtoBuf.msg")?);

        let length_offset = reader.position();
        let declared = reader.read_i32("MsgHdrProtoBuf.header_length")?;
        if declared < 0 || declared as usize > reader.remaining() {
            return Err(ProtocolError::invalid_header_length(
                declared,
                reader.remaining(),
                length_offset,
            ));
        }

        let proto_bytes = reader.read_bytes(declared as usize, "MsgHdrProtoBuf.proto")?;
        let proto = CMsgProtoBufHeader::decode(proto_bytes)
            .map_err(|e| ProtocolError::protobuf_decode("CMsgProtoBufHeader", e))?;

        Ok(Self { msg, proto })
    }
}

impl MessageHeader for MsgHdrProtoBuf {
    const KIND: HeaderKind = HeaderKind::Protobuf;

    fn msg_type(&self) -> EMsg {
        self.msg
    }

    fn set_msg_type(&mut self, msg: EMsg) {
        self.msg = msg;
    }

    fn target_job_id(&self) -> JobId {
        self.proto.target_job_id()
    }

    fn set_target_job_id(&mut self, job_id: JobId) {
        self.proto.set_target_job_id(job_id);
    }

    fn source_job_id(&self) -> JobId {
        self.proto.source_job_id()
    }

    fn set_source_job_id(&mut self, job_id: JobId) {
        self.proto.set_source_job_id(job_id);
    }
}

/// Any of the three header layouts
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    Basic(MsgHdr),
    Extended(ExtendedClientMsgHdr),
    Protobuf(MsgHdrProtoBuf),
}

impl Header {
    /// Decode a header of the given family from the front of `data`
    pub fn decode(kind: HeaderKind, data: &[u8]) -> ProtocolResult<(Self, usize)> {
        let mut reader = WireReader::new(data);
        let header = match kind {
            HeaderKind::Basic => Self::Basic(MsgHdr::decode(&mut reader)?),
            HeaderKind::Extended => Self::Extended(ExtendedClientMsgHdr::decode(&mut reader)?),
            HeaderKind::Protobuf => Self::Protobuf(MsgHdrProtoBuf::decode(&mut reader)?),
        };
        Ok((header, reader.position()))
    }

    pub fn encode(&self, out: &mut BytesMut) {
        match self {
            Self::Basic(h) => h.encode(out),
            Self::Extended(h) => h.encode(out),
            Self::Protobuf(h) => h.encode(out),
        }
    }

    pub fn kind(&self) -> HeaderKind {
        match self {
            Self::Basic(_) => HeaderKind::Basic,
            Self::Extended(_) => HeaderKind::Extended,
            Self::Protobuf(_) => HeaderKind::Protobuf,
        }
    }

    pub fn msg_type(&self) -> EMsg {
        match self {
            Self::Basic(h) => h.msg_type(),
            Self::Extended(h) => h.msg_type(),
            Self::Protobuf(h) => h.msg_type(),
        }
    }

    pub fn set_msg_type(&mut self, msg: EMsg) {
        match self {
            Self::Basic(h) => h.set_msg_type(msg),
            Self::Extended(h) => h.set_msg_type(msg),
            Self::Protobuf(h) => h.set_msg_type(msg),
        }
    }

    pub fn target_job_id(&self) -> JobId {
        match self {
            Self::Basic(h) => h.target_job_id(),
            Self::Extended(h) => h.target_job_id(),
            Self::Protobuf(h) => h.target_job_id(),
        }
    }

    pub fn source_job_id(&self) -> JobId {
        match self {
            Self::Basic(h) => h.source_job_id(),
            Self::Extended(h) => h.source_job_id(),
            Self::Protobuf(h) => h.source_job_id(),
        }
    }

    /// Steam id, where the layout carries one
    pub fn steam_id(&self) -> Option<SteamId> {
        match self {
            Self::Basic(_) => None,
            Self::Extended(h) => Some(h.steam_id),
            Self::Protobuf(h) => Some(h.proto.steam_id()),
        }
    }

    /// Session id, where the layout carries one
    pub fn session_id(&self) -> Option<i32> {
        match self {
            Self::Basic(_) => None,
            Self::Extended(h) => Some(h.session_id),
            Self::Protobuf(h) => Some(h.proto.client_sessionid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_header_layout() {
        let header = MsgHdr {
            msg: EMsg::CHANNEL_ENCRYPT_REQUEST,
            ..Default::default()
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), MsgHdr::SIZE);
        assert_eq!(&bytes[..4], &1303u32.to_le_bytes());
        assert!(bytes[4..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_extended_header_layout() {
        let header = ExtendedClientMsgHdr {
            msg: EMsg::CLIENT_CHAT_ENTER,
            steam_id: SteamId::from_u64(76561197969249708),
            session_id: 0x0011_568E,
            ..Default::default()
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), ExtendedClientMsgHdr::SIZE);
        assert_eq!(
            &bytes[..],
            &[
                0x27, 0x03, 0x00, 0x00, 0x24, 0x02, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
                0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xEF, 0xAC, 0x15,
                0x89, 0x00, 0x01, 0x00, 0x10, 0x01, 0x8E, 0x56, 0x11, 0x00,
            ][..]
        );
    }

    #[test]
    fn test_validate_constants() {
        let mut header = ExtendedClientMsgHdr::default();
        assert!(header.validate_constants().is_ok());

        header.header_canary = 0;
        assert_eq!(
            header.validate_constants(),
            Err(ProtocolError::InvalidHeaderConstant {
                field: "header_canary",
                expected: 239,
                actual: 0,
            })
        );
    }

    #[test]
    fn test_protobuf_header_sets_flag() {
        let header = MsgHdrProtoBuf {
            msg: EMsg::CLIENT_LOG_ON_RESPONSE,
            ..Default::default()
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[..4], &0x8000_02EFu32.to_le_bytes());
        assert_eq!(&bytes[4..8], &0i32.to_le_bytes());
        assert_eq!(bytes.len(), MsgHdrProtoBuf::FIXED_SIZE);
    }

    #[test]
    fn test_header_enum_decodes_each_kind() {
        let mut header = MsgHdrProtoBuf {
            msg: EMsg::CLIENT_HEART_BEAT,
            ..Default::default()
        };
        header.set_source_job_id(JobId::from_u64(99));
        let bytes = header.to_bytes();

        let (decoded, consumed) = Header::decode(HeaderKind::Protobuf, &bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded.kind(), HeaderKind::Protobuf);
        assert_eq!(decoded.msg_type(), EMsg::CLIENT_HEART_BEAT);
        assert_eq!(decoded.source_job_id(), JobId::from_u64(99));
        assert_eq!(decoded.target_job_id(), JobId::INVALID);

        let basic = MsgHdr::default().to_bytes();
        let (decoded, consumed) = Header::decode(HeaderKind::Basic, &basic).unwrap();
        assert_eq!(consumed, MsgHdr::SIZE);
        assert_eq!(decoded.steam_id(), None);
        assert_eq!(decoded.session_id(), None);
    }
}
