//! # Message Envelopes
//!
//! ## Purpose
//!
//! An envelope binds a header layout to a body type and a trailing payload:
//!
//! | Envelope               | Header                 | Body              | Payload reserve |
//! |------------------------|------------------------|-------------------|-----------------|
//! | [`Msg<B>`]             | [`MsgHdr`]             | fixed layout      | 0               |
//! | [`ClientMsg<B>`]       | [`ExtendedClientMsgHdr`] | fixed layout    | 64              |
//! | [`ClientMsgProtobuf<B>`] | [`MsgHdrProtoBuf`]   | protobuf          | 64              |
//!
//! `serialize` writes header, body, payload in that order with no extra
//! framing. `deserialize` reads the header, then the body, and keeps whatever
//! is left as the payload with its cursor at 0. A failed `deserialize` leaves
//! the envelope untouched.
//!
//! Protobuf bodies are not self-delimiting, so a received
//! [`ClientMsgProtobuf`] always consumes the rest of the frame as body and has
//! an empty payload. Payload bytes written on the send side are decoded as
//! body fields by the receiver and can overwrite real ones, so serializing a
//! protobuf envelope with a payload logs a warning.
//!
//! ## Construction
//!
//! - send: `new()` with a default body, or `with_options(&options)` to take
//!   the payload reserve from [`CodecOptions`]
//! - reply: `reply_to(&request)` also targets the request's source job
//! - receive: `from_bytes(data)` or `from_packet(&packet)`

use std::fmt;

use bytes::{Bytes, BytesMut};
use prost::Message;
use steam_types::{JobId, SteamId};
use tracing::warn;

use crate::emsg::EMsg;
use crate::error::{ProtocolError, ProtocolResult};
use crate::header::{ExtendedClientMsgHdr, MessageHeader, MsgHdr, MsgHdrProtoBuf};
use crate::options::CodecOptions;
use crate::packet::PacketMessage;
use crate::payload::Payload;
use crate::proto::CMsgProtoBufHeader;
use crate::reader::WireReader;
use crate::serializable::{Serializable, StructBody};

/// Payload reserve for the extended and protobuf families
pub const DEFAULT_CLIENT_PAYLOAD_RESERVE: usize = 64;
/// Payload reserve for the basic family
pub const DEFAULT_MSG_PAYLOAD_RESERVE: usize = 0;

/// Header plus payload shared by every envelope
#[derive(Debug, Clone, PartialEq)]
pub struct MsgBase<H: MessageHeader> {
    pub header: H,
    pub payload: Payload,
}

impl<H: MessageHeader> MsgBase<H> {
    pub fn new(payload_reserve: usize) -> Self {
        Self {
            header: H::default(),
            payload: Payload::with_capacity(payload_reserve),
        }
    }
}

/// Uniform view over the envelope families
pub trait ClientMessage {
    type Header: MessageHeader;

    fn base(&self) -> &MsgBase<Self::Header>;
    fn base_mut(&mut self) -> &mut MsgBase<Self::Header>;

    fn session_id(&self) -> i32;
    fn set_session_id(&mut self, session_id: i32);

    fn steam_id(&self) -> SteamId;
    fn set_steam_id(&mut self, steam_id: SteamId);

    /// Header, body, payload
    fn serialize(&self) -> Bytes;

    /// Replace header, body and payload with the contents of `data`
    fn deserialize(&mut self, data: &[u8]) -> ProtocolResult<()>;

    fn header(&self) -> &Self::Header {
        &self.base().header
    }

    fn header_mut(&mut self) -> &mut Self::Header {
        &mut self.base_mut().header
    }

    fn is_proto(&self) -> bool {
        <Self::Header as MessageHeader>::KIND == crate::header::HeaderKind::Protobuf
    }

    fn msg_type(&self) -> EMsg {
        self.header().msg_type()
    }

    fn target_job_id(&self) -> JobId {
        self.header().target_job_id()
    }

    fn set_target_job_id(&mut self, job_id: JobId) {
        self.header_mut().set_target_job_id(job_id);
    }

    fn source_job_id(&self) -> JobId {
        self.header().source_job_id()
    }

    fn set_source_job_id(&mut self, job_id: JobId) {
        self.header_mut().set_source_job_id(job_id);
    }

    fn payload(&self) -> &Payload {
        &self.base().payload
    }

    fn payload_mut(&mut self) -> &mut Payload {
        &mut self.base_mut().payload
    }
}

fn ensure_not_empty(data: &[u8], what: &str) -> ProtocolResult<()> {
    if data.is_empty() {
        return Err(ProtocolError::invalid_argument(format!(
            "{what} requires a non-empty buffer"
        )));
    }
    Ok(())
}

fn ensure_kind<H: MessageHeader>(packet: &impl PacketMessage) -> ProtocolResult<()> {
    if packet.header_kind() != H::KIND {
        return Err(ProtocolError::HeaderKindMismatch {
            expected: H::KIND.name(),
            actual: packet.header_kind().name(),
        });
    }
    Ok(())
}

/// Basic header with a fixed-layout body
///
/// The basic header has no steam id or session id; the accessors hold
/// envelope-local values that are never serialized.
#[derive(Clone, PartialEq)]
pub struct Msg<B: StructBody> {
    base: MsgBase<MsgHdr>,
    pub body: B,
    session_id: i32,
    steam_id: SteamId,
}

impl<B: StructBody> Msg<B> {
    pub fn new() -> Self {
        Self::with_payload_reserve(DEFAULT_MSG_PAYLOAD_RESERVE)
    }

    pub fn with_options(options: &CodecOptions) -> Self {
        Self::with_payload_reserve(options.reserve_for(MsgHdr::KIND))
    }

    pub fn with_payload_reserve(payload_reserve: usize) -> Self {
        let mut base = MsgBase::<MsgHdr>::new(payload_reserve);
        base.header.set_msg_type(B::EMSG);
        Self {
            base,
            body: B::default(),
            session_id: 0,
            steam_id: SteamId::default(),
        }
    }

    /// New message targeting `request`'s source job
    pub fn reply_to<R>(request: &R) -> Self
    where
        R: ClientMessage<Header = MsgHdr>,
    {
        let mut msg = Self::new();
        msg.base.header.target_job_id = request.header().source_job_id;
        msg
    }

    pub fn from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut msg = Self::new();
        msg.deserialize(data)?;
        Ok(msg)
    }

    pub fn from_packet(packet: &impl PacketMessage) -> ProtocolResult<Self> {
        ensure_kind::<MsgHdr>(packet)?;
        Self::from_bytes(packet.data())
    }
}

impl<B: StructBody> Default for Msg<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: StructBody> fmt::Debug for Msg<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Msg")
            .field("header", &self.base.header)
            .field("body", &self.body)
            .field("payload_len", &self.base.payload.len())
            .finish()
    }
}

impl<B: StructBody> ClientMessage for Msg<B> {
    type Header = MsgHdr;

    fn base(&self) -> &MsgBase<MsgHdr> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MsgBase<MsgHdr> {
        &mut self.base
    }

    fn session_id(&self) -> i32 {
        self.session_id
    }

    fn set_session_id(&mut self, session_id: i32) {
        self.session_id = session_id;
    }

    fn steam_id(&self) -> SteamId {
        self.steam_id
    }

    fn set_steam_id(&mut self, steam_id: SteamId) {
        self.steam_id = steam_id;
    }

    fn serialize(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(MsgHdr::SIZE + self.base.payload.len());
        self.base.header.encode(&mut out);
        self.body.encode(&mut out);
        out.extend_from_slice(self.base.payload.as_bytes());
        out.freeze()
    }

    fn deserialize(&mut self, data: &[u8]) -> ProtocolResult<()> {
        ensure_not_empty(data, "Msg")?;
        let mut reader = WireReader::new(data);
        let header = MsgHdr::decode(&mut reader)?;
        let body = B::decode(&mut reader)?;

        self.base.header = header;
        self.body = body;
        self.base.payload = Payload::from_slice(reader.rest());
        Ok(())
    }
}

/// Extended client header with a fixed-layout body
#[derive(Clone, PartialEq)]
pub struct ClientMsg<B: StructBody> {
    base: MsgBase<ExtendedClientMsgHdr>,
    pub body: B,
}

impl<B: StructBody> ClientMsg<B> {
    pub fn new() -> Self {
        Self::with_payload_reserve(DEFAULT_CLIENT_PAYLOAD_RESERVE)
    }

    pub fn with_options(options: &CodecOptions) -> Self {
        Self::with_payload_reserve(options.reserve_for(ExtendedClientMsgHdr::KIND))
    }

    pub fn with_payload_reserve(payload_reserve: usize) -> Self {
        let mut base = MsgBase::<ExtendedClientMsgHdr>::new(payload_reserve);
        base.header.set_msg_type(B::EMSG);
        Self {
            base,
            body: B::default(),
        }
    }

    /// New message targeting `request`'s source job
    pub fn reply_to<R>(request: &R) -> Self
    where
        R: ClientMessage<Header = ExtendedClientMsgHdr>,
    {
        let mut msg = Self::new();
        msg.base.header.target_job_id = request.header().source_job_id;
        msg
    }

    pub fn from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut msg = Self::new();
        msg.deserialize(data)?;
        Ok(msg)
    }

    pub fn from_packet(packet: &impl PacketMessage) -> ProtocolResult<Self> {
        ensure_kind::<ExtendedClientMsgHdr>(packet)?;
        Self::from_bytes(packet.data())
    }
}

impl<B: StructBody> Default for ClientMsg<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: StructBody> fmt::Debug for ClientMsg<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientMsg")
            .field("header", &self.base.header)
            .field("body", &self.body)
            .field("payload_len", &self.base.payload.len())
            .finish()
    }
}

impl<B: StructBody> ClientMessage for ClientMsg<B> {
    type Header = ExtendedClientMsgHdr;

    fn base(&self) -> &MsgBase<ExtendedClientMsgHdr> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MsgBase<ExtendedClientMsgHdr> {
        &mut self.base
    }

    fn session_id(&self) -> i32 {
        self.base.header.session_id
    }

    fn set_session_id(&mut self, session_id: i32) {
        self.base.header.session_id = session_id;
    }

    fn steam_id(&self) -> SteamId {
        self.base.header.steam_id
    }

    fn set_steam_id(&mut self, steam_id: SteamId) {
        self.base.header.steam_id = steam_id;
    }

    fn serialize(&self) -> Bytes {
        let mut out =
            BytesMut::with_capacity(ExtendedClientMsgHdr::SIZE + self.base.payload.len());
        self.base.header.encode(&mut out);
        self.body.encode(&mut out);
        out.extend_from_slice(self.base.payload.as_bytes());
        out.freeze()
    }

    fn deserialize(&mut self, data: &[u8]) -> ProtocolResult<()> {
        ensure_not_empty(data, "ClientMsg")?;
        let mut reader = WireReader::new(data);
        let header = ExtendedClientMsgHdr::decode(&mut reader)?;
        let body = B::decode(&mut reader)?;

        self.base.header = header;
        self.body = body;
        self.base.payload = Payload::from_slice(reader.rest());
        Ok(())
    }
}

/// Protobuf header with a protobuf body
#[derive(Clone, PartialEq)]
pub struct ClientMsgProtobuf<B: Message + Default> {
    base: MsgBase<MsgHdrProtoBuf>,
    pub body: B,
}

impl<B: Message + Default> ClientMsgProtobuf<B> {
    pub fn new(msg: EMsg) -> Self {
        Self::with_payload_reserve(msg, DEFAULT_CLIENT_PAYLOAD_RESERVE)
    }

    pub fn with_options(msg: EMsg, options: &CodecOptions) -> Self {
        Self::with_payload_reserve(msg, options.reserve_for(MsgHdrProtoBuf::KIND))
    }

    pub fn with_payload_reserve(msg: EMsg, payload_reserve: usize) -> Self {
        let mut base = MsgBase::<MsgHdrProtoBuf>::new(payload_reserve);
        base.header.set_msg_type(msg);
        Self {
            base,
            body: B::default(),
        }
    }

    /// New message of type `msg` targeting `request`'s source job
    pub fn reply_to<R>(msg: EMsg, request: &R) -> Self
    where
        R: ClientMessage<Header = MsgHdrProtoBuf>,
    {
        let mut reply = Self::new(msg);
        reply
            .base
            .header
            .set_target_job_id(request.header().source_job_id());
        reply
    }

    pub fn from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let mut msg = Self::new(EMsg::INVALID);
        msg.deserialize(data)?;
        Ok(msg)
    }

    pub fn from_packet(packet: &impl PacketMessage) -> ProtocolResult<Self> {
        ensure_kind::<MsgHdrProtoBuf>(packet)?;
        Self::from_bytes(packet.data())
    }

    /// Embedded protobuf header
    pub fn proto_header(&self) -> &CMsgProtoBufHeader {
        &self.base.header.proto
    }

    pub fn proto_header_mut(&mut self) -> &mut CMsgProtoBufHeader {
        &mut self.base.header.proto
    }
}

impl<B: Message + Default> fmt::Debug for ClientMsgProtobuf<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientMsgProtobuf")
            .field("header", &self.base.header)
            .field("body", &self.body)
            .field("payload_len", &self.base.payload.len())
            .finish()
    }
}

impl<B: Message + Default> ClientMessage for ClientMsgProtobuf<B> {
    type Header = MsgHdrProtoBuf;

    fn base(&self) -> &MsgBase<MsgHdrProtoBuf> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut MsgBase<MsgHdrProtoBuf> {
        &mut self.base
    }

    fn session_id(&self) -> i32 {
        self.base.header.proto.client_sessionid()
    }

    fn set_session_id(&mut self, session_id: i32) {
        self.base.header.proto.client_sessionid = Some(session_id);
    }

    fn steam_id(&self) -> SteamId {
        self.base.header.proto.steam_id()
    }

    fn set_steam_id(&mut self, steam_id: SteamId) {
        self.base.header.proto.set_steam_id(steam_id);
    }

    fn serialize(&self) -> Bytes {
        if !self.base.payload.is_empty() {
            warn!(
                msg = %self.base.header.msg_type(),
                payload_len = self.base.payload.len(),
                "Protobuf message has a payload; the receiver will decode it as body fields"
            );
        }
        let mut out = BytesMut::with_capacity(
            self.base.header.encoded_len() + self.body.encoded_len() + self.base.payload.len(),
        );
        self.base.header.encode(&mut out);
        // BytesMut grows on demand, so encoding cannot run out of room
        let _ = self.body.encode(&mut out);
        out.extend_from_slice(self.base.payload.as_bytes());
        out.freeze()
    }

    fn deserialize(&mut self, data: &[u8]) -> ProtocolResult<()> {
        ensure_not_empty(data, "ClientMsgProtobuf")?;
        let mut reader = WireReader::new(data);
        let header = MsgHdrProtoBuf::decode(&mut reader)?;
        let body = B::decode(reader.take_rest())
            .map_err(|e| ProtocolError::protobuf_decode("message body", e))?;

        self.base.header = header;
        self.body = body;
        self.base.payload = Payload::from_slice(reader.rest());
        Ok(())
    }
}
