//! # Packet Views and Routing
//!
//! ## Purpose
//!
//! A packet is a received frame whose header has been decoded and whose body
//! has not. Routers inspect the message type and job ids, then hand the
//! untouched buffer to the matching typed envelope.
//!
//! ## Routing Rules
//!
//! 1. Frames shorter than 4 bytes cannot carry a message type and are rejected
//! 2. The protobuf flag is stripped to obtain the logical type
//! 3. Channel-encryption handshake messages use the basic header
//! 4. Anything else with the protobuf flag uses the protobuf header
//! 5. Everything else uses the extended header
//!
//! ## Examples
//!
//! ```rust
//! use bytes::Bytes;
//! use steam_codec::{get_packet_msg, EMsg, MsgHdr, PacketMessage, Serializable};
//!
//! let header = MsgHdr { msg: EMsg::CHANNEL_ENCRYPT_REQUEST, ..Default::default() };
//! let packet = get_packet_msg(header.to_bytes().freeze()).unwrap();
//! assert_eq!(packet.msg_type(), EMsg::CHANNEL_ENCRYPT_REQUEST);
//! assert!(!packet.is_proto());
//! ```

use bytes::Bytes;
use steam_types::JobId;
use tracing::{debug, trace, warn};

use crate::emsg::{self, EMsg};
use crate::error::{ProtocolError, ProtocolResult};
use crate::header::{ExtendedClientMsgHdr, Header, HeaderKind, MessageHeader, MsgHdr, MsgHdrProtoBuf};
use crate::options::CodecOptions;
use crate::proto::CMsgProtoBufHeader;
use crate::reader::WireReader;
use crate::serializable::Serializable;

/// Read-only view over a received frame
pub trait PacketMessage {
    fn header_kind(&self) -> HeaderKind;
    fn msg_type(&self) -> EMsg;
    fn target_job_id(&self) -> JobId;
    fn source_job_id(&self) -> JobId;

    /// The complete frame, header included, exactly as received
    fn data(&self) -> &Bytes;

    fn is_proto(&self) -> bool {
        self.header_kind() == HeaderKind::Protobuf
    }
}

fn decode_header<H: MessageHeader>(data: &Bytes, context: &str) -> ProtocolResult<H> {
    if data.is_empty() {
        return Err(ProtocolError::invalid_argument(format!(
            "{context} requires a non-empty buffer"
        )));
    }
    H::decode(&mut WireReader::new(data))
}

macro_rules! packet_view {
    ($(#[$meta:meta])* $name:ident, $header:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            header: $header,
            data: Bytes,
        }

        impl $name {
            pub fn new(data: Bytes) -> ProtocolResult<Self> {
                let header = decode_header::<$header>(&data, stringify!($name))?;
                Ok(Self { header, data })
            }

            pub fn header(&self) -> &$header {
                &self.header
            }
        }

        impl PacketMessage for $name {
            fn header_kind(&self) -> HeaderKind {
                <$header as MessageHeader>::KIND
            }

            fn msg_type(&self) -> EMsg {
                self.header.msg_type()
            }

            fn target_job_id(&self) -> JobId {
                self.header.target_job_id()
            }

            fn source_job_id(&self) -> JobId {
                self.header.source_job_id()
            }

            fn data(&self) -> &Bytes {
                &self.data
            }
        }
    };
}

packet_view!(
    /// Frame with the basic 20-byte header
    PacketMsg,
    MsgHdr
);

packet_view!(
    /// Frame with the extended client header
    PacketClientMsg,
    ExtendedClientMsgHdr
);

packet_view!(
    /// Frame with the protobuf header
    PacketClientMsgProtobuf,
    MsgHdrProtoBuf
);

impl PacketClientMsgProtobuf {
    /// Decoded protobuf header: steam id, session, routing app id, eresult
    pub fn proto_header(&self) -> &CMsgProtoBufHeader {
        &self.header.proto
    }
}

/// A routed packet of any header family
#[derive(Debug, Clone, PartialEq)]
pub enum AnyPacketMsg {
    Basic(PacketMsg),
    Extended(PacketClientMsg),
    Protobuf(PacketClientMsgProtobuf),
}

impl AnyPacketMsg {
    /// Copy of the decoded header
    pub fn header(&self) -> Header {
        match self {
            Self::Basic(p) => Header::Basic(p.header.clone()),
            Self::Extended(p) => Header::Extended(p.header.clone()),
            Self::Protobuf(p) => Header::Protobuf(p.header.clone()),
        }
    }

    fn as_packet(&self) -> &dyn PacketMessage {
        match self {
            Self::Basic(p) => p,
            Self::Extended(p) => p,
            Self::Protobuf(p) => p,
        }
    }
}

impl PacketMessage for AnyPacketMsg {
    fn header_kind(&self) -> HeaderKind {
        self.as_packet().header_kind()
    }

    fn msg_type(&self) -> EMsg {
        self.as_packet().msg_type()
    }

    fn target_job_id(&self) -> JobId {
        self.as_packet().target_job_id()
    }

    fn source_job_id(&self) -> JobId {
        self.as_packet().source_job_id()
    }

    fn data(&self) -> &Bytes {
        self.as_packet().data()
    }
}

/// Header family a frame should be decoded with, from its leading message type
pub fn route(data: &[u8]) -> ProtocolResult<(EMsg, HeaderKind)> {
    if data.is_empty() {
        return Err(ProtocolError::invalid_argument(
            "packet routing requires a non-empty buffer",
        ));
    }
    let raw = WireReader::new(data).read_u32("packet message type")?;
    let (msg, is_proto) = emsg::decode_stripping_protobuf_flag(raw);

    let kind = if msg.is_channel_encrypt() {
        HeaderKind::Basic
    } else if is_proto {
        HeaderKind::Protobuf
    } else {
        HeaderKind::Extended
    };
    Ok((msg, kind))
}

/// Route a frame to the packet view matching its header family
pub fn get_packet_msg(data: Bytes) -> ProtocolResult<AnyPacketMsg> {
    PacketDecoder::default().decode(data)
}

/// Packet router with configurable limits
#[derive(Debug, Clone, Default)]
pub struct PacketDecoder {
    options: CodecOptions,
}

impl PacketDecoder {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn decode(&self, data: Bytes) -> ProtocolResult<AnyPacketMsg> {
        if data.len() > self.options.max_message_size {
            warn!(
                size = data.len(),
                max = self.options.max_message_size,
                "Dropping oversized frame"
            );
            return Err(ProtocolError::MessageTooLarge {
                size: data.len(),
                max: self.options.max_message_size,
            });
        }

        let (msg, kind) = route(&data)?;
        trace!(%msg, %kind, len = data.len(), "Routing frame");

        let packet = match kind {
            HeaderKind::Basic => PacketMsg::new(data).map(AnyPacketMsg::Basic),
            HeaderKind::Protobuf => PacketClientMsgProtobuf::new(data).map(AnyPacketMsg::Protobuf),
            HeaderKind::Extended => PacketClientMsg::new(data).and_then(|packet| {
                if self.options.validate_header_constants {
                    packet.header.validate_constants()?;
                }
                Ok(AnyPacketMsg::Extended(packet))
            }),
        };

        if let Err(e) = &packet {
            debug!(%msg, %kind, error = %e, "Failed to decode packet header");
        }
        packet
    }
}
