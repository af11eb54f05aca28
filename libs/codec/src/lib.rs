//! # Steam Client Message Codec
//!
//! ## Purpose
//!
//! Framing rules for Steam client messages: the three header layouts, the
//! typed envelopes that pair a header with a body and a trailing payload, and
//! the packet views used to route a received frame before its body type is
//! known.
//!
//! ## Architecture Role
//!
//! ```text
//! transport bytes ──► get_packet_msg ──► AnyPacketMsg ──► ClientMsg<B>::from_packet
//!                      (header only)      (msg type,        (header + body + payload)
//!                                          job ids)
//! reply ◄── ClientMsg<R>::reply_to(&request).serialize()
//! ```
//!
//! ## What This Crate Contains
//!
//! - [`EMsg`] and protobuf flag masking
//! - [`MsgHdr`], [`ExtendedClientMsgHdr`], [`MsgHdrProtoBuf`] and the [`Header`] union
//! - [`Msg`], [`ClientMsg`], [`ClientMsgProtobuf`] envelopes with a [`Payload`] cursor
//! - [`PacketMsg`], [`PacketClientMsg`], [`PacketClientMsgProtobuf`] views and [`get_packet_msg`]
//! - A handful of concrete bodies in [`messages`]
//!
//! ## What This Crate Does NOT Contain
//!
//! - Identifier types (see `steam_types`)
//! - Job correlation (see `steam_jobs`)
//! - Sockets, encryption or compression
//!
//! ## Quick Start
//!
//! ```rust
//! use steam_codec::messages::MsgClientChatEnter;
//! use steam_codec::{get_packet_msg, ClientMessage, ClientMsg};
//! use steam_types::JobId;
//!
//! let mut request = ClientMsg::<MsgClientChatEnter>::new();
//! request.set_source_job_id(JobId::from_u64(42));
//! request.payload_mut().write_null_term_string("Saxton Hell");
//!
//! let packet = get_packet_msg(request.serialize()).unwrap();
//! let received = ClientMsg::<MsgClientChatEnter>::from_packet(&packet).unwrap();
//! assert_eq!(received.source_job_id(), JobId::from_u64(42));
//!
//! let reply = ClientMsg::<MsgClientChatEnter>::reply_to(&received);
//! assert_eq!(reply.target_job_id(), JobId::from_u64(42));
//! ```

pub mod emsg;
pub mod error;
pub mod header;
pub mod messages;
pub mod msg;
pub mod options;
pub mod packet;
pub mod payload;
pub mod proto;
pub mod reader;
pub mod serializable;

pub use emsg::{
    decode_stripping_protobuf_flag, encode_with_protobuf_flag, get_msg, is_protobuf, make_msg,
    EMsg, PROTO_MASK,
};
pub use error::{ProtocolError, ProtocolResult};
pub use header::{ExtendedClientMsgHdr, Header, HeaderKind, MessageHeader, MsgHdr, MsgHdrProtoBuf};
pub use msg::{ClientMessage, ClientMsg, ClientMsgProtobuf, Msg, MsgBase};
pub use options::CodecOptions;
pub use packet::{
    get_packet_msg, route, AnyPacketMsg, PacketClientMsg, PacketClientMsgProtobuf, PacketDecoder,
    PacketMessage, PacketMsg,
};
pub use payload::Payload;
pub use proto::CMsgProtoBufHeader;
pub use reader::WireReader;
pub use serializable::{Serializable, StructBody};
