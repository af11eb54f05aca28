//! Concrete message bodies
//!
//! Only the handshake messages and a few client messages are defined here:
//! enough to drive routing, the envelope round trips and the inspector tool.
//! Field order is the wire order.

use bytes::{BufMut, BytesMut};
use steam_types::{EUniverse, SteamId};

use crate::emsg::EMsg;
use crate::error::ProtocolResult;
use crate::reader::WireReader;
use crate::serializable::{Serializable, StructBody};

/// Server's opening handshake message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgChannelEncryptRequest {
    pub protocol_version: u32,
    /// Raw wire value; see [`MsgChannelEncryptRequest::universe`]
    pub universe_raw: u32,
}

impl MsgChannelEncryptRequest {
    pub const PROTOCOL_VERSION: u32 = 1;

    /// Universe; values outside the enum read as `Invalid`
    pub fn universe(&self) -> EUniverse {
        EUniverse::try_from(self.universe_raw).unwrap_or_default()
    }

    pub fn set_universe(&mut self, universe: EUniverse) {
        self.universe_raw = u32::from(universe);
    }
}

impl Default for MsgChannelEncryptRequest {
    fn default() -> Self {
        Self {
            protocol_version: Self::PROTOCOL_VERSION,
            universe_raw: u32::from(EUniverse::Invalid),
        }
    }
}

impl Serializable for MsgChannelEncryptRequest {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u32_le(self.protocol_version);
        out.put_u32_le(self.universe_raw);
    }

    fn decode(reader: &mut WireReader<'_>) -> ProtocolResult<Self> {
        let protocol_version = reader.read_u32("MsgChannelEncryptRequest.protocol_version")?;
        let universe_raw = reader.read_u32("MsgChannelEncryptRequest.universe")?;
        Ok(Self {
            protocol_version,
            universe_raw,
        })
    }
}

impl StructBody for MsgChannelEncryptRequest {
    const EMSG: EMsg = EMsg::CHANNEL_ENCRYPT_REQUEST;
}

/// Client's handshake reply; the encrypted session key follows as payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgChannelEncryptResponse {
    pub protocol_version: u32,
    pub key_size: u32,
}

impl Default for MsgChannelEncryptResponse {
    fn default() -> Self {
        Self {
            protocol_version: MsgChannelEncryptRequest::PROTOCOL_VERSION,
            key_size: 128,
        }
    }
}

impl Serializable for MsgChannelEncryptResponse {
    fn encode(&self, out: &mut BytesMut) {
        out.put_u32_le(self.protocol_version);
        out.put_u32_le(self.key_size);
    }

    fn decode(reader: &mut WireReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            protocol_version: reader.read_u32("MsgChannelEncryptResponse.protocol_version")?,
            key_size: reader.read_u32("MsgChannelEncryptResponse.key_size")?,
        })
    }
}

impl StructBody for MsgChannelEncryptResponse {
    const EMSG: EMsg = EMsg::CHANNEL_ENCRYPT_RESPONSE;
}

/// Handshake outcome; `result` is an EResult code (1 = OK)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsgChannelEncryptResult {
    pub result: i32,
}

impl Serializable for MsgChannelEncryptResult {
    fn encode(&self, out: &mut BytesMut) {
        out.put_i32_le(self.result);
    }

    fn decode(reader: &mut WireReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            result: reader.read_i32("MsgChannelEncryptResult.result")?,
        })
    }
}

impl StructBody for MsgChannelEncryptResult {
    const EMSG: EMsg = EMsg::CHANNEL_ENCRYPT_RESULT;
}

/// Chat room join result; member list follows as payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsgClientChatEnter {
    pub steam_id_chat: SteamId,
    pub steam_id_friend: SteamId,
    pub chat_room_type: i32,
    pub steam_id_owner: SteamId,
    pub steam_id_clan: SteamId,
    pub chat_flags: u8,
    pub enter_response: i32,
    pub num_members: i32,
}

impl MsgClientChatEnter {
    pub const SIZE: usize = 45;
}

impl Serializable for MsgClientChatEnter {
    fn encode(&self, out: &mut BytesMut) {
        out.reserve(Self::SIZE);
        out.put_u64_le(self.steam_id_chat.to_u64());
        out.put_u64_le(self.steam_id_friend.to_u64());
        out.put_i32_le(self.chat_room_type);
        out.put_u64_le(self.steam_id_owner.to_u64());
        out.put_u64_le(self.steam_id_clan.to_u64());
        out.put_u8(self.chat_flags);
        out.put_i32_le(self.enter_response);
        out.put_i32_le(self.num_members);
    }

    fn decode(reader: &mut WireReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            steam_id_chat: SteamId::from_u64(reader.read_u64("MsgClientChatEnter.steam_id_chat")?),
            steam_id_friend: SteamId::from_u64(reader.read_u64("MsgClientChatEnter.steam_id_friend")?),
            chat_room_type: reader.read_i32("MsgClientChatEnter.chat_room_type")?,
            steam_id_owner: SteamId::from_u64(reader.read_u64("MsgClientChatEnter.steam_id_owner")?),
            steam_id_clan: SteamId::from_u64(reader.read_u64("MsgClientChatEnter.steam_id_clan")?),
            chat_flags: reader.read_u8("MsgClientChatEnter.chat_flags")?,
            enter_response: reader.read_i32("MsgClientChatEnter.enter_response")?,
            num_members: reader.read_i32("MsgClientChatEnter.num_members")?,
        })
    }
}

impl StructBody for MsgClientChatEnter {
    const EMSG: EMsg = EMsg::CLIENT_CHAT_ENTER;
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CMsgClientHeartBeat {
    #[prost(bool, optional, tag = "1")]
    pub send_reply: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CMsgClientLogonResponse {
    #[prost(int32, optional, tag = "1", default = "2")]
    pub eresult: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub legacy_out_of_game_heartbeat_seconds: Option<i32>,
    #[prost(int32, optional, tag = "3")]
    pub heartbeat_seconds: Option<i32>,
    #[prost(uint32, optional, tag = "4")]
    pub deprecated_public_ip: Option<u32>,
    #[prost(fixed32, optional, tag = "5")]
    pub rtime32_server_time: Option<u32>,
    #[prost(uint32, optional, tag = "6")]
    pub account_flags: Option<u32>,
    #[prost(uint32, optional, tag = "7")]
    pub cell_id: Option<u32>,
    #[prost(string, optional, tag = "8")]
    pub email_domain: Option<String>,
    #[prost(fixed64, optional, tag = "20")]
    pub client_supplied_steamid: Option<u64>,
    #[prost(string, optional, tag = "21")]
    pub ip_country_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_enter_size() {
        let body = MsgClientChatEnter::default();
        assert_eq!(body.to_bytes().len(), MsgClientChatEnter::SIZE);
    }

    #[test]
    fn test_encrypt_request_defaults() {
        let body = MsgChannelEncryptRequest::default();
        assert_eq!(body.protocol_version, 1);
        assert_eq!(&body.to_bytes()[..], &[1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encrypt_request_unknown_universe_reads_invalid() {
        let data = [1, 0, 0, 0, 9, 0, 0, 0];
        let body = MsgChannelEncryptRequest::decode(&mut WireReader::new(&data)).unwrap();
        assert_eq!(body.universe(), EUniverse::Invalid);
        assert_eq!(body.universe_raw, 9);
        // Re-encoding keeps the unknown value
        assert_eq!(&body.to_bytes()[..], &data[..]);
    }
}
