//! Message type identifiers and protobuf flag masking
//!
//! On the wire the top bit of the 32-bit message type says "this message uses a
//! protobuf header". Logical message types live in the low 31 bits, so masking
//! is lossless in both directions.

use std::fmt;

/// Top bit of the raw message type, set for protobuf-backed messages
pub const PROTO_MASK: u32 = 0x8000_0000;

/// Logical Steam message type
///
/// Kept open (a newtype rather than a closed enum) so routing never fails on a
/// message type this crate has no name for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct EMsg(pub u32);

impl EMsg {
    pub const INVALID: EMsg = EMsg(0);
    pub const MULTI: EMsg = EMsg(1);
    pub const CLIENT_HEART_BEAT: EMsg = EMsg(703);
    pub const CLIENT_LOG_ON_RESPONSE: EMsg = EMsg(751);
    pub const CLIENT_CHAT_MSG: EMsg = EMsg(799);
    pub const CLIENT_CHAT_ENTER: EMsg = EMsg(807);
    pub const CHANNEL_ENCRYPT_REQUEST: EMsg = EMsg(1303);
    pub const CHANNEL_ENCRYPT_RESPONSE: EMsg = EMsg(1304);
    pub const CHANNEL_ENCRYPT_RESULT: EMsg = EMsg(1305);
    pub const CLIENT_LOGON: EMsg = EMsg(5514);

    #[inline(always)]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline(always)]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Messages exchanged before the channel is encrypted use the basic header
    pub fn is_channel_encrypt(self) -> bool {
        matches!(
            self,
            Self::CHANNEL_ENCRYPT_REQUEST | Self::CHANNEL_ENCRYPT_RESPONSE | Self::CHANNEL_ENCRYPT_RESULT
        )
    }

    /// Human readable name for the message types this crate knows about
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::INVALID => "Invalid",
            Self::MULTI => "Multi",
            Self::CLIENT_HEART_BEAT => "ClientHeartBeat",
            Self::CLIENT_LOG_ON_RESPONSE => "ClientLogOnResponse",
            Self::CLIENT_CHAT_MSG => "ClientChatMsg",
            Self::CLIENT_CHAT_ENTER => "ClientChatEnter",
            Self::CHANNEL_ENCRYPT_REQUEST => "ChannelEncryptRequest",
            Self::CHANNEL_ENCRYPT_RESPONSE => "ChannelEncryptResponse",
            Self::CHANNEL_ENCRYPT_RESULT => "ChannelEncryptResult",
            Self::CLIENT_LOGON => "ClientLogon",
            _ => return None,
        })
    }
}

impl fmt::Display for EMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "EMsg({})", self.0),
        }
    }
}

impl From<u32> for EMsg {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<EMsg> for u32 {
    fn from(msg: EMsg) -> Self {
        msg.0
    }
}

/// Raw wire value for `msg`, with the protobuf flag set when `protobuf` is true
#[inline]
pub fn make_msg(msg: EMsg, protobuf: bool) -> u32 {
    if protobuf {
        msg.0 | PROTO_MASK
    } else {
        msg.0
    }
}

/// Logical message type with the protobuf flag stripped
#[inline]
pub fn get_msg(raw: u32) -> EMsg {
    EMsg(raw & !PROTO_MASK)
}

#[inline]
pub fn is_protobuf(raw: u32) -> bool {
    raw & PROTO_MASK != 0
}

#[inline]
pub fn encode_with_protobuf_flag(msg: EMsg) -> u32 {
    make_msg(msg, true)
}

#[inline]
pub fn decode_stripping_protobuf_flag(raw: u32) -> (EMsg, bool) {
    (get_msg(raw), is_protobuf(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_values() {
        assert_eq!(make_msg(EMsg::CLIENT_LOG_ON_RESPONSE, true), 0x8000_02EF);
        assert_eq!(make_msg(EMsg::CLIENT_LOG_ON_RESPONSE, false), 751);
        assert_eq!(get_msg(0x8000_02EF), EMsg::CLIENT_LOG_ON_RESPONSE);
        assert!(is_protobuf(0x8000_02EF));
        assert!(!is_protobuf(751));
    }

    #[test]
    fn test_display() {
        assert_eq!(EMsg::CLIENT_CHAT_ENTER.to_string(), "ClientChatEnter(807)");
        assert_eq!(EMsg(42).to_string(), "EMsg(42)");
    }

    proptest! {
        #[test]
        fn prop_flag_round_trip(value in 0u32..PROTO_MASK) {
            let msg = EMsg(value);
            prop_assert_eq!(decode_stripping_protobuf_flag(encode_with_protobuf_flag(msg)), (msg, true));
            prop_assert_eq!(decode_stripping_protobuf_flag(make_msg(msg, false)), (msg, false));
        }
    }
}
