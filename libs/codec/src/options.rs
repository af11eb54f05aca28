//! Decoder knobs

/// Largest frame accepted by default (the CM server caps frames well below this)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Options applied by [`crate::PacketDecoder`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecOptions {
    /// Initial payload capacity for extended and protobuf envelopes
    pub payload_reserve: usize,
    /// Reject extended headers whose size, version or canary are wrong
    pub validate_header_constants: bool,
    /// Frames longer than this are rejected before any parsing
    pub max_message_size: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            payload_reserve: crate::msg::DEFAULT_CLIENT_PAYLOAD_RESERVE,
            validate_header_constants: false,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl CodecOptions {
    /// Payload reserve for an envelope of the given header family
    ///
    /// The basic family never reserves; its messages carry no payload in practice.
    pub fn reserve_for(&self, kind: crate::header::HeaderKind) -> usize {
        match kind {
            crate::header::HeaderKind::Basic => crate::msg::DEFAULT_MSG_PAYLOAD_RESERVE,
            _ => self.payload_reserve,
        }
    }

    /// Strict preset: validates header constants
    pub fn strict() -> Self {
        Self {
            validate_header_constants: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderKind;

    #[test]
    fn test_reserve_for_family() {
        let options = CodecOptions {
            payload_reserve: 256,
            ..CodecOptions::default()
        };
        assert_eq!(options.reserve_for(HeaderKind::Basic), 0);
        assert_eq!(options.reserve_for(HeaderKind::Extended), 256);
        assert_eq!(options.reserve_for(HeaderKind::Protobuf), 256);
    }

    #[test]
    fn test_strict_preset() {
        assert!(CodecOptions::strict().validate_header_constants);
        assert!(!CodecOptions::default().validate_header_constants);
    }
}
