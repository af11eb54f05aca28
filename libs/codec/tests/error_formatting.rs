//! Error formatting tests
//!
//! Display output is what ends up in logs, so it must name the field, the
//! offset and the sizes involved.

use steam_codec::error::ProtocolError;

#[test]
fn test_message_too_small_formatting() {
    let error = ProtocolError::message_too_small(36, 20, "ExtendedClientMsgHdr.steam_id");

    let debug_output = format!("{:?}", error);
    assert!(debug_output.contains("MessageTooSmall"));
    assert!(debug_output.contains("ExtendedClientMsgHdr.steam_id"));

    let display_output = format!("{}", error);
    assert!(display_output.contains("Message too small"));
    assert!(display_output.contains("need 36 bytes"));
    assert!(display_output.contains("got 20"));
    assert!(display_output.contains("context: ExtendedClientMsgHdr.steam_id"));
}

#[test]
fn test_invalid_header_length_diagnosis() {
    let negative = ProtocolError::invalid_header_length(-1, 10, 4);
    let display = format!("{}", negative);
    assert!(display.contains("Invalid protobuf header length -1 at offset 4"));
    assert!(display.contains("negative length"));

    let corrupted = ProtocolError::invalid_header_length(100_000, 10, 4);
    assert!(format!("{}", corrupted).contains("likely corrupted length field"));

    let truncated = ProtocolError::invalid_header_length(12, 10, 4);
    assert!(format!("{}", truncated).contains("truncated frame"));
}

#[test]
fn test_header_constant_formatting() {
    let error = ProtocolError::InvalidHeaderConstant {
        field: "header_canary",
        expected: 239,
        actual: 0,
    };
    assert_eq!(format!("{}", error), "Invalid header_canary: expected 239, got 0");
}

#[test]
fn test_header_kind_mismatch_formatting() {
    let error = ProtocolError::HeaderKindMismatch {
        expected: "MsgHdrProtoBuf",
        actual: "MsgHdr",
    };
    assert_eq!(
        format!("{}", error),
        "Header kind mismatch: expected MsgHdrProtoBuf, packet carries MsgHdr"
    );
}

#[test]
fn test_malformed_classification() {
    assert!(ProtocolError::message_too_small(4, 3, "x").is_malformed());
    assert!(ProtocolError::invalid_header_length(-1, 0, 4).is_malformed());
    assert!(!ProtocolError::invalid_argument("empty buffer").is_malformed());
    assert!(!ProtocolError::MessageTooLarge { size: 10, max: 5 }.is_malformed());
}
