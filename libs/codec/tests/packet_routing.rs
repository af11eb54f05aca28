//! Packet routing tests: header family selection from the leading message type
//! and deterministic failures for frames that cannot be routed.

use bytes::Bytes;
use steam_codec::{
    get_packet_msg, make_msg, AnyPacketMsg, EMsg, ExtendedClientMsgHdr, HeaderKind, MsgHdr,
    MsgHdrProtoBuf, PacketMessage, ProtocolError, Serializable,
};
use steam_types::JobId;

fn serialize(header: &impl Serializable) -> Vec<u8> {
    header.to_bytes().to_vec()
}

#[test]
fn test_crypto_handshake_routes_to_basic_view() {
    for msg in [
        EMsg::CHANNEL_ENCRYPT_REQUEST,
        EMsg::CHANNEL_ENCRYPT_RESPONSE,
        EMsg::CHANNEL_ENCRYPT_RESULT,
    ] {
        let data = serialize(&MsgHdr {
            msg,
            ..Default::default()
        });
        let packet = get_packet_msg(Bytes::from(data)).unwrap();
        assert!(matches!(packet, AnyPacketMsg::Basic(_)), "{msg} routed to {:?}", packet.header_kind());
        assert_eq!(packet.msg_type(), msg);
    }
}

#[test]
fn test_proto_flag_routes_to_protobuf_view() {
    let data = serialize(&MsgHdrProtoBuf {
        msg: EMsg::CLIENT_LOG_ON_RESPONSE,
        ..Default::default()
    });
    assert_eq!(
        u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
        make_msg(EMsg::CLIENT_LOG_ON_RESPONSE, true)
    );

    let packet = get_packet_msg(Bytes::from(data)).unwrap();
    assert!(matches!(packet, AnyPacketMsg::Protobuf(_)));
    assert!(packet.is_proto());
    assert_eq!(packet.msg_type(), EMsg::CLIENT_LOG_ON_RESPONSE);
}

#[test]
fn test_other_messages_route_to_extended_view() {
    let data = serialize(&ExtendedClientMsgHdr {
        msg: EMsg::CLIENT_LOG_ON_RESPONSE,
        ..Default::default()
    });
    let packet = get_packet_msg(Bytes::from(data)).unwrap();
    assert!(matches!(packet, AnyPacketMsg::Extended(_)));
    assert_eq!(packet.header_kind(), HeaderKind::Extended);
}

#[test]
fn test_negative_header_length_fails() {
    let mut data = serialize(&MsgHdrProtoBuf {
        msg: EMsg::CLIENT_LOG_ON_RESPONSE,
        ..Default::default()
    });
    data[4..8].copy_from_slice(&(-1i32).to_le_bytes());

    let err = get_packet_msg(Bytes::from(data)).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::InvalidHeaderLength {
            declared: -1,
            offset: 4,
            ..
        }
    ));
    assert!(err.is_malformed());
}

#[test]
fn test_header_length_beyond_buffer_fails_deterministically() {
    let mut header = MsgHdrProtoBuf {
        msg: EMsg::CLIENT_HEART_BEAT,
        ..Default::default()
    };
    header.proto.client_sessionid = Some(1);
    let mut data = serialize(&header);
    data[4..8].copy_from_slice(&1000i32.to_le_bytes());
    let data = Bytes::from(data);

    let first = get_packet_msg(data.clone()).unwrap_err();
    let second = get_packet_msg(data).unwrap_err();
    assert_eq!(first, second);
    assert!(matches!(
        first,
        ProtocolError::InvalidHeaderLength {
            declared: 1000,
            available: 2,
            ..
        }
    ));
}

#[test]
fn test_tiny_frame_fails() {
    let err = get_packet_msg(Bytes::from_static(&[0, 0, 0])).unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooSmall { need: 4, got: 3, .. }));
}

#[test]
fn test_empty_frame_is_invalid_argument() {
    let err = get_packet_msg(Bytes::new()).unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidArgument { .. }));
    assert!(!err.is_malformed());
}

#[test]
fn test_truncated_extended_header_fails() {
    let data = serialize(&ExtendedClientMsgHdr {
        msg: EMsg::CLIENT_CHAT_MSG,
        ..Default::default()
    });
    let err = get_packet_msg(Bytes::copy_from_slice(&data[..20])).unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooSmall { got: 20, .. }));
}

#[test]
fn test_unknown_message_type_still_routes() {
    let data = serialize(&ExtendedClientMsgHdr {
        msg: EMsg(0x7FFF_FFFF),
        source_job_id: JobId::from_u64(3),
        ..Default::default()
    });
    let packet = get_packet_msg(Bytes::from(data)).unwrap();
    assert_eq!(packet.msg_type(), EMsg(0x7FFF_FFFF));
    assert_eq!(packet.source_job_id(), JobId::from_u64(3));
    assert_eq!(packet.msg_type().name(), None);
}

#[test]
fn test_basic_header_wire_layout() {
    // ChannelEncryptResult, target job 1, source job none, body: EResult OK
    let frame = hex_literal::hex!(
        "19050000"
        "0100000000000000"
        "ffffffffffffffff"
        "01000000"
    );
    let packet = get_packet_msg(Bytes::copy_from_slice(&frame)).unwrap();

    assert!(matches!(packet, AnyPacketMsg::Basic(_)));
    assert_eq!(packet.msg_type(), EMsg::CHANNEL_ENCRYPT_RESULT);
    assert_eq!(packet.target_job_id(), JobId::from_u64(1));
    assert_eq!(packet.source_job_id(), JobId::INVALID);
}
