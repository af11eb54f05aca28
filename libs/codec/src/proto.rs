//! Protobuf sub-message embedded in every protobuf-backed header
//!
//! Defined by hand with `prost` derives; field numbers and defaults match the
//! `CMsgProtoBufHeader` message of the Steam client protocol.

use steam_types::{JobId, SteamId};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CMsgProtoBufHeader {
    #[prost(fixed64, optional, tag = "1")]
    pub steamid: Option<u64>,
    #[prost(int32, optional, tag = "2")]
    pub client_sessionid: Option<i32>,
    #[prost(uint32, optional, tag = "3")]
    pub routing_appid: Option<u32>,
    #[prost(fixed64, optional, tag = "10", default = "18446744073709551615")]
    pub jobid_source: Option<u64>,
    #[prost(fixed64, optional, tag = "11", default = "18446744073709551615")]
    pub jobid_target: Option<u64>,
    #[prost(string, optional, tag = "12")]
    pub target_job_name: Option<String>,
    #[prost(int32, optional, tag = "13", default = "2")]
    pub eresult: Option<i32>,
    #[prost(string, optional, tag = "14")]
    pub error_message: Option<String>,
    #[prost(uint32, optional, tag = "15")]
    pub ip: Option<u32>,
}

impl CMsgProtoBufHeader {
    pub fn steam_id(&self) -> SteamId {
        SteamId::from_u64(self.steamid())
    }

    pub fn set_steam_id(&mut self, steam_id: SteamId) {
        self.steamid = Some(steam_id.to_u64());
    }

    pub fn source_job_id(&self) -> JobId {
        JobId::from_u64(self.jobid_source())
    }

    pub fn set_source_job_id(&mut self, job_id: JobId) {
        self.jobid_source = Some(job_id.to_u64());
    }

    pub fn target_job_id(&self) -> JobId {
        JobId::from_u64(self.jobid_target())
    }

    pub fn set_target_job_id(&mut self, job_id: JobId) {
        self.jobid_target = Some(job_id.to_u64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_defaults() {
        let header = CMsgProtoBufHeader::default();
        assert_eq!(header.jobid_source(), u64::MAX);
        assert_eq!(header.jobid_target(), u64::MAX);
        assert_eq!(header.eresult(), 2);
        assert_eq!(header.steamid(), 0);
        assert_eq!(header.source_job_id(), JobId::INVALID);
    }

    #[test]
    fn test_empty_header_encodes_to_nothing() {
        assert!(CMsgProtoBufHeader::default().encode_to_vec().is_empty());
    }

    #[test]
    fn test_job_id_wire_encoding() {
        let mut header = CMsgProtoBufHeader::default();
        header.set_source_job_id(JobId::from_u64(0x0102030405060708));

        // tag 10, wire type 1 (fixed64)
        let encoded = header.encode_to_vec();
        assert_eq!(encoded[0], (10 << 3) | 1);
        assert_eq!(&encoded[1..], &[8, 7, 6, 5, 4, 3, 2, 1]);
    }
}
