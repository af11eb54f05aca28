//! # Global Identifiers
//!
//! ## Purpose
//!
//! `GlobalId` is the 64-bit globally unique identifier issued by Steam back-end
//! processes. [`JobId`] and [`UgcHandle`] share the exact same layout but are
//! distinct types so they cannot be swapped at a call site by accident.
//!
//! | Field            | Offset | Width |
//! |------------------|--------|-------|
//! | sequential count | 0      | 20    |
//! | start time       | 20     | 30    |
//! | process id       | 50     | 4     |
//! | box id           | 54     | 10    |
//!
//! Start time is stored as seconds since 2005-01-01T00:00:00Z.
//!
//! All three types default to `u64::MAX`, which doubles as the "no job" sentinel
//! on the wire.

use chrono::{DateTime, Utc};

use crate::bit_vector::BitVector64;

/// 2005-01-01T00:00:00Z as a unix timestamp
pub const GLOBAL_ID_EPOCH_SECS: i64 = 1_104_537_600;

const SEQUENTIAL_COUNT_OFFSET: u16 = 0;
const SEQUENTIAL_COUNT_MASK: u64 = 0xFFFFF;
const START_TIME_OFFSET: u16 = 20;
const START_TIME_MASK: u64 = 0x3FFF_FFFF;
const PROCESS_ID_OFFSET: u16 = 50;
const PROCESS_ID_MASK: u64 = 0xF;
const BOX_ID_OFFSET: u16 = 54;
const BOX_ID_MASK: u64 = 0x3FF;

/// Generate a GlobalID-layout identifier type
///
/// Every generated type is a transparent `u64` with the packed accessors above,
/// an `INVALID` constant equal to its default, explicit `from_u64`/`to_u64`
/// conversions, and serde support that serializes as the raw `u64`.
macro_rules! define_global_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(u64);

        impl $name {
            /// All bits set; the default value
            pub const INVALID: Self = Self(u64::MAX);

            #[inline(always)]
            pub const fn from_u64(value: u64) -> Self {
                Self(value)
            }

            #[inline(always)]
            pub const fn to_u64(self) -> u64 {
                self.0
            }

            #[inline(always)]
            pub const fn is_valid(&self) -> bool {
                self.0 != u64::MAX
            }

            #[inline]
            fn field(&self, offset: u16, mask: u64) -> u64 {
                BitVector64::new(self.0).get(offset, mask)
            }

            #[inline]
            fn set_field(&mut self, offset: u16, mask: u64, value: u64) {
                let mut bits = BitVector64::new(self.0);
                bits.set(offset, mask, value);
                self.0 = bits.data();
            }

            pub fn sequential_count(&self) -> u32 {
                self.field(SEQUENTIAL_COUNT_OFFSET, SEQUENTIAL_COUNT_MASK) as u32
            }

            pub fn set_sequential_count(&mut self, count: u32) {
                self.set_field(SEQUENTIAL_COUNT_OFFSET, SEQUENTIAL_COUNT_MASK, count as u64);
            }

            /// Raw start time, seconds since 2005-01-01
            pub fn start_time_seconds(&self) -> u32 {
                self.field(START_TIME_OFFSET, START_TIME_MASK) as u32
            }

            pub fn set_start_time_seconds(&mut self, seconds: u32) {
                self.set_field(START_TIME_OFFSET, START_TIME_MASK, seconds as u64);
            }

            pub fn start_time(&self) -> DateTime<Utc> {
                seconds_to_instant(self.start_time_seconds())
            }

            /// Store `instant` as an epoch offset, clamped to the 30-bit field
            pub fn set_start_time(&mut self, instant: DateTime<Utc>) {
                self.set_start_time_seconds(instant_to_seconds(instant));
            }

            pub fn process_id(&self) -> u32 {
                self.field(PROCESS_ID_OFFSET, PROCESS_ID_MASK) as u32
            }

            pub fn set_process_id(&mut self, process_id: u32) {
                self.set_field(PROCESS_ID_OFFSET, PROCESS_ID_MASK, process_id as u64);
            }

            pub fn box_id(&self) -> u32 {
                self.field(BOX_ID_OFFSET, BOX_ID_MASK) as u32
            }

            pub fn set_box_id(&mut self, box_id: u32) {
                self.set_field(BOX_ID_OFFSET, BOX_ID_MASK, box_id as u64);
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u64(self.0)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                <u64 as serde::Deserialize>::deserialize(deserializer).map(Self::from_u64)
            }
        }
    };
}

fn seconds_to_instant(seconds: u32) -> DateTime<Utc> {
    DateTime::from_timestamp(GLOBAL_ID_EPOCH_SECS + seconds as i64, 0).unwrap_or_default()
}

fn instant_to_seconds(instant: DateTime<Utc>) -> u32 {
    (instant.timestamp() - GLOBAL_ID_EPOCH_SECS).clamp(0, START_TIME_MASK as i64) as u32
}

define_global_id! {
    /// Globally unique identifier issued by a back-end process
    GlobalId
}

define_global_id! {
    /// Correlates a request with its asynchronous response(s)
    JobId
}

define_global_id! {
    /// Handle to user-generated content
    UgcHandle
}

impl JobId {
    /// Build a job id from its components
    pub fn from_parts(
        sequential_count: u32,
        start_time: DateTime<Utc>,
        process_id: u32,
        box_id: u32,
    ) -> Self {
        let mut id = Self::from_u64(0);
        id.set_sequential_count(sequential_count);
        id.set_start_time(start_time);
        id.set_process_id(process_id);
        id.set_box_id(box_id);
        id
    }
}
