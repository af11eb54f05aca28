//! # Steam Identifier Types
//!
//! Bit-packed 64-bit identifiers carried by every Steam client message and API call.
//!
//! ## Design Philosophy
//!
//! - **One Word Per Identifier**: Every type is a transparent `u64` with named sub-fields
//! - **Field Isolation**: Writing one sub-field never disturbs the bits of another
//! - **Validity Is A Query**: Nonsensical combinations are representable; `is_valid` reports them
//! - **Explicit Conversions**: `from_u64`/`to_u64` only, no implicit casts between id kinds
//!
//! ## Quick Start
//!
//! ```rust
//! use steam_types::{EAccountType, EUniverse, SteamId};
//!
//! let id = SteamId::new(8983980, EUniverse::Public, EAccountType::Individual);
//! assert_eq!(id.to_string(), "STEAM_0:0:4491990");
//! assert_eq!(id.render(true), "[U:1:8983980]");
//!
//! let parsed: SteamId = "[U:1:8983980]".parse().unwrap();
//! assert_eq!(parsed, id);
//! ```
//!
//! ```rust
//! use steam_types::JobId;
//!
//! // The default job id is the "no job" sentinel
//! assert_eq!(JobId::default(), JobId::INVALID);
//! assert_eq!(JobId::INVALID.to_u64(), u64::MAX);
//! ```

pub mod bit_vector;
pub mod enums;
pub mod errors;
pub mod game_id;
pub mod global_id;
pub mod steam_id;

pub use bit_vector::BitVector64;
pub use enums::{EAccountType, EUniverse, GameType};
pub use errors::SteamIdError;
pub use game_id::GameId;
pub use global_id::{GlobalId, JobId, UgcHandle, GLOBAL_ID_EPOCH_SECS};
pub use steam_id::{ChatInstanceFlags, SteamId};
