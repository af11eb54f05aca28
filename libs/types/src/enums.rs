//! Steam network enumerations stored inside packed identifiers
//!
//! Values are part of the wire contract. Conversion from the raw packed bits
//! goes through `num_enum::TryFromPrimitive`, so unknown values surface as
//! errors rather than being silently coerced.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Partition of the Steam network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum EUniverse {
    #[default]
    Invalid = 0,
    Public = 1,
    Beta = 2,
    Internal = 3,
    Dev = 4,
}

impl EUniverse {
    /// Highest defined universe value
    pub const MAX: u32 = EUniverse::Dev as u32;
}

/// Kind of account a SteamID refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum EAccountType {
    #[default]
    Invalid = 0,
    Individual = 1,
    Multiseat = 2,
    GameServer = 3,
    AnonGameServer = 4,
    Pending = 5,
    ContentServer = 6,
    Clan = 7,
    Chat = 8,
    ConsoleUser = 9,
    AnonUser = 10,
}

impl EAccountType {
    /// Highest defined account type value
    pub const MAX: u32 = EAccountType::AnonUser as u32;
}

/// Flavour of game a GameID refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum GameType {
    #[default]
    App = 0,
    GameMod = 1,
    Shortcut = 2,
    P2P = 3,
}
