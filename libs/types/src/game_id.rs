//! Packed game identifier
//!
//! | Field    | Offset | Width |
//! |----------|--------|-------|
//! | app id   | 0      | 24    |
//! | app type | 24     | 8     |
//! | mod id   | 32     | 32    |
//!
//! Mod and shortcut ids are CRC32 hashes with the top bit forced on.

use std::fmt;

use crate::bit_vector::BitVector64;
use crate::enums::GameType;

const APP_ID_OFFSET: u16 = 0;
const APP_ID_MASK: u64 = 0xFF_FFFF;
const APP_TYPE_OFFSET: u16 = 24;
const APP_TYPE_MASK: u64 = 0xFF;
const MOD_ID_OFFSET: u16 = 32;
const MOD_ID_MASK: u64 = 0xFFFF_FFFF;

/// High bit set on hashed mod ids
const MOD_ID_HASH_FLAG: u32 = 0x8000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct GameId(u64);

impl GameId {
    #[inline(always)]
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    #[inline(always)]
    pub const fn to_u64(self) -> u64 {
        self.0
    }

    /// Plain Steam application
    pub fn from_app_id(app_id: u32) -> Self {
        let mut id = Self(0);
        id.set_app_id(app_id);
        id
    }

    /// Source-engine style mod of `app_id` living at `mod_path`
    pub fn from_mod(app_id: u32, mod_path: &str) -> Self {
        let mut id = Self(0);
        id.set_app_id(app_id);
        id.set_app_type(GameType::GameMod);
        id.set_mod_id(crc32fast::hash(mod_path.as_bytes()) | MOD_ID_HASH_FLAG);
        id
    }

    /// Non-Steam shortcut identified by executable path and display name
    pub fn from_shortcut(exe_path: &str, app_name: &str) -> Self {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(exe_path.as_bytes());
        hasher.update(app_name.as_bytes());

        let mut id = Self(0);
        id.set_app_type(GameType::Shortcut);
        id.set_mod_id(hasher.finalize() | MOD_ID_HASH_FLAG);
        id
    }

    fn update(&mut self, offset: u16, mask: u64, value: u64) {
        let mut bits = BitVector64::new(self.0);
        bits.set(offset, mask, value);
        self.0 = bits.data();
    }

    pub fn app_id(&self) -> u32 {
        BitVector64::new(self.0).get(APP_ID_OFFSET, APP_ID_MASK) as u32
    }

    pub fn set_app_id(&mut self, app_id: u32) {
        self.update(APP_ID_OFFSET, APP_ID_MASK, app_id as u64);
    }

    pub fn app_type_raw(&self) -> u8 {
        BitVector64::new(self.0).get(APP_TYPE_OFFSET, APP_TYPE_MASK) as u8
    }

    /// `None` when the type byte is outside the known set
    pub fn app_type(&self) -> Option<GameType> {
        GameType::try_from(self.app_type_raw()).ok()
    }

    pub fn set_app_type(&mut self, app_type: GameType) {
        self.update(APP_TYPE_OFFSET, APP_TYPE_MASK, u8::from(app_type) as u64);
    }

    pub fn mod_id(&self) -> u32 {
        BitVector64::new(self.0).get(MOD_ID_OFFSET, MOD_ID_MASK) as u32
    }

    pub fn set_mod_id(&mut self, mod_id: u32) {
        self.update(MOD_ID_OFFSET, MOD_ID_MASK, mod_id as u64);
    }

    pub fn is_mod(&self) -> bool {
        self.app_type() == Some(GameType::GameMod)
    }

    pub fn is_shortcut(&self) -> bool {
        self.app_type() == Some(GameType::Shortcut)
    }

    pub fn is_p2p_file(&self) -> bool {
        self.app_type() == Some(GameType::P2P)
    }

    pub fn is_steam_app(&self) -> bool {
        self.app_type() == Some(GameType::App)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for GameId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for GameId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(GameId::from_u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_id() {
        let id = GameId::from_app_id(440);
        assert_eq!(id.to_u64(), 440);
        assert!(id.is_steam_app());
        assert_eq!(id.mod_id(), 0);
    }

    #[test]
    fn test_mod_id_sets_high_bit() {
        let id = GameId::from_mod(215, "hl2mp_custom");
        assert!(id.is_mod());
        assert_eq!(id.app_id(), 215);
        assert_eq!(
            id.mod_id(),
            crc32fast::hash(b"hl2mp_custom") | MOD_ID_HASH_FLAG
        );
        assert_ne!(id.to_u64() & (1 << 63), 0);
    }

    #[test]
    fn test_shortcut_hashes_concatenation() {
        let id = GameId::from_shortcut("C:\\Games\\thing.exe", "Thing");
        assert!(id.is_shortcut());
        assert_eq!(id.app_id(), 0);
        assert_eq!(
            id.mod_id(),
            crc32fast::hash(b"C:\\Games\\thing.exeThing") | MOD_ID_HASH_FLAG
        );
    }

    #[test]
    fn test_mod_id_setter_round_trips() {
        let mut id = GameId::from_app_id(10);
        id.set_mod_id(0x1234);
        assert_eq!(id.mod_id(), 0x1234);
        assert_eq!(id.app_id(), 10);
    }

    #[test]
    fn test_unknown_app_type() {
        let id = GameId::from_u64(0x0900_0000);
        assert_eq!(id.app_type(), None);
        assert_eq!(id.app_type_raw(), 9);
        assert!(!id.is_steam_app());
    }
}
