//! # SteamID - Packed Account Identifier
//!
//! ## Purpose
//!
//! A `SteamId` is a single `u64` carrying four sub-fields:
//!
//! | Field      | Offset | Width |
//! |------------|--------|-------|
//! | account id | 0      | 32    |
//! | instance   | 32     | 20    |
//! | type       | 52     | 4     |
//! | universe   | 56     | 8     |
//!
//! Any bit pattern is representable. Whether the combination makes sense is a
//! query ([`SteamId::is_valid`]), never a construction failure.
//!
//! ## Textual Forms
//!
//! - Steam2: `STEAM_<universe>:<authserver>:<accountid>`
//! - Steam3: `[<type>:<universe>:<account>]`, `[<type>:<universe>:<account>:<instance>]`
//!   and the legacy `[<type>:<universe>:<account>(<instance>)]`
//!
//! `Display` renders the Steam2 form; use [`SteamId::render`] with `steam3 = true`
//! for the bracketed form.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

use crate::bit_vector::BitVector64;
use crate::enums::{EAccountType, EUniverse};
use crate::errors::SteamIdError;

const ACCOUNT_ID_OFFSET: u16 = 0;
const ACCOUNT_ID_MASK: u64 = 0xFFFF_FFFF;
const INSTANCE_OFFSET: u16 = 32;
const INSTANCE_MASK: u64 = 0x000F_FFFF;
const ACCOUNT_TYPE_OFFSET: u16 = 52;
const ACCOUNT_TYPE_MASK: u64 = 0xF;
const UNIVERSE_OFFSET: u16 = 56;
const UNIVERSE_MASK: u64 = 0xFF;

static STEAM2_REGEX: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"STEAM_(?P<universe>[0-4]):(?P<authserver>[0-1]):(?P<accountid>\d+)")
        .case_insensitive(true)
        .build()
        .expect("Steam2 pattern is a valid regex")
});

static STEAM3_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\[(?P<type>[AGMPCgcLTIUai]):(?P<universe>[0-4]):(?P<account>\d+)(:(?P<instance>\d+))?\]",
    )
    .expect("Steam3 pattern is a valid regex")
});

static STEAM3_FALLBACK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\[(?P<type>[AGMPCgcLTIUai]):(?P<universe>[0-4]):(?P<account>\d+)(\((?P<instance>\d+)\))?\]",
    )
    .expect("Steam3 fallback pattern is a valid regex")
});

/// Type character for account types missing from the Steam3 table
const UNKNOWN_ACCOUNT_TYPE_CHAR: char = 'i';

/// Instance value flags used by chat SteamIDs
pub struct ChatInstanceFlags;

impl ChatInstanceFlags {
    pub const CLAN: u32 = ((INSTANCE_MASK as u32) + 1) >> 1;
    pub const LOBBY: u32 = ((INSTANCE_MASK as u32) + 1) >> 2;
    pub const MMS_LOBBY: u32 = ((INSTANCE_MASK as u32) + 1) >> 3;
}

/// 64-bit packed Steam account identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct SteamId(u64);

impl SteamId {
    pub const ALL_INSTANCES: u32 = 0;
    pub const DESKTOP_INSTANCE: u32 = 1;
    pub const CONSOLE_INSTANCE: u32 = 2;
    pub const WEB_INSTANCE: u32 = 4;

    /// Build from components; instance is 0 for clans and game servers, desktop otherwise
    pub fn new(account_id: u32, universe: EUniverse, account_type: EAccountType) -> Self {
        let instance = match account_type {
            EAccountType::Clan | EAccountType::GameServer => 0,
            _ => Self::DESKTOP_INSTANCE,
        };
        Self::new_instanced(account_id, instance, universe, account_type)
    }

    /// Build from components with an explicit instance
    pub fn new_instanced(
        account_id: u32,
        instance: u32,
        universe: EUniverse,
        account_type: EAccountType,
    ) -> Self {
        let mut id = Self(0);
        id.set_account_id(account_id);
        id.set_account_universe(universe);
        id.set_account_type(account_type);
        id.set_account_instance(instance);
        id
    }

    /// Raw construction, no validation
    #[inline(always)]
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    #[inline(always)]
    pub const fn to_u64(self) -> u64 {
        self.0
    }

    pub fn set_from_u64(&mut self, value: u64) {
        self.0 = value;
    }

    #[inline]
    fn bits(&self) -> BitVector64 {
        BitVector64::new(self.0)
    }

    #[inline]
    fn update(&mut self, offset: u16, mask: u64, value: u64) {
        let mut bits = self.bits();
        bits.set(offset, mask, value);
        self.0 = bits.data();
    }

    pub fn account_id(&self) -> u32 {
        self.bits().get(ACCOUNT_ID_OFFSET, ACCOUNT_ID_MASK) as u32
    }

    pub fn set_account_id(&mut self, account_id: u32) {
        self.update(ACCOUNT_ID_OFFSET, ACCOUNT_ID_MASK, account_id as u64);
    }

    pub fn account_instance(&self) -> u32 {
        self.bits().get(INSTANCE_OFFSET, INSTANCE_MASK) as u32
    }

    pub fn set_account_instance(&mut self, instance: u32) {
        self.update(INSTANCE_OFFSET, INSTANCE_MASK, instance as u64);
    }

    /// Raw 4-bit account type field
    pub fn account_type_raw(&self) -> u32 {
        self.bits().get(ACCOUNT_TYPE_OFFSET, ACCOUNT_TYPE_MASK) as u32
    }

    /// Account type; values outside the enum read as `Invalid`
    pub fn account_type(&self) -> EAccountType {
        EAccountType::try_from(self.account_type_raw()).unwrap_or(EAccountType::Invalid)
    }

    pub fn set_account_type(&mut self, account_type: EAccountType) {
        self.update(
            ACCOUNT_TYPE_OFFSET,
            ACCOUNT_TYPE_MASK,
            u32::from(account_type) as u64,
        );
    }

    /// Raw 8-bit universe field
    pub fn account_universe_raw(&self) -> u32 {
        self.bits().get(UNIVERSE_OFFSET, UNIVERSE_MASK) as u32
    }

    /// Universe; values outside the enum read as `Invalid`
    pub fn account_universe(&self) -> EUniverse {
        EUniverse::try_from(self.account_universe_raw()).unwrap_or(EUniverse::Invalid)
    }

    pub fn set_account_universe(&mut self, universe: EUniverse) {
        self.update(UNIVERSE_OFFSET, UNIVERSE_MASK, u32::from(universe) as u64);
    }

    /// Parse a Steam2 `STEAM_X:Y:Z` string into an individual account in `universe`.
    ///
    /// Returns `false` when the text does not match or a number overflows. The
    /// current value is left as it was in that case, so callers must not read
    /// a `false` return as "this id is now zero".
    pub fn set_from_string(&mut self, text: &str, universe: EUniverse) -> bool {
        if text.is_empty() {
            return false;
        }
        let Some(caps) = STEAM2_REGEX.captures(text) else {
            return false;
        };
        let (Some(account_id), Some(auth_server)) = (
            parse_group::<u32>(&caps, "accountid"),
            parse_group::<u32>(&caps, "authserver"),
        ) else {
            return false;
        };

        self.set_account_universe(universe);
        self.set_account_instance(Self::DESKTOP_INSTANCE);
        self.set_account_type(EAccountType::Individual);
        self.set_account_id((account_id << 1) | auth_server);
        true
    }

    /// Parse a Steam3 `[T:U:N]`, `[T:U:N:I]` or `[T:U:N(I)]` string.
    ///
    /// Same failure contract as [`SteamId::set_from_string`].
    pub fn set_from_steam3_string(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let Some(caps) = STEAM3_REGEX
            .captures(text)
            .or_else(|| STEAM3_FALLBACK_REGEX.captures(text))
        else {
            return false;
        };

        let (Some(account_id), Some(universe)) = (
            parse_group::<u32>(&caps, "account"),
            parse_group::<u32>(&caps, "universe"),
        ) else {
            return false;
        };
        let Some(type_char) = caps.name("type").and_then(|m| m.as_str().chars().next()) else {
            return false;
        };
        let Ok(universe) = EUniverse::try_from(universe) else {
            return false;
        };

        let mut instance = match caps.name("instance") {
            Some(m) => match m.as_str().parse::<u32>() {
                Ok(instance) => instance,
                Err(_) => return false,
            },
            None => match type_char {
                'g' | 'T' | 'c' | 'L' => 0,
                _ => Self::DESKTOP_INSTANCE,
            },
        };

        let account_type = match type_char {
            'c' => {
                instance |= ChatInstanceFlags::CLAN;
                EAccountType::Chat
            }
            'L' => {
                instance |= ChatInstanceFlags::LOBBY;
                EAccountType::Chat
            }
            UNKNOWN_ACCOUNT_TYPE_CHAR => EAccountType::Invalid,
            other => match account_type_from_char(other) {
                Some(account_type) => account_type,
                None => return false,
            },
        };

        self.set_account_type(account_type);
        self.set_account_universe(universe);
        self.set_account_instance(instance);
        self.set_account_id(account_id);
        true
    }

    /// Whether the field combination describes a real account
    pub fn is_valid(&self) -> bool {
        let account_type = self.account_type_raw();
        if account_type <= EAccountType::Invalid as u32 || account_type > EAccountType::MAX {
            return false;
        }
        let universe = self.account_universe_raw();
        if universe <= EUniverse::Invalid as u32 || universe > EUniverse::MAX {
            return false;
        }

        match self.account_type() {
            EAccountType::Individual => {
                self.account_id() != 0 && self.account_instance() <= Self::WEB_INSTANCE
            }
            EAccountType::Clan => self.account_id() != 0 && self.account_instance() == 0,
            EAccountType::GameServer => self.account_id() != 0,
            _ => true,
        }
    }

    /// Key shared by every instance of the same account
    pub fn static_account_key(&self) -> u64 {
        ((self.account_universe_raw() as u64) << 56)
            + ((self.account_type_raw() as u64) << 52)
            + self.account_id() as u64
    }

    pub fn is_blank_anon_account(&self) -> bool {
        self.account_id() == 0 && self.is_anon_account() && self.account_instance() == 0
    }

    pub fn is_game_server_account(&self) -> bool {
        matches!(
            self.account_type(),
            EAccountType::GameServer | EAccountType::AnonGameServer
        )
    }

    pub fn is_persistent_game_server_account(&self) -> bool {
        self.account_type() == EAccountType::GameServer
    }

    pub fn is_anon_game_server_account(&self) -> bool {
        self.account_type() == EAccountType::AnonGameServer
    }

    pub fn is_content_server_account(&self) -> bool {
        self.account_type() == EAccountType::ContentServer
    }

    pub fn is_clan_account(&self) -> bool {
        self.account_type() == EAccountType::Clan
    }

    pub fn is_chat_account(&self) -> bool {
        self.account_type() == EAccountType::Chat
    }

    pub fn is_lobby(&self) -> bool {
        self.is_chat_account() && self.account_instance() & ChatInstanceFlags::LOBBY != 0
    }

    pub fn is_individual_account(&self) -> bool {
        matches!(
            self.account_type(),
            EAccountType::Individual | EAccountType::ConsoleUser
        )
    }

    pub fn is_anon_account(&self) -> bool {
        matches!(
            self.account_type(),
            EAccountType::AnonUser | EAccountType::AnonGameServer
        )
    }

    pub fn is_anon_user_account(&self) -> bool {
        self.account_type() == EAccountType::AnonUser
    }

    pub fn is_console_user_account(&self) -> bool {
        self.account_type() == EAccountType::ConsoleUser
    }

    /// Chat room id for a clan's group chat
    pub fn to_chat_id(&self) -> Result<SteamId, SteamIdError> {
        if !self.is_clan_account() {
            return Err(SteamIdError::WrongAccountType {
                steam_id: self.0,
                expected: "Clan",
                actual: self.account_type_raw(),
            });
        }
        let mut chat = *self;
        chat.set_account_instance(ChatInstanceFlags::CLAN);
        chat.set_account_type(EAccountType::Chat);
        Ok(chat)
    }

    /// Clan id behind a clan chat room, if this is one
    pub fn try_get_clan_id(&self) -> Option<SteamId> {
        if self.is_chat_account() && self.account_instance() == ChatInstanceFlags::CLAN {
            let mut clan = *self;
            clan.set_account_type(EAccountType::Clan);
            clan.set_account_instance(0);
            Some(clan)
        } else {
            None
        }
    }

    /// Render as Steam3 (`steam3 = true`) or Steam2
    pub fn render(&self, steam3: bool) -> String {
        if steam3 {
            self.render_steam3()
        } else {
            self.render_steam2()
        }
    }

    fn render_steam2(&self) -> String {
        match EAccountType::try_from(self.account_type_raw()) {
            Ok(EAccountType::Invalid) | Ok(EAccountType::Individual) => {
                let universe = self.account_universe_raw();
                let universe_digit = if universe <= EUniverse::Public as u32 {
                    0
                } else {
                    universe
                };
                format!(
                    "STEAM_{}:{}:{}",
                    universe_digit,
                    self.account_id() & 1,
                    self.account_id() >> 1
                )
            }
            _ => self.0.to_string(),
        }
    }

    fn render_steam3(&self) -> String {
        let account_type = EAccountType::try_from(self.account_type_raw()).ok();
        let mut type_char = account_type
            .and_then(account_type_char)
            .unwrap_or(UNKNOWN_ACCOUNT_TYPE_CHAR);

        let instance = self.account_instance();
        if account_type == Some(EAccountType::Chat) {
            if instance & ChatInstanceFlags::CLAN != 0 {
                type_char = 'c';
            } else if instance & ChatInstanceFlags::LOBBY != 0 {
                type_char = 'L';
            }
        }

        let render_instance = match account_type {
            Some(EAccountType::AnonGameServer) | Some(EAccountType::Multiseat) => true,
            Some(EAccountType::Individual) => instance != Self::DESKTOP_INSTANCE,
            _ => false,
        };

        if render_instance {
            format!(
                "[{}:{}:{}:{}]",
                type_char,
                self.account_universe_raw(),
                self.account_id(),
                instance
            )
        } else {
            format!(
                "[{}:{}:{}]",
                type_char,
                self.account_universe_raw(),
                self.account_id()
            )
        }
    }
}

fn parse_group<T: FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

fn account_type_char(account_type: EAccountType) -> Option<char> {
    match account_type {
        EAccountType::AnonGameServer => Some('A'),
        EAccountType::GameServer => Some('G'),
        EAccountType::Multiseat => Some('M'),
        EAccountType::Pending => Some('P'),
        EAccountType::ContentServer => Some('C'),
        EAccountType::Clan => Some('g'),
        // Lobby chat is 'L', clan chat is 'c'
        EAccountType::Chat => Some('T'),
        EAccountType::Invalid => Some('I'),
        EAccountType::Individual => Some('U'),
        EAccountType::AnonUser => Some('a'),
        EAccountType::ConsoleUser => None,
    }
}

fn account_type_from_char(c: char) -> Option<EAccountType> {
    match c {
        'A' => Some(EAccountType::AnonGameServer),
        'G' => Some(EAccountType::GameServer),
        'M' => Some(EAccountType::Multiseat),
        'P' => Some(EAccountType::Pending),
        'C' => Some(EAccountType::ContentServer),
        'g' => Some(EAccountType::Clan),
        'T' => Some(EAccountType::Chat),
        'I' => Some(EAccountType::Invalid),
        'U' => Some(EAccountType::Individual),
        'a' => Some(EAccountType::AnonUser),
        _ => None,
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_steam2())
    }
}

impl fmt::Debug for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SteamId({}, {})", self.render_steam3(), self.0)
    }
}

/// Accepts Steam3 text first, then Steam2 text in the public universe
impl FromStr for SteamId {
    type Err = SteamIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut id = SteamId::default();
        if id.set_from_steam3_string(s) || id.set_from_string(s, EUniverse::Public) {
            Ok(id)
        } else {
            Err(SteamIdError::UnrecognisedFormat {
                input: s.to_string(),
            })
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SteamId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SteamId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(SteamId::from_u64)
    }
}
