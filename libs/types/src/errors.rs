//! Identifier error types

use thiserror::Error;

/// Errors produced when converting or parsing SteamIDs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SteamIdError {
    /// Input matched neither the Steam2 nor the Steam3 textual form
    #[error("Unrecognised SteamID text: {input:?}")]
    UnrecognisedFormat { input: String },

    /// Operation requires a particular account type
    #[error("SteamID {steam_id} has account type {actual}, expected {expected}")]
    WrongAccountType {
        steam_id: u64,
        expected: &'static str,
        actual: u32,
    },
}
