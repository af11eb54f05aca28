//! Protocol-level errors for Steam client message framing
//!
//! Every failure carries enough context to tell *where* in the buffer parsing
//! stopped and *what* was being read. Callers route on the variant: truncation
//! and bad header lengths mean the frame is garbage and should be dropped,
//! never retried as-is.

use thiserror::Error;

/// Framing and decoding errors with diagnostic context
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer ended before a fixed-size field could be read
    #[error("Message too small: need {need} bytes, got {got} (context: {context})")]
    MessageTooSmall {
        need: usize,
        got: usize,
        context: String,
    },

    /// Protobuf header declared a negative length or one past the end of the buffer
    #[error("Invalid protobuf header length {declared} at offset {offset}: only {available} bytes remain (indicates: {diagnosis})")]
    InvalidHeaderLength {
        declared: i32,
        available: usize,
        offset: usize,
        diagnosis: String,
    },

    /// Embedded protobuf bytes could not be decoded
    #[error("Protobuf decode failed for {message}: {reason}")]
    ProtobufDecode {
        message: &'static str,
        reason: String,
    },

    /// Null-terminated string was not valid UTF-8
    #[error("Invalid string at payload offset {offset}: {reason}")]
    InvalidString { offset: usize, reason: String },

    /// Absent or empty buffer handed to a constructor
    #[error("Invalid argument: {context}")]
    InvalidArgument { context: String },

    /// Fixed header sentinel did not match the expected constant
    #[error("Invalid {field}: expected {expected}, got {actual}")]
    InvalidHeaderConstant {
        field: &'static str,
        expected: u32,
        actual: u32,
    },

    /// Frame exceeds the configured size limit
    #[error("Message too large: {size} bytes exceeds maximum {max}")]
    MessageTooLarge { size: usize, max: usize },

    /// Typed envelope built from a packet carrying a different header family
    #[error("Header kind mismatch: expected {expected}, packet carries {actual}")]
    HeaderKindMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Seek outside the payload
    #[error("Seek to {position} is outside payload of {len} bytes")]
    SeekOutOfRange { position: usize, len: usize },
}

impl ProtocolError {
    /// Create MessageTooSmall error with diagnostic context
    pub fn message_too_small(need: usize, got: usize, context: impl Into<String>) -> Self {
        Self::MessageTooSmall {
            need,
            got,
            context: context.into(),
        }
    }

    /// Create InvalidHeaderLength error, diagnosing the likely cause
    pub fn invalid_header_length(declared: i32, available: usize, offset: usize) -> Self {
        let diagnosis = if declared < 0 {
            "negative length, corrupted header"
        } else if declared as usize > available.saturating_mul(2) {
            "likely corrupted length field"
        } else {
            "truncated frame"
        };

        Self::InvalidHeaderLength {
            declared,
            available,
            offset,
            diagnosis: diagnosis.to_string(),
        }
    }

    pub fn protobuf_decode(message: &'static str, err: prost::DecodeError) -> Self {
        Self::ProtobufDecode {
            message,
            reason: err.to_string(),
        }
    }

    pub fn invalid_argument(context: impl Into<String>) -> Self {
        Self::InvalidArgument {
            context: context.into(),
        }
    }

    /// Whether the frame itself is malformed, as opposed to a caller mistake
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MessageTooSmall { .. }
                | Self::InvalidHeaderLength { .. }
                | Self::ProtobufDecode { .. }
                | Self::InvalidString { .. }
                | Self::InvalidHeaderConstant { .. }
        )
    }
}

/// Result type for codec operations
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
