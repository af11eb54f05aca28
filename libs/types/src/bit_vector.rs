//! Bit-field access over a single 64-bit word.
//!
//! Every packed identifier in this crate is a `u64` with named sub-fields.
//! `BitVector64` is the primitive they all share: it knows nothing about the
//! fields themselves, only how to mask and shift them in and out.
//!
//! No bounds checking is done on `offset + width`. Identifier types are
//! responsible for declaring non-overlapping fields.

/// A 64-bit word with offset/mask sub-field accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct BitVector64(u64);

impl BitVector64 {
    #[inline(always)]
    pub const fn new(data: u64) -> Self {
        Self(data)
    }

    /// Backing word
    #[inline(always)]
    pub const fn data(&self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub fn set_data(&mut self, data: u64) {
        self.0 = data;
    }

    /// Read `(data >> offset) & mask`
    #[inline(always)]
    pub const fn get(&self, offset: u16, mask: u64) -> u64 {
        (self.0 >> offset) & mask
    }

    /// Replace the bits selected by `mask << offset` with `value & mask`
    #[inline(always)]
    pub fn set(&mut self, offset: u16, mask: u64, value: u64) {
        self.0 = (self.0 & !(mask << offset)) | ((value & mask) << offset);
    }
}

impl From<u64> for BitVector64 {
    fn from(data: u64) -> Self {
        Self(data)
    }
}

impl From<BitVector64> for u64 {
    fn from(bits: BitVector64) -> Self {
        bits.0
    }
}
