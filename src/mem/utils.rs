//! Bitwise helpers used by the block header codec.

use core::ops::{Add, BitAnd, Shl, Shr, Sub};

/// Used to access individual bits, or bit ranges, of an unsigned integer.
pub trait BitIndex:
    Copy
    + Sized
    + Add<Output = Self>
    + Shr<Output = Self>
    + Shl<Output = Self>
    + BitAnd<Output = Self>
    + Sub<Output = Self>
{
    /// Multiplicative identity for that number type.
    const IDENT: Self;

    /// Returns the value of the bit placed at the given index.
    #[must_use]
    fn get_bit(&self, index: Self) -> Self {
        (*self & (Self::IDENT << index)) >> index
    }

    /// Returns a bit slice between two given indexes (inclusive), right-aligned.
    #[must_use]
    fn get_bit_slice(&self, first_bit: Self, last_bit: Self) -> Self {
        (*self >> first_bit) & ((Self::IDENT << (Self::IDENT + last_bit - first_bit)) - Self::IDENT)
    }
}

impl BitIndex for usize {
    const IDENT: Self = 1;
}

impl BitIndex for u64 {
    const IDENT: Self = 1;
}

impl BitIndex for u32 {
    const IDENT: Self = 1;
}
