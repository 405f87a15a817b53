//! Bitwise helpers for the progress bitfield.
//!
//! Bit `i` of the field records completion of quest `i`. Indices at or above
//! the field width are treated as permanently unset rather than panicking.

/// Returns `flags` with bit `index` forced to `value`, all other bits unchanged.
pub fn set(flags: u64, index: u32, value: bool) -> u64 {
    if index >= u64::BITS {
        return flags;
    }
    if value {
        flags | (1u64 << index)
    } else {
        flags & !(1u64 << index)
    }
}

/// Returns whether bit `index` of `flags` is set.
pub fn get(flags: u64, index: u32) -> bool {
    if index >= u64::BITS {
        return false;
    }
    (flags >> index) & 1 == 1
}
