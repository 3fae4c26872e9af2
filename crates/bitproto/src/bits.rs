//! Numeric helpers shared by the bit driver and by generated accessors.
//!
//! Bits are addressed LSB-first: stream bit `i` lives in byte `i / 8` at bit
//! position `i % 8`, where position 0 is the least significant bit. A field
//! value is handled as its unsigned bit pattern of the declared width; signed
//! values use two's complement.

/// Mask covering the low `bits` bits (`bits` in `0..=64`).
pub fn mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: u32) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

/// Two's-complement bit pattern of `value` truncated to `bits`.
pub fn to_pattern(value: i64, bits: u32) -> u64 {
    value as u64 & mask(bits)
}

/// Returns `(pattern >> rshift) & 0xFF`. A negative `rshift` shifts left,
/// which happens when the field starts inside the requested byte.
pub fn byte_at(pattern: u64, rshift: i32) -> u8 {
    if rshift >= 64 || rshift <= -8 {
        return 0;
    }

    if rshift >= 0 {
        (pattern >> rshift) as u8
    } else {
        (pattern << -rshift) as u8
    }
}

/// ORs `b << lshift` into an unsigned pattern.
pub fn or_unsigned(pattern: u64, lshift: u32, b: u8) -> u64 {
    if lshift >= 64 {
        return pattern;
    }

    pattern | ((b as u64) << lshift)
}

/// ORs `b << lshift` into the `bits`-wide pattern of a signed value and
/// sign-extends the result.
///
/// Repeating the sign extension after every contribution is harmless: the
/// high bit of the field always arrives with the last contribution that
/// touches it, and OR-ing lower bits into an extended value keeps it extended.
pub fn or_signed(value: i64, bits: u32, lshift: u32, b: u8) -> i64 {
    sign_extend(or_unsigned(to_pattern(value, bits), lshift, b), bits)
}

/// Byte mask selecting `count` bits starting at bit position `start`.
pub fn byte_mask(start: u32, count: u32) -> u8 {
    ((((1u16 << count) - 1) << start) & 0xFF) as u8
}

/// Number of bytes needed to hold `bits` bits.
pub fn nbytes(bits: u64) -> usize {
    bits.div_ceil(8) as usize
}

/// Whether `value` is representable as an unsigned integer of `bits` bits.
pub fn fits_unsigned(value: u64, bits: u32) -> bool {
    value & !mask(bits) == 0
}

/// Whether `value` is representable as a signed integer of `bits` bits.
pub fn fits_signed(value: i64, bits: u32) -> bool {
    sign_extend(to_pattern(value, bits), bits) == value
}
