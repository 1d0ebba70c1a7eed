//! Register-to-value conversion.
//!
//! Devices transport 32-bit floats as two consecutive 16-bit holding
//! registers; which register carries the high word is a per-device
//! configuration ("word swap").

/// Reinterpret a register pair as an IEEE-754 single.
///
/// `swap_words = false` puts `hi` in the upper half of the bit
/// pattern; `true` swaps the two registers.
pub fn decode_float(hi: u16, lo: u16, swap_words: bool) -> f32 {
    let bits = if swap_words {
        (u32::from(lo) << 16) | u32::from(hi)
    } else {
        (u32::from(hi) << 16) | u32::from(lo)
    };
    f32::from_bits(bits)
}

/// Decode consecutive register pairs `(2i, 2i+1)` into floats.
/// A trailing unpaired register is dropped silently.
pub fn decode_floats(regs: &[u16], swap_words: bool) -> Vec<f32> {
    regs.chunks_exact(2)
        .map(|pair| decode_float(pair[0], pair[1], swap_words))
        .collect()
}

/// Convert big-endian byte pairs into registers, wire order preserved.
/// An odd trailing byte is dropped.
pub fn registers_from_be_bytes(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}
