pub mod error;

/// Hex dump with a space between bytes, e.g. "00 13 00 00 00 06".
/// Used for request/response trace logging.
pub fn spaced_hex(bytes: &[u8]) -> String {
    let hex = hex::encode_upper(bytes);
    let mut spaced = String::with_capacity(hex.len() + hex.len() / 2);
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        if i > 0 {
            spaced.push(' ');
        }
        spaced.push_str(std::str::from_utf8(chunk).unwrap_or(""));
    }
    spaced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaced_hex() {
        assert_eq!(spaced_hex(&[0x00, 0x13, 0xAB]), "00 13 AB");
        assert_eq!(spaced_hex(&[]), "");
    }
}
