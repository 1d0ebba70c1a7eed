//! Outgoing frame construction for both roles.

use log::warn;

use super::frame::{FC_MULTI_BLOCK_READ, FC_READ_HOLDING};

/// Build an FC 0x03 read request: header length is always 6
/// (unit id + function code + start address + count).
pub fn build_read_request(transaction_id: u16, unit_id: u8, start_addr: u16, count: u16) -> Vec<u8> {
    let mut frame = Vec::with_capacity(12);
    frame.extend_from_slice(&transaction_id.to_be_bytes());
    frame.extend_from_slice(&0u16.to_be_bytes());
    frame.extend_from_slice(&6u16.to_be_bytes());
    frame.push(unit_id);
    frame.push(FC_READ_HOLDING);
    frame.extend_from_slice(&start_addr.to_be_bytes());
    frame.extend_from_slice(&count.to_be_bytes());
    frame
}

/// Build an FC 0x65 multi-block read request from 1-based display
/// addresses.
///
/// The wire address is `address - 1`, clamped at 0. Addresses that do
/// not parse as unsigned decimal are skipped from the payload, but the
/// block count and the length field still reflect the original list
/// length — the device side tolerates this, so the mismatch is kept
/// on the wire and flagged here instead of being silently reconciled.
pub fn build_multi_block_read_request(
    transaction_id: u16,
    unit_id: u8,
    addresses: &[String],
    count: u16,
) -> Vec<u8> {
    let block_count = addresses.len() as u8;
    let pdu_length: u16 = 1 + 1 + 1 + (u16::from(block_count) * 4);

    let mut frame = Vec::with_capacity(6 + pdu_length as usize);
    frame.extend_from_slice(&transaction_id.to_be_bytes());
    frame.extend_from_slice(&0u16.to_be_bytes());
    frame.extend_from_slice(&pdu_length.to_be_bytes());
    frame.push(unit_id);
    frame.push(FC_MULTI_BLOCK_READ);
    frame.push(block_count);

    for address in addresses {
        let Ok(display_addr) = address.trim().parse::<u16>() else {
            warn!(
                "skipping unparsable address '{}'; block count stays {}",
                address, block_count
            );
            continue;
        };
        let start_addr = display_addr.saturating_sub(1);
        frame.extend_from_slice(&start_addr.to_be_bytes());
        frame.extend_from_slice(&count.to_be_bytes());
    }

    frame
}

/// Build a register reply: `byte_count:u8` followed by the registers,
/// big-endian. The server uses the same flat shape for FC 0x03 and
/// FC 0x65 answers; it never mirrors the client's block-table layout.
pub fn build_reply(transaction_id: u16, unit_id: u8, function: u8, regs: &[u16]) -> Vec<u8> {
    let byte_count = (regs.len() * 2) as u8;
    let length: u16 = 1 + 1 + 1 + u16::from(byte_count);

    let mut frame = Vec::with_capacity(6 + length as usize);
    frame.extend_from_slice(&transaction_id.to_be_bytes());
    frame.extend_from_slice(&0u16.to_be_bytes());
    frame.extend_from_slice(&length.to_be_bytes());
    frame.push(unit_id);
    frame.push(function);
    frame.push(byte_count);
    for reg in regs {
        frame.extend_from_slice(&reg.to_be_bytes());
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modbus::frame::MbapHeader;

    #[test]
    fn test_build_read_request_bytes() {
        let frame = build_read_request(0x0013, 1, 5, 2);
        assert_eq!(
            frame,
            vec![0x00, 0x13, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x05, 0x00, 0x02]
        );
    }

    #[test]
    fn test_read_request_header_round_trip() {
        let frame = build_read_request(0xBEEF, 17, 1000, 4);
        let header = MbapHeader::parse(&frame).expect("parses back");
        assert_eq!(header.transaction_id, 0xBEEF);
        assert_eq!(header.protocol_id, 0);
        assert_eq!(header.length, 6);
        assert_eq!(header.unit_id, 17);
    }

    #[test]
    fn test_build_multi_block_request_layout() {
        let addrs = vec!["11107".to_string(), "11201".to_string()];
        let frame = build_multi_block_read_request(0x0013, 1, &addrs, 2);

        let header = MbapHeader::parse(&frame).expect("parses");
        assert_eq!(header.length, 3 + 4 * 2);
        assert_eq!(frame[7], 0x65);
        assert_eq!(frame[8], 2); // block count
        // 1-based display address 11107 -> wire 11106
        assert_eq!(u16::from_be_bytes([frame[9], frame[10]]), 11106);
        assert_eq!(u16::from_be_bytes([frame[11], frame[12]]), 2);
        assert_eq!(u16::from_be_bytes([frame[13], frame[14]]), 11200);
        assert_eq!(frame.len(), 6 + header.length as usize);
    }

    #[test]
    fn test_multi_block_request_zero_address_clamps() {
        let addrs = vec!["0".to_string()];
        let frame = build_multi_block_read_request(1, 1, &addrs, 2);
        assert_eq!(u16::from_be_bytes([frame[9], frame[10]]), 0);
    }

    #[test]
    fn test_multi_block_request_keeps_block_count_on_parse_failure() {
        // The bad address is dropped from the payload, but the block
        // count and the length field still claim three blocks.
        let addrs = vec!["10".to_string(), "junk".to_string(), "20".to_string()];
        let frame = build_multi_block_read_request(1, 1, &addrs, 2);

        assert_eq!(frame[8], 3);
        let header = MbapHeader::parse(&frame).expect("parses");
        assert_eq!(header.length, 3 + 4 * 3);
        // only two pairs actually present
        assert_eq!(frame.len(), 9 + 2 * 4);
    }

    #[test]
    fn test_build_reply_bytes() {
        let frame = build_reply(0x0013, 1, 0x03, &[1, 2]);
        assert_eq!(
            frame,
            vec![0x00, 0x13, 0x00, 0x00, 0x00, 0x07, 0x01, 0x03, 0x04, 0x00, 0x01, 0x00, 0x02]
        );
    }

    #[test]
    fn test_build_reply_empty_registers() {
        let frame = build_reply(7, 2, 0x03, &[]);
        let header = MbapHeader::parse(&frame).expect("parses");
        assert_eq!(header.length, 3);
        assert_eq!(frame[8], 0); // byte count
        assert_eq!(frame.len(), 9);
    }
}
