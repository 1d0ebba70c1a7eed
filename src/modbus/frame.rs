use bytes::Bytes;

/// Read Holding Registers.
pub const FC_READ_HOLDING: u8 = 0x03;
/// Vendor-specific multi-block register read.
pub const FC_MULTI_BLOCK_READ: u8 = 0x65;

/// MBAP header plus function code: 7 header bytes + 1 FC byte.
pub const MIN_DECODABLE_FRAME: usize = 8;

/// FC 0x65 reply data placement, keyed by total frame size. The data
/// offset moves 8 bytes per entry while only 4 bytes of registers are
/// added per step; this matches the device firmware on the wire and is
/// not derivable from the length field. Kept as a literal table.
const EXT_REPLY_TABLE: [(usize, usize); 4] = [(25, 17), (33, 21), (41, 25), (49, 29)];

/// MBAP header: the 7-byte prefix on every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbapHeader {
    pub transaction_id: u16,
    pub protocol_id: u16,
    pub length: u16,
    pub unit_id: u8,
}

impl MbapHeader {
    /// Parse the header from the first 7 bytes of a frame. Returns
    /// `None` when the slice is short or the header violates the
    /// protocol invariants (`protocol_id != 0`, `length < 2`).
    pub fn parse(raw: &[u8]) -> Option<Self> {
        if raw.len() < 7 {
            return None;
        }
        let header = Self {
            transaction_id: u16::from_be_bytes([raw[0], raw[1]]),
            protocol_id: u16::from_be_bytes([raw[2], raw[3]]),
            length: u16::from_be_bytes([raw[4], raw[5]]),
            unit_id: raw[6],
        };
        if header.protocol_id != 0 || header.length < 2 {
            return None;
        }
        Some(header)
    }
}

/// One complete header+PDU unit as extracted by the framer.
///
/// Frames are only constructed on successful extraction and are meant
/// to be decoded immediately, never retained.
#[derive(Debug, Clone)]
pub struct Frame(Bytes);

impl Frame {
    pub(crate) fn new(raw: Bytes) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw PDU payload area (everything after the function code).
    ///
    /// Request payloads are always read from here; the size-keyed
    /// extraction in [`decode`] applies to the FC 0x65 reply shape
    /// only.
    pub fn request_payload(&self) -> &[u8] {
        if self.0.len() < MIN_DECODABLE_FRAME {
            &[]
        } else {
            &self.0[MIN_DECODABLE_FRAME..]
        }
    }
}

/// A decoded frame: validated header, function code and the extracted
/// PDU payload (which may be empty for unsupported function codes).
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub header: MbapHeader,
    pub function: u8,
    pub payload: Bytes,
}

/// Decode a complete frame into header + function code + PDU payload.
///
/// Returns `None` when the frame is structurally invalid (too short,
/// bad protocol id, undersized length field); the caller discards the
/// frame and continues. Unknown function codes still decode, with an
/// empty payload, so they can be surfaced for display.
///
/// FC 0x65 replies do not carry their register data right after the
/// status byte; the data offset depends on the total frame size (see
/// `EXT_REPLY_TABLE`). Any size outside the table yields a status-only
/// PDU.
pub fn decode(frame: &Frame) -> Option<DecodedFrame> {
    let raw = frame.as_bytes();
    if raw.len() < MIN_DECODABLE_FRAME {
        return None;
    }
    let header = MbapHeader::parse(raw)?;
    let function = raw[7];

    let payload = match function {
        FC_READ_HOLDING => Bytes::copy_from_slice(&raw[8..]),
        FC_MULTI_BLOCK_READ => match raw.get(8) {
            Some(&status) => {
                let mut pdu = vec![status];
                if let Some(&(_, offset)) =
                    EXT_REPLY_TABLE.iter().find(|&&(size, _)| size == raw.len())
                {
                    pdu.extend_from_slice(&raw[offset..]);
                }
                Bytes::from(pdu)
            }
            // No status byte at all; nothing to extract.
            None => Bytes::new(),
        },
        _ => Bytes::new(),
    };

    Some(DecodedFrame {
        header,
        function,
        payload,
    })
}

/// One `(start_addr, count)` read range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRange {
    pub start_addr: u16,
    pub count: u16,
}

/// Parse an FC 0x03 request payload: `start_addr:u16, count:u16`.
pub fn parse_read_request(payload: &[u8]) -> Option<ReadRange> {
    if payload.len() < 4 {
        return None;
    }
    Some(ReadRange {
        start_addr: u16::from_be_bytes([payload[0], payload[1]]),
        count: u16::from_be_bytes([payload[2], payload[3]]),
    })
}

/// Parse an FC 0x65 request payload: `block_count:u8` followed by that
/// many `(start_addr, count)` pairs. A payload that declares more
/// blocks than it carries yields only the complete pairs (the builder
/// on the peer side is known to produce such frames when an address
/// fails to parse).
pub fn parse_multi_block_request(payload: &[u8]) -> Option<Vec<ReadRange>> {
    let (&block_count, mut rest) = payload.split_first()?;
    let mut blocks = Vec::with_capacity(block_count as usize);
    for _ in 0..block_count {
        if rest.len() < 4 {
            break;
        }
        blocks.push(ReadRange {
            start_addr: u16::from_be_bytes([rest[0], rest[1]]),
            count: u16::from_be_bytes([rest[2], rest[3]]),
        });
        rest = &rest[4..];
    }
    Some(blocks)
}
