//! Per-connection protocol state for both roles.
//!
//! A session owns the stream framer for its connection and turns raw
//! socket reads into presentation events (client) or reply frames
//! (server). Sessions hold no socket; the service layer does the IO.

use chrono::Utc;
use log::{debug, trace, warn};

use crate::output::{PresentationSink, Sample, UnsupportedFrame};
use crate::store::RegisterStore;
use crate::utils::spaced_hex;

use super::builder::build_reply;
use super::frame::{
    decode, parse_multi_block_request, parse_read_request, FC_MULTI_BLOCK_READ, FC_READ_HOLDING,
};
use super::framing::{StreamFramer, CLIENT_MAX_FRAME, SERVER_MAX_FRAME};
use super::registers::{decode_floats, registers_from_be_bytes};

/// Largest register count the server will answer; anything bigger
/// would overflow the one-byte count field in the reply.
const MAX_REPLY_REGISTERS: u16 = 125;

/// Client-side session: reassembles server replies and forwards the
/// decoded samples to a presentation sink.
pub struct ClientSession {
    framer: StreamFramer,
    swap_words: bool,
    apply_count: u32,
}

impl ClientSession {
    pub fn new(swap_words: bool) -> Self {
        Self {
            framer: StreamFramer::new(CLIENT_MAX_FRAME),
            swap_words,
            apply_count: 0,
        }
    }

    /// Replies applied since the session was created.
    pub fn apply_count(&self) -> u32 {
        self.apply_count
    }

    /// Feed one socket read into the session.
    ///
    /// The display row cursor restarts at 0 for every call, so frames
    /// that arrive together in one readiness event stack their rows;
    /// frames from separate reads start over. Sink failures are logged
    /// and do not disturb protocol state.
    pub async fn ingest(&mut self, data: &[u8], sink: &mut dyn PresentationSink) {
        self.framer.push(data);

        let mut row_cursor = 0usize;
        while let Some(frame) = self.framer.next_frame() {
            trace!("Modbus Resp: {}", spaced_hex(frame.as_bytes()));

            let Some(decoded) = decode(&frame) else {
                warn!("discarding undecodable {} byte frame", frame.len());
                continue;
            };

            let registers = match decoded.function {
                FC_READ_HOLDING => {
                    let Some((&byte_count, regs)) = decoded.payload.split_first() else {
                        warn!("read reply without byte count, dropped");
                        continue;
                    };
                    if regs.len() != byte_count as usize || byte_count % 2 != 0 {
                        warn!(
                            "read reply byte count {} does not match {} payload bytes, dropped",
                            byte_count,
                            regs.len()
                        );
                        continue;
                    }
                    registers_from_be_bytes(regs)
                }
                FC_MULTI_BLOCK_READ => {
                    // payload = status byte + size-keyed register data
                    let (&status, regs) = match decoded.payload.split_first() {
                        Some(parts) => parts,
                        None => {
                            warn!("multi-block reply without status byte, dropped");
                            continue;
                        }
                    };
                    debug!("multi-block reply status 0x{:02X}", status);
                    registers_from_be_bytes(regs)
                }
                other => {
                    let event = UnsupportedFrame {
                        timestamp: Utc::now(),
                        transaction_id: decoded.header.transaction_id,
                        unit_id: decoded.header.unit_id,
                        function: other,
                        frame_len: frame.len(),
                    };
                    if let Err(e) = sink.on_unsupported(&event).await {
                        warn!("sink rejected unsupported-frame event: {}", e);
                    }
                    continue;
                }
            };

            self.apply_count += 1;
            let floats = decode_floats(&registers, self.swap_words);
            let sample = Sample {
                timestamp: Utc::now(),
                transaction_id: decoded.header.transaction_id,
                unit_id: decoded.header.unit_id,
                function: decoded.function,
                apply_count: self.apply_count,
                row_offset: row_cursor,
                registers,
                floats,
            };
            row_cursor += sample.registers.len();

            if let Err(e) = sink.on_sample(&sample).await {
                warn!("sink rejected sample: {}", e);
            }
        }
    }
}

/// Server-side session: reassembles client requests and produces the
/// reply frames to write back, in request order.
pub struct ServerSession {
    framer: StreamFramer,
}

impl Default for ServerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerSession {
    pub fn new() -> Self {
        Self {
            framer: StreamFramer::new(SERVER_MAX_FRAME),
        }
    }

    /// Feed one socket read; returns zero or more reply frames.
    ///
    /// Multi-block requests get one flat register reply per block, each
    /// carrying function code 0x03. Malformed or unsupported requests
    /// produce no reply.
    pub fn ingest(&mut self, data: &[u8], store: &dyn RegisterStore) -> Vec<Vec<u8>> {
        self.framer.push(data);

        let mut replies = Vec::new();
        while let Some(frame) = self.framer.next_frame() {
            trace!("Modbus Req : {}", spaced_hex(frame.as_bytes()));

            let Some(decoded) = decode(&frame) else {
                warn!("discarding undecodable {} byte request", frame.len());
                continue;
            };
            let header = decoded.header;
            let payload = frame.request_payload();

            match decoded.function {
                FC_READ_HOLDING => {
                    let Some(range) = parse_read_request(payload) else {
                        warn!("truncated read request, ignored");
                        continue;
                    };
                    if let Some(regs) = self.read_range(store, range.start_addr, range.count) {
                        replies.push(build_reply(
                            header.transaction_id,
                            header.unit_id,
                            FC_READ_HOLDING,
                            &regs,
                        ));
                    }
                }
                FC_MULTI_BLOCK_READ => {
                    let Some(blocks) = parse_multi_block_request(payload) else {
                        warn!("truncated multi-block request, ignored");
                        continue;
                    };
                    for block in blocks {
                        if let Some(regs) = self.read_range(store, block.start_addr, block.count) {
                            replies.push(build_reply(
                                header.transaction_id,
                                header.unit_id,
                                FC_READ_HOLDING,
                                &regs,
                            ));
                        }
                    }
                }
                other => {
                    warn!(
                        "unsupported function 0x{:02X} from unit {}, no reply",
                        other, header.unit_id
                    );
                }
            }
        }
        replies
    }

    fn read_range(&self, store: &dyn RegisterStore, start: u16, count: u16) -> Option<Vec<u16>> {
        if count == 0 || count > MAX_REPLY_REGISTERS {
            warn!("register count {} out of range, request ignored", count);
            return None;
        }
        let regs = (0..count)
            .map(|i| store.get(start.wrapping_add(i)))
            .collect();
        Some(regs)
    }
}
