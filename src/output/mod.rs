pub mod formatters;
pub mod sinks;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One decoded register reply, ready for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub transaction_id: u16,
    pub unit_id: u8,
    pub function: u8,
    /// Replies applied on this session so far, this one included.
    pub apply_count: u32,
    /// Display row the registers start at, within the readiness event.
    pub row_offset: usize,
    pub registers: Vec<u16>,
    pub floats: Vec<f32>,
}

/// A structurally valid frame whose function code has no decode path.
/// Surfaced for display instead of being dropped silently.
#[derive(Debug, Clone, Serialize)]
pub struct UnsupportedFrame {
    pub timestamp: DateTime<Utc>,
    pub transaction_id: u16,
    pub unit_id: u8,
    pub function: u8,
    pub frame_len: usize,
}

pub use formatters::{ConsoleFormatter, CsvFormatter, JsonFormatter, SampleFormatter};
pub use sinks::{FileSink, PresentationSink, StdoutSink};
