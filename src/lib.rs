//! Field Bus Register Monitor
//!
//! TCP client/server pair for a Modbus-flavored register protocol:
//! the client periodically polls holding registers (including a
//! vendor-specific multi-block read) and presents them as floats, the
//! server answers reads out of an in-memory register table.

pub mod cli;
pub mod config;
pub mod modbus;
pub mod output;
pub mod services;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::{ClientConfig, Config, ServerConfig};
pub use modbus::{ClientSession, ServerSession, StreamFramer};
pub use output::{ConsoleFormatter, CsvFormatter, JsonFormatter, PresentationSink, SampleFormatter};
pub use services::{PollService, SlaveService};
pub use store::{MemoryRegisterTable, RegisterStore};
pub use utils::error::MonitorError;

pub const VERSION: &str = "0.1.0";
