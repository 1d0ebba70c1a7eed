pub mod builder;
pub mod frame;
pub mod framing;
pub mod registers;
pub mod session;

pub use builder::{build_multi_block_read_request, build_read_request, build_reply};
pub use frame::{
    decode, parse_multi_block_request, parse_read_request, DecodedFrame, Frame, MbapHeader,
    ReadRange, FC_MULTI_BLOCK_READ, FC_READ_HOLDING,
};
pub use framing::{Extract, StreamFramer, CLIENT_MAX_FRAME, SERVER_MAX_FRAME};
pub use registers::{decode_float, decode_floats, registers_from_be_bytes};
pub use session::{ClientSession, ServerSession};
