//! gRPC-Web style message framing.
//!
//! Every message on the wire is framed with:
//! - A 1-byte flag (0 = data, high bit set = trailers)
//! - A 4-byte big-endian payload length
//!
//! Response bodies arrive in arbitrary chunks; [`FrameAssembler`] buffers
//! them and hands out complete payloads only.

pub mod assembler;
pub mod codec;
pub mod error;

pub use assembler::FrameAssembler;
pub use codec::{
    decode_frame, encode_frame, wrap, Frame, FrameConfig, DATA_FLAG, DEFAULT_MAX_PAYLOAD,
    HEADER_SIZE, TRAILER_FLAG,
};
pub use error::{FrameError, Result};
