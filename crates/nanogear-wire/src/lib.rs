//! Minimal field codec for the protobuf-compatible wire format.
//!
//! Only the two wire types the local services actually use are supported:
//! - `VARINT` (0): unsigned integers in 7-bit little-endian groups
//! - `LENGTH_DELIMITED` (2): a varint length followed by raw bytes
//!
//! There is no schema. Callers address fields by number and decode nested
//! messages by opening a fresh [`WireReader`] over a length-delimited value.

pub mod error;
pub mod reader;
pub mod varint;
pub mod writer;

pub use error::{Result, WireError};
pub use reader::{Field, WireReader, WireValue};
pub use varint::{decode_varint, encode_varint, MAX_VARINT_LEN};
pub use writer::WireWriter;

/// Wire type for varint-encoded scalars.
pub const WIRE_VARINT: u8 = 0;

/// Wire type for length-delimited bytes, strings and nested messages.
pub const WIRE_LENGTH_DELIMITED: u8 = 2;

/// Largest field number the tag encoding allows.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;
