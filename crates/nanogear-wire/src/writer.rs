use bytes::{BufMut, Bytes, BytesMut};

use crate::varint::{encode_varint, encoded_len};
use crate::{WIRE_LENGTH_DELIMITED, WIRE_VARINT};

/// Builds a message by appending fields in order.
///
/// Nested messages are built with a separate writer and appended with
/// [`message`](Self::message). Pre-encoded scalar fields (a tag byte
/// followed by a varint) can be spliced in with [`raw`](Self::raw).
#[derive(Debug, Default, Clone)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag for `field` with `wire_type`.
    pub fn tag(&mut self, field: u32, wire_type: u8) -> &mut Self {
        encode_varint((u64::from(field) << 3) | u64::from(wire_type), &mut self.buf);
        self
    }

    /// Append a varint-typed field.
    pub fn varint(&mut self, field: u32, value: u64) -> &mut Self {
        self.tag(field, WIRE_VARINT);
        encode_varint(value, &mut self.buf);
        self
    }

    /// Append a length-delimited field carrying `value`.
    pub fn length_delimited(&mut self, field: u32, value: &[u8]) -> &mut Self {
        self.tag(field, WIRE_LENGTH_DELIMITED);
        let len = value.len() as u64;
        self.buf.reserve(encoded_len(len) + value.len());
        encode_varint(len, &mut self.buf);
        self.buf.put_slice(value);
        self
    }

    /// Append a length-delimited text field.
    pub fn string(&mut self, field: u32, value: &str) -> &mut Self {
        self.length_delimited(field, value.as_bytes())
    }

    /// Append a nested message as a length-delimited field.
    pub fn message(&mut self, field: u32, nested: &WireWriter) -> &mut Self {
        self.length_delimited(field, nested.as_bytes())
    }

    /// Append already-encoded bytes verbatim.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.put_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}
