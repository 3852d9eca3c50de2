use crate::error::{Result, WireError};
use crate::varint::decode_varint;
use crate::{MAX_FIELD_NUMBER, WIRE_LENGTH_DELIMITED, WIRE_VARINT};

/// A decoded field value, borrowing from the message buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireValue<'a> {
    /// Wire type 0.
    Varint(u64),
    /// Wire type 2: raw bytes, text or a nested message.
    Bytes(&'a [u8]),
    /// Any other wire type. The value's extent is unknown, so the reader
    /// stops after yielding it.
    Unsupported(u8),
}

/// One `(field number, value)` pair of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub number: u32,
    pub value: WireValue<'a>,
}

impl<'a> Field<'a> {
    /// The wire type this field was encoded with.
    pub fn wire_type(&self) -> u8 {
        match self.value {
            WireValue::Varint(_) => WIRE_VARINT,
            WireValue::Bytes(_) => WIRE_LENGTH_DELIMITED,
            WireValue::Unsupported(wire_type) => wire_type,
        }
    }

    pub fn as_varint(&self) -> Option<u64> {
        match self.value {
            WireValue::Varint(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self.value {
            WireValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Open a reader over a length-delimited value as a nested message.
    pub fn as_message(&self) -> Option<WireReader<'a>> {
        self.as_bytes().map(WireReader::new)
    }

    /// Interpret a length-delimited value as UTF-8 text.
    ///
    /// `Ok(None)` if the field is not length-delimited.
    pub fn as_text(&self) -> Result<Option<&'a str>> {
        match self.value {
            WireValue::Bytes(bytes) => std::str::from_utf8(bytes)
                .map(Some)
                .map_err(|_| WireError::InvalidUtf8 { field: self.number }),
            _ => Ok(None),
        }
    }
}

/// Cursor over one message buffer.
///
/// The low-level pair [`read_field`](Self::read_field) /
/// [`read_value`](Self::read_value) reports every condition as-is. Iterating
/// the reader is the tolerant, stream-facing view:
/// - end of buffer ends the message
/// - [`WireError::TruncatedInput`] also ends the message
/// - [`WireError::MalformedMessage`] is yielded once, then iteration stops
/// - an unsupported wire type is yielded as [`WireValue::Unsupported`], then
///   iteration stops
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    halted: bool,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            halted: false,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// True once the buffer is consumed or the reader has stopped.
    pub fn is_exhausted(&self) -> bool {
        self.halted || self.pos >= self.buf.len()
    }

    /// Decode the next tag as `(field number, wire type)`.
    ///
    /// Returns `Ok(None)` at end of message.
    pub fn read_field(&mut self) -> Result<Option<(u32, u8)>> {
        if self.is_exhausted() {
            return Ok(None);
        }

        let tag = self.read_varint()?;
        let number = tag >> 3;
        if number == 0 || number > u64::from(MAX_FIELD_NUMBER) {
            return Err(WireError::MalformedMessage(format!(
                "field number {number} out of range at offset {}",
                self.pos
            )));
        }
        Ok(Some((number as u32, (tag & 0x07) as u8)))
    }

    /// Decode the value that follows a tag of `wire_type`.
    pub fn read_value(&mut self, wire_type: u8) -> Result<WireValue<'a>> {
        match wire_type {
            WIRE_VARINT => self.read_varint().map(WireValue::Varint),
            WIRE_LENGTH_DELIMITED => {
                let declared = self.read_varint()?;
                let remaining = self.remaining();
                let len = usize::try_from(declared)
                    .ok()
                    .filter(|len| *len <= remaining)
                    .ok_or_else(|| {
                        WireError::MalformedMessage(format!(
                            "length {declared} exceeds {remaining} remaining bytes"
                        ))
                    })?;
                let value = &self.buf[self.pos..self.pos + len];
                self.pos += len;
                Ok(WireValue::Bytes(value))
            }
            other => {
                self.halted = true;
                Ok(WireValue::Unsupported(other))
            }
        }
    }

    /// Decode one complete field, or `Ok(None)` at end of message.
    pub fn next_field(&mut self) -> Result<Option<Field<'a>>> {
        let Some((number, wire_type)) = self.read_field()? else {
            return Ok(None);
        };
        let value = self.read_value(wire_type)?;
        Ok(Some(Field { number, value }))
    }

    fn read_varint(&mut self) -> Result<u64> {
        let (value, used) = decode_varint(&self.buf[self.pos..])?;
        self.pos += used;
        Ok(value)
    }
}

impl<'a> Iterator for WireReader<'a> {
    type Item = Result<Field<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        match self.next_field() {
            Ok(Some(field)) => {
                if let WireValue::Unsupported(wire_type) = field.value {
                    tracing::debug!(
                        field = field.number,
                        wire_type,
                        "unsupported wire type; skipping rest of message"
                    );
                }
                Some(Ok(field))
            }
            Ok(None) => None,
            Err(WireError::TruncatedInput) => {
                tracing::debug!(offset = self.pos, "truncated field; treating as end of message");
                self.halted = true;
                None
            }
            Err(err) => {
                self.halted = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_varint_and_bytes_fields() {
        // 1: varint 150, 2: "hi"
        let buf = [0x08, 0x96, 0x01, 0x12, 0x02, b'h', b'i'];
        let mut reader = WireReader::new(&buf);

        assert_eq!(reader.read_field().unwrap(), Some((1, WIRE_VARINT)));
        assert_eq!(reader.read_value(WIRE_VARINT).unwrap(), WireValue::Varint(150));
        assert_eq!(reader.read_field().unwrap(), Some((2, WIRE_LENGTH_DELIMITED)));
        assert_eq!(
            reader.read_value(WIRE_LENGTH_DELIMITED).unwrap(),
            WireValue::Bytes(b"hi")
        );
        assert_eq!(reader.read_field().unwrap(), None);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn empty_message_has_no_fields() {
        let mut reader = WireReader::new(&[]);
        assert_eq!(reader.next_field().unwrap(), None);
        assert!(reader.next().is_none());
    }

    #[test]
    fn nested_messages_decode_recursively() {
        // 2: { 1: { 2: { 1: "p", 7: 65535 } } }
        let buf = [
            0x12, 0x0B, 0x0A, 0x09, 0x12, 0x07, 0x0A, 0x01, b'p', 0x38, 0xFF, 0xFF, 0x03,
        ];
        let outer = WireReader::new(&buf).next().unwrap().unwrap();
        assert_eq!(outer.number, 2);

        let info = outer.as_message().unwrap().next().unwrap().unwrap();
        assert_eq!(info.number, 1);

        let descriptor = info.as_message().unwrap().next().unwrap().unwrap();
        assert_eq!(descriptor.number, 2);

        let fields: Vec<_> = descriptor
            .as_message()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].as_text().unwrap(), Some("p"));
        assert_eq!(fields[1].number, 7);
        assert_eq!(fields[1].as_varint(), Some(65_535));
    }

    #[test]
    fn repeated_field_numbers_are_kept_in_order() {
        let buf = [0x08, 0x01, 0x08, 0x02, 0x08, 0x03];
        let values: Vec<u64> = WireReader::new(&buf)
            .map(|field| field.unwrap().as_varint().unwrap())
            .collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn length_past_end_is_malformed_not_truncated() {
        let buf = [0x12, 0x05, b'a', b'b'];
        let mut reader = WireReader::new(&buf);
        let (number, wire_type) = reader.read_field().unwrap().unwrap();
        assert_eq!(number, 2);
        assert!(matches!(
            reader.read_value(wire_type),
            Err(WireError::MalformedMessage(_))
        ));

        let mut iter = WireReader::new(&buf);
        assert!(matches!(iter.next(), Some(Err(WireError::MalformedMessage(_)))));
        assert!(iter.next().is_none());
    }

    #[test]
    fn truncated_varint_ends_iteration() {
        // 1: varint 1, then a tag whose varint never terminates.
        let buf = [0x08, 0x01, 0x80];
        let mut reader = WireReader::new(&buf);
        assert_eq!(reader.next().unwrap().unwrap().as_varint(), Some(1));
        assert!(reader.next().is_none());

        let mut raw = WireReader::new(&[0x08, 0x80]);
        raw.read_field().unwrap();
        assert_eq!(raw.read_value(WIRE_VARINT), Err(WireError::TruncatedInput));
    }

    #[test]
    fn unsupported_wire_type_is_yielded_then_halts() {
        // 1: fixed64 (wire type 1) followed by bytes that must not be parsed.
        let buf = [0x09, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x10, 0x01];
        let mut reader = WireReader::new(&buf);

        let field = reader.next().unwrap().unwrap();
        assert_eq!(field.number, 1);
        assert_eq!(field.value, WireValue::Unsupported(1));
        assert_eq!(field.wire_type(), 1);
        assert!(field.as_bytes().is_none());
        assert!(reader.next().is_none());
        assert!(reader.is_exhausted());
    }

    #[test]
    fn field_number_zero_is_malformed() {
        let mut reader = WireReader::new(&[0x00, 0x01]);
        assert!(matches!(
            reader.read_field(),
            Err(WireError::MalformedMessage(_))
        ));
    }

    #[test]
    fn invalid_utf8_is_reported_with_field_number() {
        let buf = [0x12, 0x02, 0xC3, 0x28];
        let field = WireReader::new(&buf).next().unwrap().unwrap();
        assert_eq!(field.as_text(), Err(WireError::InvalidUtf8 { field: 2 }));
    }

    #[test]
    fn text_of_varint_field_is_absent() {
        let field = WireReader::new(&[0x08, 0x05]).next().unwrap().unwrap();
        assert_eq!(field.as_text().unwrap(), None);
        assert!(field.as_message().is_none());
    }
}
