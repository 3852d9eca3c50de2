use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: flag (1) + length (4) = 5 bytes.
pub const HEADER_SIZE: usize = 5;

/// Flag of an ordinary message frame.
pub const DATA_FLAG: u8 = 0x00;

/// Flag bit marking a gRPC-Web trailers frame.
pub const TRAILER_FLAG: u8 = 0x80;

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Transport flag byte, passed through uninterpreted.
    pub flag: u8,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a data frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            flag: DATA_FLAG,
            payload: payload.into(),
        }
    }

    /// True if the flag marks a trailers frame rather than a message.
    pub fn is_trailer(&self) -> bool {
        self.flag & TRAILER_FLAG != 0
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────┬──────────────┬─────────────────┐
/// │ Flag (1B) │ Length       │ Payload         │
/// │ 0x00      │ (4B BE)      │ (Length bytes)  │
/// └───────────┴──────────────┴─────────────────┘
/// ```
pub fn encode_frame(flag: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u8(flag);
    dst.put_u32(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Wrap a message payload in a data frame, ready to be sent as a request body.
pub fn wrap(payload: &[u8]) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    encode_frame(DATA_FLAG, payload, &mut buf)?;
    Ok(buf.freeze())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer and leaves any
/// following bytes in place.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let flag = src[0];
    let payload_len = u32::from_be_bytes([src[1], src[2], src[3], src[4]]) as usize;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame { flag, payload }))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 16 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_layout() {
        let framed = wrap(b"hi").unwrap();
        assert_eq!(framed.as_ref(), &[0x00, 0x00, 0x00, 0x00, 0x02, b'h', b'i']);
    }

    #[test]
    fn test_wrap_empty_payload() {
        let framed = wrap(b"").unwrap();
        assert_eq!(framed.as_ref(), &[0x00, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_length_is_big_endian() {
        let payload = vec![0u8; 0x0102];
        let framed = wrap(&payload).unwrap();
        assert_eq!(&framed[..HEADER_SIZE], &[0x00, 0x00, 0x00, 0x01, 0x02]);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        let payload = b"hello, nanogear!";

        encode_frame(DATA_FLAG, payload, &mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE + payload.len());

        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();

        assert_eq!(frame.flag, DATA_FLAG);
        assert_eq!(frame.payload.as_ref(), payload);
        assert!(!frame.is_trailer());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_incomplete_header() {
        let mut buf = BytesMut::from(&[0x00, 0x00, 0x00][..]);
        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap();
        assert!(result.is_none());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_decode_incomplete_payload() {
        let mut buf = BytesMut::new();
        encode_frame(DATA_FLAG, b"hello", &mut buf).unwrap();
        buf.truncate(HEADER_SIZE + 2);

        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD).unwrap();
        assert!(result.is_none());
        assert_eq!(buf.len(), HEADER_SIZE + 2);
    }

    #[test]
    fn test_decode_payload_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u8(DATA_FLAG);
        buf.put_u32(32 * 1024 * 1024);

        let result = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD);
        assert!(matches!(result, Err(FrameError::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_trailer_flag_is_preserved() {
        let mut buf = BytesMut::new();
        encode_frame(TRAILER_FLAG, b"grpc-status:0\r\n", &mut buf).unwrap();

        let frame = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(frame.flag, TRAILER_FLAG);
        assert!(frame.is_trailer());
    }

    #[test]
    fn test_multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(DATA_FLAG, b"first", &mut buf).unwrap();
        encode_frame(DATA_FLAG, b"second", &mut buf).unwrap();

        let f1 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(f1.payload.as_ref(), b"first");

        let f2 = decode_frame(&mut buf, DEFAULT_MAX_PAYLOAD)
            .unwrap()
            .unwrap();
        assert_eq!(f2.payload.as_ref(), b"second");

        assert!(buf.is_empty());
    }

    #[test]
    fn test_frame_wire_size() {
        let frame = Frame::new(Bytes::from_static(b"test"));
        assert_eq!(frame.wire_size(), HEADER_SIZE + 4);
    }
}
