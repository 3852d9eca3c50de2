use bytes::BytesMut;

use crate::codec::{decode_frame, Frame, FrameConfig};
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Reassembles frames from chunks of a streamed response body.
///
/// Chunk boundaries carry no meaning: a chunk may hold several frames, a
/// fraction of one, or the tail of one frame and the head of the next.
pub struct FrameAssembler {
    buf: BytesMut,
    config: FrameConfig,
}

impl FrameAssembler {
    /// Create a new assembler with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a new assembler with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Append a chunk to the buffer.
    pub fn add(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Extract the next complete frame.
    ///
    /// `Ok(None)` means not yet available: call again after the next
    /// [`add`](Self::add). A trailing partial frame stays buffered.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        let frame = decode_frame(&mut self.buf, self.config.max_payload_size)?;
        if let Some(frame) = &frame {
            tracing::trace!(
                flag = frame.flag,
                size = frame.payload.len(),
                pending = self.buf.len(),
                "frame assembled"
            );
        }
        Ok(frame)
    }

    /// Bytes buffered but not yet part of a complete frame.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Current assembler configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use bytes::{BufMut, Bytes};

    use super::*;
    use crate::codec::{encode_frame, DATA_FLAG, HEADER_SIZE};
    use crate::error::FrameError;

    fn wire(payloads: &[&[u8]]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for payload in payloads {
            encode_frame(DATA_FLAG, payload, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    fn drain(assembler: &mut FrameAssembler) -> Vec<Bytes> {
        let mut out = Vec::new();
        while let Some(frame) = assembler.read_frame().unwrap() {
            out.push(frame.payload);
        }
        out
    }

    #[test]
    fn three_byte_chunks_yield_both_frames_then_none() {
        let bytes = wire(&[b"A", b"BB"]);
        let mut assembler = FrameAssembler::new();
        let mut frames = Vec::new();

        for chunk in bytes.chunks(3) {
            assembler.add(chunk);
            frames.extend(drain(&mut assembler));
        }

        assert_eq!(frames, vec![Bytes::from_static(b"A"), Bytes::from_static(b"BB")]);
        assert!(assembler.read_frame().unwrap().is_none());
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn several_frames_in_one_chunk() {
        let mut assembler = FrameAssembler::new();
        assembler.add(&wire(&[b"one", b"two", b"three"]));

        let frames = drain(&mut assembler);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].as_ref(), b"three");
    }

    #[test]
    fn partition_does_not_change_frames() {
        let payloads: Vec<Vec<u8>> = vec![
            b"".to_vec(),
            b"x".to_vec(),
            (0..=255u8).collect(),
            b"session-token".to_vec(),
        ];
        let refs: Vec<&[u8]> = payloads.iter().map(Vec::as_slice).collect();
        let bytes = wire(&refs);

        let mut whole = FrameAssembler::new();
        whole.add(&bytes);
        let expected = drain(&mut whole);
        assert_eq!(expected.len(), payloads.len());

        for chunk_size in 1..=bytes.len() {
            let mut assembler = FrameAssembler::new();
            let mut frames = Vec::new();
            for chunk in bytes.chunks(chunk_size) {
                assembler.add(chunk);
                frames.extend(drain(&mut assembler));
            }
            assert_eq!(frames, expected, "chunk size {chunk_size}");
            assert_eq!(assembler.pending(), 0);
        }
    }

    #[test]
    fn uneven_partition_with_empty_chunks() {
        let bytes = wire(&[b"alpha", b"beta"]);
        let cuts = [0usize, 0, 2, 7, 7, 11, bytes.len()];
        let mut assembler = FrameAssembler::new();
        let mut frames = Vec::new();

        for window in cuts.windows(2) {
            assembler.add(&bytes[window[0]..window[1]]);
            frames.extend(drain(&mut assembler));
        }

        assert_eq!(
            frames,
            vec![Bytes::from_static(b"alpha"), Bytes::from_static(b"beta")]
        );
    }

    #[test]
    fn trailing_partial_frame_stays_pending() {
        let mut bytes = wire(&[b"done"]);
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x04, b'n']);

        let mut assembler = FrameAssembler::new();
        assembler.add(&bytes);

        assert_eq!(assembler.read_frame().unwrap().unwrap().payload.as_ref(), b"done");
        assert!(assembler.read_frame().unwrap().is_none());
        assert_eq!(assembler.pending(), HEADER_SIZE + 1);

        assembler.add(b"ext");
        assert_eq!(assembler.read_frame().unwrap().unwrap().payload.as_ref(), b"next");
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut header = BytesMut::new();
        header.put_u8(DATA_FLAG);
        header.put_u32(1024);

        let mut assembler = FrameAssembler::with_config(FrameConfig {
            max_payload_size: 16,
        });
        assembler.add(&header);
        let err = assembler.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 1024, max: 16 }));
        assert_eq!(assembler.config().max_payload_size, 16);
    }
}
