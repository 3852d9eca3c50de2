//! In-memory transport and payload builders for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use nanogear_transport::{ChunkSource, RpcMethod, RpcTransport, TransportError};
use nanogear_wire::WireWriter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: RpcMethod,
    pub body: Bytes,
}

struct CannedStream {
    chunks: Vec<Bytes>,
    finite: bool,
}

/// Answers streaming calls with canned chunks and unary calls with a fixed
/// status (200 unless overridden). Streaming calls without canned chunks fail
/// with HTTP 503.
#[derive(Default, Clone)]
pub struct MockTransport {
    streams: Arc<Mutex<HashMap<RpcMethod, CannedStream>>>,
    statuses: Arc<Mutex<HashMap<RpcMethod, u16>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `chunks`, then stay open until dropped.
    pub fn with_stream(self, method: RpcMethod, chunks: Vec<Bytes>) -> Self {
        self.canned(method, chunks, false)
    }

    /// Deliver `chunks`, then end the stream.
    pub fn with_finite_stream(self, method: RpcMethod, chunks: Vec<Bytes>) -> Self {
        self.canned(method, chunks, true)
    }

    pub fn with_status(self, method: RpcMethod, status: u16) -> Self {
        self.statuses.lock().unwrap().insert(method, status);
        self
    }

    fn canned(self, method: RpcMethod, chunks: Vec<Bytes>, finite: bool) -> Self {
        self.streams
            .lock()
            .unwrap()
            .insert(method, CannedStream { chunks, finite });
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls that were not streaming calls.
    pub fn unary_calls(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| !call.method.is_streaming())
            .collect()
    }

    fn record(&self, method: RpcMethod, body: Bytes) {
        self.calls.lock().unwrap().push(RecordedCall { method, body });
    }
}

pub struct MockStream {
    chunks: VecDeque<Bytes>,
    finite: bool,
}

impl ChunkSource for MockStream {
    async fn next_chunk(&mut self) -> nanogear_transport::Result<Option<Bytes>> {
        if let Some(chunk) = self.chunks.pop_front() {
            return Ok(Some(chunk));
        }
        if self.finite {
            return Ok(None);
        }
        std::future::pending().await
    }
}

impl RpcTransport for MockTransport {
    type Stream = MockStream;

    async fn open_stream(
        &self,
        method: RpcMethod,
        body: Bytes,
    ) -> nanogear_transport::Result<MockStream> {
        self.record(method, body);
        let canned = self.streams.lock().unwrap().remove(&method);
        match canned {
            Some(canned) => Ok(MockStream {
                chunks: canned.chunks.into(),
                finite: canned.finite,
            }),
            None => Err(TransportError::Status {
                method: method.name(),
                status: 503,
            }),
        }
    }

    async fn unary(&self, method: RpcMethod, body: Bytes) -> nanogear_transport::Result<u16> {
        self.record(method, body);
        let status = self.statuses.lock().unwrap().get(&method).copied();
        Ok(status.unwrap_or(200))
    }
}

/// Frame `payload` as a data frame.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    nanogear_frame::wrap(payload).unwrap().to_vec()
}

/// `{1: {2: token}}`, the session message of both monitoring streams.
pub fn session_payload(token: &str) -> Vec<u8> {
    let mut session = WireWriter::new();
    session.string(2, token);
    let mut payload = WireWriter::new();
    payload.message(1, &session);
    payload.as_bytes().to_vec()
}

/// A device event listing one interface.
pub fn device_payload(path: &str, usage_page: u32, usage: u32) -> Vec<u8> {
    let mut descriptor = WireWriter::new();
    descriptor
        .string(1, path)
        .varint(7, u64::from(usage_page))
        .varint(8, u64::from(usage));
    let mut info = WireWriter::new();
    info.message(2, &descriptor);
    let mut event = WireWriter::new();
    event.message(1, &info);
    let mut payload = WireWriter::new();
    payload.message(2, &event);
    payload.as_bytes().to_vec()
}
