use std::future::Future;

use bytes::Bytes;

use crate::error::Result;
use crate::method::RpcMethod;

/// A streamed response body, delivered as opaque chunks.
///
/// Reads block until the next chunk arrives; there is no timeout. Dropping
/// the source closes the underlying connection.
pub trait ChunkSource: Send {
    /// Next body chunk, or `Ok(None)` once the stream has ended.
    fn next_chunk(&mut self) -> impl Future<Output = Result<Option<Bytes>>> + Send;
}

/// Issues framed requests to the local services.
pub trait RpcTransport: Send + Sync + 'static {
    /// Response body of a streaming call.
    type Stream: ChunkSource + 'static;

    /// Start a streaming call; `body` is a complete framed request.
    fn open_stream(
        &self,
        method: RpcMethod,
        body: Bytes,
    ) -> impl Future<Output = Result<Self::Stream>> + Send;

    /// Issue a one-shot call and report the HTTP status code.
    fn unary(&self, method: RpcMethod, body: Bytes) -> impl Future<Output = Result<u16>> + Send;
}
