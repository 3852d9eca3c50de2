use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use crate::method::RpcMethod;
use crate::traits::{ChunkSource, RpcTransport};

/// Content type of every request and response.
pub const GRPC_WEB_CONTENT_TYPE: &str = "application/grpc-web+proto";

/// Marker header the services expect on gRPC-Web requests.
pub const GRPC_WEB_HEADER: &str = "x-grpc-web";

/// HTTP/1.1 transport backed by a pooled hyper client.
///
/// Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client<HttpConnector, Full<Bytes>>,
    config: TransportConfig,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self { client, config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    async fn post(&self, method: RpcMethod, body: Bytes) -> Result<Response<Incoming>> {
        let url = self.config.url_for(method);
        let uri: Uri = url.parse().map_err(|_| TransportError::InvalidUrl {
            method: method.name(),
            url: url.clone(),
        })?;

        let request = Request::post(uri)
            .header(CONTENT_TYPE, GRPC_WEB_CONTENT_TYPE)
            .header(GRPC_WEB_HEADER, "1")
            .body(Full::new(body))
            .map_err(|source| TransportError::Build {
                method: method.name(),
                source,
            })?;

        tracing::debug!(method = method.name(), %url, "posting request");
        self.client
            .request(request)
            .await
            .map_err(|err| TransportError::Request {
                method: method.name(),
                source: Box::new(err),
            })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .finish()
    }
}

impl RpcTransport for HttpTransport {
    type Stream = HttpChunkStream;

    async fn open_stream(&self, method: RpcMethod, body: Bytes) -> Result<HttpChunkStream> {
        let response = self.post(method, body).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                method: method.name(),
                status: status.as_u16(),
            });
        }
        tracing::debug!(method = method.name(), "stream opened");
        Ok(HttpChunkStream {
            method,
            body: response.into_body(),
        })
    }

    async fn unary(&self, method: RpcMethod, body: Bytes) -> Result<u16> {
        let response = self.post(method, body).await?;
        Ok(response.status().as_u16())
    }
}

/// Streamed response body of an [`HttpTransport`] call.
pub struct HttpChunkStream {
    method: RpcMethod,
    body: Incoming,
}

impl ChunkSource for HttpChunkStream {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        while let Some(frame) = self.body.frame().await {
            let frame = frame.map_err(|err| TransportError::Body {
                method: self.method.name(),
                source: Box::new(err),
            })?;
            // HTTP trailers carry no message bytes.
            if let Ok(data) = frame.into_data() {
                return Ok(Some(data));
            }
        }
        Ok(None)
    }
}
