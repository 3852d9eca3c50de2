//! Transport seam between the protocol core and the local services.
//!
//! The core only needs two things from HTTP:
//! - a long-lived POST whose response body arrives as opaque chunks
//!   ([`RpcTransport::open_stream`] yielding a [`ChunkSource`])
//! - a one-shot POST whose status code is reported back
//!   ([`RpcTransport::unary`])
//!
//! Request bodies are already framed by the caller. [`HttpTransport`] is the
//! production implementation; tests substitute in-memory transports.

pub mod config;
pub mod error;
pub mod http;
pub mod method;
pub mod traits;

pub use config::{TransportConfig, DEFAULT_HID_URL, DEFAULT_IOT_URL};
pub use error::{Result, TransportError};
pub use http::{HttpChunkStream, HttpTransport, GRPC_WEB_CONTENT_TYPE, GRPC_WEB_HEADER};
pub use method::{RpcMethod, Service};
pub use traits::{ChunkSource, RpcTransport};
