/// Errors that can occur while talking to the local services.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The configured base URL does not form a valid request URI.
    #[error("invalid url for {method}: {url}")]
    InvalidUrl { method: &'static str, url: String },

    /// The HTTP request could not be assembled.
    #[error("failed to build {method} request: {source}")]
    Build {
        method: &'static str,
        source: hyper::http::Error,
    },

    /// Connecting or sending the request failed.
    #[error("{method} request failed: {source}")]
    Request {
        method: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The service answered a streaming call with a non-success status.
    #[error("{method} answered HTTP {status}")]
    Status { method: &'static str, status: u16 },

    /// Reading the streamed response body failed.
    #[error("{method} response stream failed: {source}")]
    Body {
        method: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;
