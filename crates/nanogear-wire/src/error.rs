/// Errors that can occur while decoding wire-format fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The buffer ended in the middle of a varint.
    #[error("truncated input (buffer ended mid-varint)")]
    TruncatedInput,

    /// The bytes cannot be a well-formed message.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// A length-delimited value expected to be text is not UTF-8.
    #[error("field {field} is not valid UTF-8")]
    InvalidUtf8 { field: u32 },
}

pub type Result<T> = std::result::Result<T, WireError>;
