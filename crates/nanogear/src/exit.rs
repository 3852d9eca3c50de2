use std::fmt;

use nanogear_hub::{HubError, ValidationError};
use nanogear_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DEVICE_NOT_READY: i32 = 30;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match err {
        TransportError::InvalidUrl { .. } => USAGE,
        TransportError::Build { .. } => INTERNAL,
        TransportError::Request { .. }
        | TransportError::Status { .. }
        | TransportError::Body { .. } => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn validation_error(context: &str, err: ValidationError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}

pub fn hub_error(context: &str, err: HubError) -> CliError {
    match err {
        HubError::Transport(err) => transport_error(context, err),
        HubError::Validation(err) => validation_error(context, err),
        HubError::Frame(_) | HubError::Wire(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        HubError::DeviceNotReady { .. } => {
            CliError::new(DEVICE_NOT_READY, format!("{context}: {err}"))
        }
        HubError::ReportRejected { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        HubError::StreamClosed { .. } => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        HubError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
    }
}
