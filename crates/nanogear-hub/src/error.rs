use std::time::Duration;

use crate::command::ValidationError;
use crate::state::LinkPhase;

/// Errors that can occur in hub operations.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] nanogear_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] nanogear_frame::FrameError),

    /// A received message could not be decoded.
    #[error("wire error: {0}")]
    Wire(#[from] nanogear_wire::WireError),

    /// The requested command is not valid for the hardware.
    #[error("invalid command: {0}")]
    Validation(#[from] ValidationError),

    /// A command was issued before the target device was linked.
    #[error("device not ready ({phase}): {reason}")]
    DeviceNotReady {
        phase: LinkPhase,
        reason: &'static str,
    },

    /// The HID service refused the feature report.
    #[error("feature report rejected with HTTP {status}")]
    ReportRejected { status: u16 },

    /// A monitoring stream ended while the listener was still running.
    #[error("{method} stream closed by the service ({pending} bytes of partial frame discarded)")]
    StreamClosed {
        method: &'static str,
        pending: usize,
    },

    /// Waiting for a link state timed out.
    #[error("timed out after {0:?} waiting for the device")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, HubError>;
