//! Long-lived background tasks feeding [`SharedState`].
//!
//! Two monitors read the streaming calls and apply what their trackers
//! observe; a one-shot task registers the device filter once the IoT side is
//! linked. All three stop promptly when their cancellation token fires.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use nanogear_frame::{FrameAssembler, FrameConfig};
use nanogear_transport::{ChunkSource, RpcMethod, RpcTransport};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::{HubError, Result};
use crate::messages::{filter_registration_request, DeviceFilterSpec};
use crate::state::SharedState;
use crate::tracker::{Observation, Tracker};

/// Identifies a background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerKind {
    SessionMonitor,
    DeviceMonitor,
    FilterRegistration,
}

impl ListenerKind {
    pub fn name(self) -> &'static str {
        match self {
            ListenerKind::SessionMonitor => "session_monitor",
            ListenerKind::DeviceMonitor => "device_monitor",
            ListenerKind::FilterRegistration => "filter_registration",
        }
    }
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Open `K::METHOD` as a stream and apply every observation until the stream
/// ends or `cancel` fires.
///
/// Cancellation returns `Ok(())`. A stream that ends on its own is
/// [`HubError::StreamClosed`]. Frames whose payload cannot be decoded are
/// logged and skipped; observations decoded before the bad field still apply.
pub async fn run_monitor<T, K>(
    transport: Arc<T>,
    tracker: K,
    request: Bytes,
    state: SharedState,
    frame_config: FrameConfig,
    cancel: CancellationToken,
) -> Result<()>
where
    T: RpcTransport,
    K: Tracker,
{
    let method = K::METHOD;
    let body = nanogear_frame::wrap(&request)?;

    let mut stream = tokio::select! {
        _ = cancel.cancelled() => return Ok(()),
        opened = transport.open_stream(method, body) => opened?,
    };
    tracing::debug!(method = method.name(), "monitoring stream open");

    let mut assembler = FrameAssembler::with_config(frame_config);
    let mut observations = Vec::new();

    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(method = method.name(), "monitor cancelled");
                return Ok(());
            }
            chunk = stream.next_chunk() => chunk?,
        };
        let Some(chunk) = chunk else {
            return Err(HubError::StreamClosed {
                method: method.name(),
                pending: assembler.pending(),
            });
        };

        assembler.add(&chunk);
        while let Some(frame) = assembler.read_frame()? {
            if frame.is_trailer() {
                tracing::debug!(method = method.name(), flag = frame.flag, "skipping trailer frame");
                continue;
            }

            observations.clear();
            let decoded = tracker.observe(&frame.payload, &mut observations);
            for observation in &observations {
                apply(&state, method, observation);
            }
            if let Err(err) = decoded {
                tracing::warn!(
                    method = method.name(),
                    size = frame.payload.len(),
                    error = %err,
                    "skipping malformed frame"
                );
            }
        }
    }
}

fn apply(state: &SharedState, method: RpcMethod, observation: &Observation) {
    let advanced = state.apply(observation);
    match observation {
        Observation::IotSession(token) if advanced => {
            tracing::info!(token = %token_prefix(token), "IoT manager session linked");
        }
        Observation::HidSession(token) if advanced => {
            tracing::info!(token = %token_prefix(token), "HID service session received");
        }
        Observation::DeviceAttached(descriptor) if advanced => {
            tracing::info!(path = %descriptor.path, "target interface attached");
        }
        Observation::DeviceIgnored(descriptor) => {
            tracing::debug!(
                path = %descriptor.path,
                usage_page = descriptor.usage_page,
                usage = descriptor.usage,
                "ignoring non-target interface"
            );
        }
        _ => tracing::debug!(method = method.name(), ?observation, "state refreshed"),
    }
}

/// First 16 characters, enough to tell sessions apart in logs.
fn token_prefix(token: &str) -> &str {
    token
        .char_indices()
        .nth(16)
        .map_or(token, |(end, _)| &token[..end])
}

/// Register `filter` with the IoT manager exactly once, as soon as an IoT
/// session token is known.
///
/// The status of the call is logged but not interpreted; the filter counts
/// as registered once the manager has answered.
pub async fn run_filter_registration<T>(
    transport: Arc<T>,
    filter: DeviceFilterSpec,
    state: SharedState,
    cancel: CancellationToken,
) -> Result<()>
where
    T: RpcTransport,
{
    let linked = tokio::select! {
        _ = cancel.cancelled() => return Ok(()),
        linked = state.wait_until(|s| s.iot_connected && s.iot_session_token.is_some()) => linked,
    };
    let Some(token) = linked.iot_session_token else {
        return Ok(());
    };

    let request = filter_registration_request(&token, &filter);
    let body = nanogear_frame::wrap(&request)?;
    let status = tokio::select! {
        _ = cancel.cancelled() => return Ok(()),
        status = transport.unary(RpcMethod::AddDeviceFilter, body) => status?,
    };

    if status != 200 {
        tracing::warn!(status, "device filter registration answered with non-success status");
    }
    if state.mark_filter_registered() {
        tracing::info!(
            vendor_id = filter.vendor_id,
            product_id = filter.product_id,
            "device filter registered"
        );
    }
    Ok(())
}
