use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use nanogear_transport::{RpcMethod, RpcTransport};
use serde::Serialize;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::command::{build_command, CommandRequest, LightArea, LightMode};
use crate::config::HubConfig;
use crate::error::{HubError, Result};
use crate::listener::{run_filter_registration, run_monitor, ListenerKind};
use crate::messages::{
    activate_control_request, device_monitor_request, feature_report_request,
    session_monitor_request,
};
use crate::state::{LinkPhase, SessionState, SharedState};
use crate::tracker::{DeviceTracker, SessionTracker};

/// How a background task ended.
#[derive(Debug)]
pub struct ListenerExit {
    pub kind: ListenerKind,
    pub result: Result<()>,
}

/// Outcome of a command accepted by the HID service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandReceipt {
    pub area: LightArea,
    pub mode: LightMode,
    /// Packet bytes as upper-case hex.
    pub trace: String,
    pub device_path: String,
}

/// Owns the background listeners and the command path for one process.
pub struct Hub<T: RpcTransport> {
    transport: Arc<T>,
    state: SharedState,
    config: HubConfig,
    cancel: CancellationToken,
    listeners: JoinSet<ListenerExit>,
    started: bool,
}

impl<T: RpcTransport> Hub<T> {
    pub fn new(transport: T, config: HubConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            state: SharedState::new(),
            config,
            cancel: CancellationToken::new(),
            listeners: JoinSet::new(),
            started: false,
        }
    }

    /// Spawn both monitors and the filter registration. Later calls are
    /// no-ops. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let filter = self.config.filter.clone();
        tracing::debug!(
            vendor_id = filter.vendor_id,
            product_id = filter.product_id,
            "starting listeners"
        );

        self.spawn(
            ListenerKind::SessionMonitor,
            run_monitor(
                Arc::clone(&self.transport),
                SessionTracker,
                session_monitor_request(),
                self.state.clone(),
                self.config.frame.clone(),
                self.cancel.child_token(),
            ),
        );
        self.spawn(
            ListenerKind::DeviceMonitor,
            run_monitor(
                Arc::clone(&self.transport),
                DeviceTracker,
                device_monitor_request(&filter),
                self.state.clone(),
                self.config.frame.clone(),
                self.cancel.child_token(),
            ),
        );
        self.spawn(
            ListenerKind::FilterRegistration,
            run_filter_registration(
                Arc::clone(&self.transport),
                filter,
                self.state.clone(),
                self.cancel.child_token(),
            ),
        );
    }

    fn spawn<F>(&mut self, kind: ListenerKind, task: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        self.listeners.spawn(async move {
            let result = task.await;
            match &result {
                Ok(()) => tracing::debug!(listener = kind.name(), "listener stopped"),
                Err(err) => tracing::error!(listener = kind.name(), error = %err, "listener terminated"),
            }
            ListenerExit { kind, result }
        });
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn phase(&self) -> LinkPhase {
        self.state.phase()
    }

    /// Wait until the device is linked and the filter registered.
    pub async fn wait_ready(&self, timeout: Duration) -> Result<SessionState> {
        tokio::time::timeout(timeout, self.state.wait_ready())
            .await
            .map_err(|_| HubError::Timeout(timeout))
    }

    /// Next listener to finish, or `None` once none are running.
    pub async fn next_exit(&mut self) -> Option<ListenerExit> {
        loop {
            match self.listeners.join_next().await? {
                Ok(exit) => return Some(exit),
                Err(err) if err.is_cancelled() => continue,
                Err(err) => {
                    tracing::error!(error = %err, "listener task panicked");
                    continue;
                }
            }
        }
    }

    /// Validate `request`, then push it to the device.
    ///
    /// Fails with [`HubError::DeviceNotReady`] without touching the network
    /// unless the target interface and both sessions are known. Device
    /// control is activated on the IoT manager first (its status is not
    /// inspected), then the feature report goes to the HID service, which
    /// must answer 200.
    pub async fn send(&self, request: &CommandRequest) -> Result<CommandReceipt> {
        let encoded = build_command(request)?;

        let snapshot = self.state.snapshot();
        let target = snapshot
            .command_target()
            .map_err(|reason| HubError::DeviceNotReady {
                phase: snapshot.phase(),
                reason,
            })?;

        let activation = nanogear_frame::wrap(&activate_control_request(
            target.device_path,
            target.iot_session_token,
        ))?;
        let status = self
            .transport
            .unary(RpcMethod::ControlDeviceLight, activation)
            .await?;
        tracing::debug!(status, path = target.device_path, "device control activated");

        let report = nanogear_frame::wrap(&feature_report_request(
            target.device_path,
            &encoded.report,
            target.hid_session_token,
        ))?;
        tracing::debug!(area = %request.area, trace = %encoded.trace, "sending feature report");
        let status = self
            .transport
            .unary(RpcMethod::SendFeatureReport, report)
            .await?;
        if status != 200 {
            tracing::warn!(status, area = %request.area, mode = encoded.mode.name, "feature report rejected");
            return Err(HubError::ReportRejected { status });
        }

        tracing::info!(area = %request.area, mode = encoded.mode.name, "command sent");
        Ok(CommandReceipt {
            area: request.area,
            mode: *encoded.mode,
            trace: encoded.trace,
            device_path: target.device_path.to_string(),
        })
    }

    /// Cancel every listener and wait for them to finish.
    pub async fn shutdown(&mut self) -> Vec<ListenerExit> {
        self.cancel.cancel();
        let mut exits = Vec::new();
        while let Some(exit) = self.next_exit().await {
            exits.push(exit);
        }
        exits
    }
}

impl<T: RpcTransport> Drop for Hub<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
