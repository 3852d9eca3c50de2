use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::tracker::Observation;

/// Progress of the command path towards a controllable device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkPhase {
    /// Nothing observed yet.
    Disconnected,
    /// The IoT manager reported a client session.
    IotLinked,
    /// The device filter has been registered with the IoT manager.
    FilterRegistered,
    /// The HID service reported the target interface.
    HidLinked,
    /// Target interface attached and filter registered.
    Ready,
}

impl LinkPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkPhase::Disconnected => "DISCONNECTED",
            LinkPhase::IotLinked => "IOT_LINKED",
            LinkPhase::FilterRegistered => "FILTER_REGISTERED",
            LinkPhase::HidLinked => "HID_LINKED",
            LinkPhase::Ready => "READY",
        }
    }
}

impl fmt::Display for LinkPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything learned from the monitoring streams during this process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub iot_session_token: Option<String>,
    pub hid_session_token: Option<String>,
    pub iot_connected: bool,
    pub hid_connected: bool,
    pub filter_registered: bool,
    pub device_path: Option<String>,
}

/// The identifiers a command needs, borrowed from a [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTarget<'a> {
    pub device_path: &'a str,
    pub iot_session_token: &'a str,
    pub hid_session_token: &'a str,
}

impl SessionState {
    pub fn phase(&self) -> LinkPhase {
        match (self.hid_connected, self.filter_registered, self.iot_connected) {
            (true, true, _) => LinkPhase::Ready,
            (true, false, _) => LinkPhase::HidLinked,
            (false, true, _) => LinkPhase::FilterRegistered,
            (false, false, true) => LinkPhase::IotLinked,
            (false, false, false) => LinkPhase::Disconnected,
        }
    }

    /// Identifiers for issuing a command, or why commands are blocked.
    pub fn command_target(&self) -> Result<CommandTarget<'_>, &'static str> {
        if !self.hid_connected {
            return Err("target device not attached");
        }
        let device_path = self
            .device_path
            .as_deref()
            .ok_or("target device has no path")?;
        let iot_session_token = self
            .iot_session_token
            .as_deref()
            .ok_or("no IoT manager session")?;
        let hid_session_token = self
            .hid_session_token
            .as_deref()
            .ok_or("no HID service session")?;
        Ok(CommandTarget {
            device_path,
            iot_session_token,
            hid_session_token,
        })
    }

    pub fn can_send(&self) -> bool {
        self.command_target().is_ok()
    }
}

/// Process-wide [`SessionState`] shared by the listeners and the command path.
///
/// Writers go through the named transitions below; each field has exactly one
/// writing listener. Readers take snapshots or wait for a predicate.
#[derive(Debug, Clone)]
pub struct SharedState {
    tx: Arc<watch::Sender<SessionState>>,
}

impl SharedState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Store the IoT manager session token. Returns true when this links the
    /// IoT side for the first time.
    pub fn record_iot_session(&self, token: &str) -> bool {
        let mut linked = false;
        self.tx.send_if_modified(|state| {
            let replaced = replace_if_changed(&mut state.iot_session_token, token);
            linked = !state.iot_connected;
            state.iot_connected = true;
            replaced || linked
        });
        linked
    }

    /// Store the HID service session token. Returns true on first sight.
    pub fn record_hid_session(&self, token: &str) -> bool {
        let mut first = false;
        self.tx.send_if_modified(|state| {
            first = state.hid_session_token.is_none();
            replace_if_changed(&mut state.hid_session_token, token)
        });
        first
    }

    /// Record the target interface path. Returns true when this links the
    /// HID side for the first time.
    pub fn attach_device(&self, path: &str) -> bool {
        let mut linked = false;
        self.tx.send_if_modified(|state| {
            let replaced = replace_if_changed(&mut state.device_path, path);
            linked = !state.hid_connected;
            state.hid_connected = true;
            replaced || linked
        });
        linked
    }

    /// Returns true if the filter was not registered before.
    pub fn mark_filter_registered(&self) -> bool {
        self.tx.send_if_modified(|state| !std::mem::replace(&mut state.filter_registered, true))
    }

    /// Apply one tracker observation. Returns true if it moved a link forward.
    pub fn apply(&self, observation: &Observation) -> bool {
        match observation {
            Observation::IotSession(token) => self.record_iot_session(token),
            Observation::HidSession(token) => self.record_hid_session(token),
            Observation::DeviceAttached(descriptor) => self.attach_device(&descriptor.path),
            Observation::DeviceIgnored(_) => false,
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn phase(&self) -> LinkPhase {
        self.tx.borrow().phase()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Wait until `predicate` holds and return the state that satisfied it.
    pub async fn wait_until<F>(&self, predicate: F) -> SessionState
    where
        F: FnMut(&SessionState) -> bool,
    {
        let mut rx = self.tx.subscribe();
        let result = rx.wait_for(predicate).await.map(|state| state.clone());
        // `self` keeps the sender alive, so the channel cannot close here.
        result.unwrap_or_else(|_| self.snapshot())
    }

    /// Wait until commands can be sent and the filter is registered.
    pub async fn wait_ready(&self) -> SessionState {
        self.wait_until(|state| state.phase() == LinkPhase::Ready && state.can_send())
            .await
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

fn replace_if_changed(slot: &mut Option<String>, value: &str) -> bool {
    if slot.as_deref() == Some(value) {
        return false;
    }
    *slot = Some(value.to_string());
    true
}
