use std::fmt;

/// The two local services the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Session and device-filter management (`iot_manager.IotManager`).
    Iot,
    /// Device monitoring and feature reports (`hid.HidService`).
    Hid,
}

impl Service {
    pub fn name(self) -> &'static str {
        match self {
            Service::Iot => "iot_manager.IotManager",
            Service::Hid => "hid.HidService",
        }
    }
}

/// The fixed set of remote operations used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    /// Stream of client sessions on the IoT manager.
    StartClientMonitoring,
    /// Register the device filter for the target peripheral.
    AddDeviceFilter,
    /// Hand light control of a device to this client.
    ControlDeviceLight,
    /// Stream of HID sessions and attached devices.
    StartDeviceMonitoring,
    /// Write a feature report to a device.
    SendFeatureReport,
}

impl RpcMethod {
    pub fn service(self) -> Service {
        match self {
            RpcMethod::StartClientMonitoring
            | RpcMethod::AddDeviceFilter
            | RpcMethod::ControlDeviceLight => Service::Iot,
            RpcMethod::StartDeviceMonitoring | RpcMethod::SendFeatureReport => Service::Hid,
        }
    }

    /// Method name as it appears in the request path.
    pub fn name(self) -> &'static str {
        match self {
            RpcMethod::StartClientMonitoring => "StartClientMonitoring",
            RpcMethod::AddDeviceFilter => "AddDeviceFilter",
            RpcMethod::ControlDeviceLight => "ControlDeviceLight",
            RpcMethod::StartDeviceMonitoring => "StartDeviceMonitoring",
            RpcMethod::SendFeatureReport => "SendFeatureReport",
        }
    }

    /// Request path, e.g. `/hid.HidService/SendFeatureReport`.
    pub fn path(self) -> String {
        format!("/{}/{}", self.service().name(), self.name())
    }

    /// True for calls whose response is a long-lived stream.
    pub fn is_streaming(self) -> bool {
        matches!(
            self,
            RpcMethod::StartClientMonitoring | RpcMethod::StartDeviceMonitoring
        )
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
