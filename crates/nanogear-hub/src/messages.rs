//! Request messages for the five service calls.
//!
//! Every builder returns the unframed message; the caller wraps it with
//! [`nanogear_frame::wrap`] before posting.

use bytes::Bytes;
use nanogear_wire::WireWriter;

use crate::tracker::{TARGET_USAGE, TARGET_USAGE_PAGE};

/// USB vendor id of the supported keyboard.
pub const DEFAULT_VENDOR_ID: u32 = 0x3151;

/// USB product id of the supported keyboard.
pub const DEFAULT_PRODUCT_ID: u32 = 0x504E;

/// Default report definition: `{2: 64}`, a 64-byte feature report.
pub const DEFAULT_REPORT_DEFINITION: [u8; 2] = [0x10, 0x40];

/// Filter value the IoT manager expects in fields 1 and 6.
const FILTER_KIND: u64 = 2;

/// Control mode requested when taking over the device lights.
const CONTROL_MODE: u64 = 2;

/// Which device the IoT manager and HID service should hand to us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFilterSpec {
    pub vendor_id: u32,
    pub product_id: u32,
    /// Pre-encoded nested message placed verbatim in field 7.
    pub report_definition: Bytes,
}

impl DeviceFilterSpec {
    /// Filter registered with the IoT manager.
    ///
    /// ```text
    /// 1: 2, 2: vendor, 3: product, 4: usage, 5: usage page, 6: 2, 7: report definition
    /// ```
    pub fn encode(&self) -> WireWriter {
        let mut filter = WireWriter::new();
        filter
            .varint(1, FILTER_KIND)
            .varint(2, u64::from(self.vendor_id))
            .varint(3, u64::from(self.product_id))
            .varint(4, u64::from(TARGET_USAGE))
            .varint(5, u64::from(TARGET_USAGE_PAGE))
            .varint(6, FILTER_KIND)
            .length_delimited(7, &self.report_definition);
        filter
    }

    /// Vendor/product pair sent with the device-monitoring request.
    pub fn encode_monitor_filter(&self) -> WireWriter {
        let mut ids = WireWriter::new();
        ids.varint(1, u64::from(self.vendor_id))
            .varint(2, u64::from(self.product_id));
        ids
    }
}

impl Default for DeviceFilterSpec {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VENDOR_ID,
            product_id: DEFAULT_PRODUCT_ID,
            report_definition: Bytes::from_static(&DEFAULT_REPORT_DEFINITION),
        }
    }
}

/// `StartClientMonitoring` takes an empty message.
pub fn session_monitor_request() -> Bytes {
    Bytes::new()
}

/// `StartDeviceMonitoring`: `{1: {1: vendor, 2: product}}`.
pub fn device_monitor_request(filter: &DeviceFilterSpec) -> Bytes {
    let mut request = WireWriter::new();
    request.message(1, &filter.encode_monitor_filter());
    request.finish()
}

/// `AddDeviceFilter`: `{1: iot session token, 2: filter}`.
pub fn filter_registration_request(iot_session_token: &str, filter: &DeviceFilterSpec) -> Bytes {
    let mut request = WireWriter::new();
    request
        .string(1, iot_session_token)
        .message(2, &filter.encode());
    request.finish()
}

/// `ControlDeviceLight`: `{1: device path, 2: 2, 4: iot session token}`.
pub fn activate_control_request(device_path: &str, iot_session_token: &str) -> Bytes {
    let mut request = WireWriter::new();
    request
        .string(1, device_path)
        .varint(2, CONTROL_MODE)
        .string(4, iot_session_token);
    request.finish()
}

/// `SendFeatureReport`: `{1: device path, 2: report, 4: hid session token}`.
pub fn feature_report_request(device_path: &str, report: &[u8], hid_session_token: &str) -> Bytes {
    let mut request = WireWriter::new();
    request
        .string(1, device_path)
        .length_delimited(2, report)
        .string(4, hid_session_token);
    request.finish()
}
