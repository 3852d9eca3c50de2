//! Decoding of the two monitoring streams.
//!
//! Both streams carry a session message in field 1:
//! ```text
//! 1: { 2: <session token> }
//! ```
//! The device stream additionally reports devices in field 2:
//! ```text
//! 2: { 1: { 2: { 1: <path>, 7: <usage page>, 8: <usage> } } }
//! ```

use nanogear_transport::RpcMethod;
use nanogear_wire::{Field, WireError, WireReader};
use serde::Serialize;

/// Usage page of the vendor-defined interface that accepts lighting commands.
pub const TARGET_USAGE_PAGE: u32 = 0xFFFF;

/// Usage of the vendor-defined interface that accepts lighting commands.
pub const TARGET_USAGE: u32 = 2;

const SESSION_FIELD: u32 = 1;
const SESSION_TOKEN_FIELD: u32 = 2;
const DEVICE_EVENT_FIELD: u32 = 2;
const DEVICE_INFO_FIELD: u32 = 1;
const HID_DESCRIPTOR_FIELD: u32 = 2;
const DESCRIPTOR_PATH_FIELD: u32 = 1;
const DESCRIPTOR_USAGE_PAGE_FIELD: u32 = 7;
const DESCRIPTOR_USAGE_FIELD: u32 = 8;

/// One interface exposed by a device, as reported by the HID service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HidDescriptor {
    pub path: String,
    pub usage_page: u32,
    pub usage: u32,
}

impl HidDescriptor {
    pub fn is_target(&self) -> bool {
        is_target_interface(self.usage_page, self.usage)
    }
}

/// Attach predicate: only the vendor-defined lighting interface is accepted.
pub fn is_target_interface(usage_page: u32, usage: u32) -> bool {
    usage_page == TARGET_USAGE_PAGE && usage == TARGET_USAGE
}

/// Something a monitoring stream told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    IotSession(String),
    HidSession(String),
    DeviceAttached(HidDescriptor),
    DeviceIgnored(HidDescriptor),
}

/// Turns the payload of one stream frame into observations.
pub trait Tracker: Send + Sync + 'static {
    /// The streaming call this tracker consumes.
    const METHOD: RpcMethod;

    /// Decode `payload`, pushing observations in stream order.
    ///
    /// On error, observations decoded before the bad field are already in
    /// `out`.
    fn observe(&self, payload: &[u8], out: &mut Vec<Observation>) -> nanogear_wire::Result<()>;
}

/// Watches the IoT manager's client-monitoring stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionTracker;

impl Tracker for SessionTracker {
    const METHOD: RpcMethod = RpcMethod::StartClientMonitoring;

    fn observe(&self, payload: &[u8], out: &mut Vec<Observation>) -> nanogear_wire::Result<()> {
        for field in WireReader::new(payload) {
            let field = field?;
            if field.number == SESSION_FIELD {
                if let Some(token) = session_token(&field)? {
                    out.push(Observation::IotSession(token));
                }
            }
        }
        Ok(())
    }
}

/// Watches the HID service's device-monitoring stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceTracker;

impl Tracker for DeviceTracker {
    const METHOD: RpcMethod = RpcMethod::StartDeviceMonitoring;

    fn observe(&self, payload: &[u8], out: &mut Vec<Observation>) -> nanogear_wire::Result<()> {
        for field in WireReader::new(payload) {
            let field = field?;
            match field.number {
                SESSION_FIELD => {
                    if let Some(token) = session_token(&field)? {
                        out.push(Observation::HidSession(token));
                    }
                }
                DEVICE_EVENT_FIELD => device_event(&field, out)?,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Token of a session message; the last occurrence wins.
fn session_token(field: &Field<'_>) -> nanogear_wire::Result<Option<String>> {
    let Some(session) = field.as_message() else {
        return Ok(None);
    };
    let mut token = None;
    for inner in session {
        let inner = inner?;
        if inner.number == SESSION_TOKEN_FIELD {
            if let Some(text) = inner.as_text()? {
                token = Some(text.to_string());
            }
        }
    }
    Ok(token)
}

fn device_event(field: &Field<'_>, out: &mut Vec<Observation>) -> nanogear_wire::Result<()> {
    let Some(event) = field.as_message() else {
        return Ok(());
    };
    for info in event {
        let info = info?;
        if info.number != DEVICE_INFO_FIELD {
            continue;
        }
        let Some(info) = info.as_message() else {
            continue;
        };
        for descriptor in info {
            let descriptor = descriptor?;
            if descriptor.number != HID_DESCRIPTOR_FIELD {
                continue;
            }
            if let Some(fields) = descriptor.as_message() {
                let descriptor = parse_descriptor(fields)?;
                if descriptor.is_target() {
                    out.push(Observation::DeviceAttached(descriptor));
                } else {
                    out.push(Observation::DeviceIgnored(descriptor));
                }
            }
        }
    }
    Ok(())
}

fn parse_descriptor(fields: WireReader<'_>) -> nanogear_wire::Result<HidDescriptor> {
    let mut descriptor = HidDescriptor::default();
    for field in fields {
        let field = field?;
        match field.number {
            DESCRIPTOR_PATH_FIELD => {
                if let Some(path) = field.as_text()? {
                    descriptor.path = path.to_string();
                }
            }
            DESCRIPTOR_USAGE_PAGE_FIELD => {
                if let Some(value) = field.as_varint() {
                    descriptor.usage_page = narrow(field.number, value)?;
                }
            }
            DESCRIPTOR_USAGE_FIELD => {
                if let Some(value) = field.as_varint() {
                    descriptor.usage = narrow(field.number, value)?;
                }
            }
            _ => {}
        }
    }
    Ok(descriptor)
}

fn narrow(field: u32, value: u64) -> nanogear_wire::Result<u32> {
    u32::try_from(value).map_err(|_| {
        WireError::MalformedMessage(format!("field {field} value {value} does not fit 32 bits"))
    })
}

#[cfg(test)]
mod tests {
    use nanogear_wire::WireWriter;

    use super::*;

    fn session_message(field: u32, token: &str) -> WireWriter {
        let mut session = WireWriter::new();
        session.varint(1, 7).string(SESSION_TOKEN_FIELD, token);
        let mut outer = WireWriter::new();
        outer.message(field, &session);
        outer
    }

    fn device_message(path: &str, usage_page: u64, usage: u64) -> WireWriter {
        let mut descriptor = WireWriter::new();
        descriptor
            .string(DESCRIPTOR_PATH_FIELD, path)
            .varint(3, 0x3151)
            .varint(DESCRIPTOR_USAGE_PAGE_FIELD, usage_page)
            .varint(DESCRIPTOR_USAGE_FIELD, usage);
        let mut info = WireWriter::new();
        info.string(1, "Keyboard").message(HID_DESCRIPTOR_FIELD, &descriptor);
        let mut event = WireWriter::new();
        event.message(DEVICE_INFO_FIELD, &info);
        let mut outer = WireWriter::new();
        outer.message(DEVICE_EVENT_FIELD, &event);
        outer
    }

    fn observe<T: Tracker>(tracker: T, payload: &[u8]) -> Vec<Observation> {
        let mut out = Vec::new();
        tracker.observe(payload, &mut out).unwrap();
        out
    }

    #[test]
    fn attach_predicate_cases() {
        assert!(is_target_interface(65_535, 2));
        assert!(!is_target_interface(65_535, 1));
        assert!(!is_target_interface(0, 2));
        assert!(!is_target_interface(1, 1));
    }

    #[test]
    fn session_tracker_extracts_token() {
        let payload = session_message(SESSION_FIELD, "0123456789abcdef-iot");
        let observations = observe(SessionTracker, payload.as_bytes());
        assert_eq!(
            observations,
            vec![Observation::IotSession("0123456789abcdef-iot".to_string())]
        );
    }

    #[test]
    fn session_tracker_ignores_other_fields() {
        let mut payload = WireWriter::new();
        payload.varint(3, 1).string(4, "noise");
        assert!(observe(SessionTracker, payload.as_bytes()).is_empty());
    }

    #[test]
    fn session_without_token_is_not_an_observation() {
        let mut session = WireWriter::new();
        session.varint(1, 1);
        let mut payload = WireWriter::new();
        payload.message(SESSION_FIELD, &session);
        assert!(observe(SessionTracker, payload.as_bytes()).is_empty());
    }

    #[test]
    fn device_tracker_reports_session_and_target() {
        let mut payload = session_message(SESSION_FIELD, "hid-token");
        payload.raw(device_message("/dev/hidraw4", 65_535, 2).as_bytes());

        let observations = observe(DeviceTracker, payload.as_bytes());
        assert_eq!(
            observations,
            vec![
                Observation::HidSession("hid-token".to_string()),
                Observation::DeviceAttached(HidDescriptor {
                    path: "/dev/hidraw4".to_string(),
                    usage_page: 65_535,
                    usage: 2,
                }),
            ]
        );
    }

    #[test]
    fn device_tracker_ignores_other_interfaces() {
        let payload = device_message("/dev/hidraw0", 1, 6);
        let observations = observe(DeviceTracker, payload.as_bytes());
        assert_eq!(observations.len(), 1);
        assert!(matches!(&observations[0], Observation::DeviceIgnored(d) if d.usage == 6));
    }

    #[test]
    fn oversized_usage_is_malformed() {
        let payload = device_message("/dev/hidraw9", u64::from(u32::MAX) + 1, 2);
        let mut out = Vec::new();
        let err = DeviceTracker.observe(payload.as_bytes(), &mut out).unwrap_err();
        assert!(matches!(err, WireError::MalformedMessage(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn observations_before_a_malformed_field_are_kept() {
        let mut payload = session_message(SESSION_FIELD, "kept");
        // 2: length 9 with only 1 byte behind it
        payload.raw(&[0x12, 0x09, 0x0A]);

        let mut out = Vec::new();
        let err = DeviceTracker.observe(payload.as_bytes(), &mut out).unwrap_err();
        assert!(matches!(err, WireError::MalformedMessage(_)));
        assert_eq!(out, vec![Observation::HidSession("kept".to_string())]);
    }

    #[test]
    fn non_utf8_token_is_reported() {
        let mut session = WireWriter::new();
        session.length_delimited(SESSION_TOKEN_FIELD, &[0xFF, 0xFE]);
        let mut payload = WireWriter::new();
        payload.message(SESSION_FIELD, &session);

        let mut out = Vec::new();
        let err = SessionTracker.observe(payload.as_bytes(), &mut out).unwrap_err();
        assert_eq!(err, WireError::InvalidUtf8 { field: SESSION_TOKEN_FIELD });
    }
}
