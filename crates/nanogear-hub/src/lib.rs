//! Session tracking and lighting command path for the local HID services.
//!
//! A [`Hub`] runs two monitoring listeners (IoT manager client sessions and
//! HID device attachments) plus a one-shot device filter registration, all
//! feeding one [`SharedState`]. Once the target interface is linked,
//! [`Hub::send`] pushes lighting commands to it.

pub mod command;
pub mod config;
pub mod error;
pub mod hub;
pub mod listener;
pub mod messages;
pub mod state;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use command::{
    build_command, checksum, hex_upper, CommandPacket, CommandRequest, EncodedCommand, LightArea,
    LightMode, Rgb, ValidationError, DEFAULT_COLOR, MAIN_LIGHT_MODES, MAX_LEVEL, PACKET_LEN,
    REPORT_LEN, SIDE_LIGHT_MODES,
};
pub use config::HubConfig;
pub use error::{HubError, Result};
pub use hub::{CommandReceipt, Hub, ListenerExit};
pub use listener::{run_filter_registration, run_monitor, ListenerKind};
pub use messages::{
    activate_control_request, device_monitor_request, feature_report_request,
    filter_registration_request, session_monitor_request, DeviceFilterSpec,
    DEFAULT_PRODUCT_ID, DEFAULT_REPORT_DEFINITION, DEFAULT_VENDOR_ID,
};
pub use state::{CommandTarget, LinkPhase, SessionState, SharedState};
pub use tracker::{
    is_target_interface, DeviceTracker, HidDescriptor, Observation, SessionTracker, Tracker,
    TARGET_USAGE, TARGET_USAGE_PAGE,
};
