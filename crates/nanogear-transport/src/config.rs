use crate::method::{RpcMethod, Service};

/// Default base URL of the IoT manager.
pub const DEFAULT_IOT_URL: &str = "http://127.0.0.1:6015";

/// Default base URL of the HID service.
pub const DEFAULT_HID_URL: &str = "http://127.0.0.1:3838";

/// Where the two local services listen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Base URL of the IoT manager, without trailing path.
    pub iot_base_url: String,
    /// Base URL of the HID service, without trailing path.
    pub hid_base_url: String,
}

impl TransportConfig {
    pub fn base_url(&self, service: Service) -> &str {
        match service {
            Service::Iot => &self.iot_base_url,
            Service::Hid => &self.hid_base_url,
        }
    }

    /// Full request URL for `method`.
    pub fn url_for(&self, method: RpcMethod) -> String {
        let base = self.base_url(method.service()).trim_end_matches('/');
        format!("{base}{}", method.path())
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            iot_base_url: DEFAULT_IOT_URL.to_string(),
            hid_base_url: DEFAULT_HID_URL.to_string(),
        }
    }
}
