use nanogear_frame::FrameConfig;

use crate::messages::DeviceFilterSpec;

/// Configuration for a [`Hub`](crate::Hub).
#[derive(Debug, Clone, Default)]
pub struct HubConfig {
    /// Device the listeners ask the services for.
    pub filter: DeviceFilterSpec,
    /// Limits applied to frames read from the monitoring streams.
    pub frame: FrameConfig,
}

impl HubConfig {
    /// Override the vendor and product ids, keeping the report definition.
    pub fn with_device(mut self, vendor_id: u32, product_id: u32) -> Self {
        self.filter.vendor_id = vendor_id;
        self.filter.product_id = product_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{DEFAULT_PRODUCT_ID, DEFAULT_VENDOR_ID};

    #[test]
    fn defaults_target_the_supported_keyboard() {
        let config = HubConfig::default();
        assert_eq!(config.filter.vendor_id, DEFAULT_VENDOR_ID);
        assert_eq!(config.filter.product_id, DEFAULT_PRODUCT_ID);
        assert_eq!(config.frame.max_payload_size, nanogear_frame::DEFAULT_MAX_PAYLOAD);
    }

    #[test]
    fn with_device_keeps_report_definition() {
        let config = HubConfig::default().with_device(0x1234, 0x5678);
        assert_eq!(config.filter.vendor_id, 0x1234);
        assert_eq!(config.filter.product_id, 0x5678);
        assert_eq!(config.filter.report_definition.as_ref(), &[0x10, 0x40]);
    }
}
