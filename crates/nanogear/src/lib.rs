//! Lighting control for NanoGear keyboards.
//!
//! The keyboard is reached through two local services: an IoT manager that
//! hands out device control, and a HID service that forwards feature reports.
//! Both speak length-prefixed protobuf messages over HTTP (gRPC-Web).
//!
//! # Crate Structure
//!
//! - [`wire`] — Varint and length-delimited field codec
//! - [`frame`] — gRPC-Web message framing and stream reassembly
//! - [`transport`] — HTTP transport to the local services
//! - [`hub`] — Session tracking, device filter registration and commands

/// Re-export wire codec types.
pub mod wire {
    pub use nanogear_wire::*;
}

/// Re-export frame types.
pub mod frame {
    pub use nanogear_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use nanogear_transport::*;
}

/// Re-export hub types.
pub mod hub {
    pub use nanogear_hub::*;
}
