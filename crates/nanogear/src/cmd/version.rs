use nanogear_hub::{DEFAULT_PRODUCT_ID, DEFAULT_VENDOR_ID};
use nanogear_transport::{DEFAULT_HID_URL, DEFAULT_IOT_URL};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("nanogear {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: nanogear");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("NANOGEAR_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("iot_manager: {DEFAULT_IOT_URL}");
    println!("hid_service: {DEFAULT_HID_URL}");
    println!("device: {DEFAULT_VENDOR_ID:#06x}:{DEFAULT_PRODUCT_ID:#06x}");

    Ok(SUCCESS)
}
