use std::future::Future;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use nanogear_hub::{
    CommandRequest, Hub, HubConfig, HubError, LightArea, ListenerExit, ListenerKind, Rgb,
};
use nanogear_transport::{
    HttpTransport, RpcTransport, TransportConfig, DEFAULT_HID_URL, DEFAULT_IOT_URL,
};

use crate::exit::{validation_error, CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod encode;
pub mod modes;
pub mod monitor;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Follow the service links and print status until interrupted.
    Monitor(MonitorArgs),
    /// Wait for the keyboard and send one lighting command.
    Send(SendArgs),
    /// Encode a lighting command without connecting.
    Encode(EncodeArgs),
    /// List the lighting modes of each area.
    Modes(ModesArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Monitor(args) => monitor::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Modes(args) => modes::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where the local services live and which keyboard to ask them for.
#[derive(Args, Debug, Clone)]
pub struct ConnectArgs {
    /// Base URL of the IoT manager.
    #[arg(long, env = "NANOGEAR_IOT_URL", default_value = DEFAULT_IOT_URL)]
    pub iot_url: String,
    /// Base URL of the HID service.
    #[arg(long, env = "NANOGEAR_HID_URL", default_value = DEFAULT_HID_URL)]
    pub hid_url: String,
    /// USB vendor id (decimal or 0x-prefixed hex).
    #[arg(long, env = "NANOGEAR_VENDOR_ID", default_value = "0x3151", value_parser = parse_id)]
    pub vendor_id: u32,
    /// USB product id (decimal or 0x-prefixed hex).
    #[arg(long, env = "NANOGEAR_PRODUCT_ID", default_value = "0x504E", value_parser = parse_id)]
    pub product_id: u32,
}

impl ConnectArgs {
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            iot_base_url: self.iot_url.clone(),
            hid_base_url: self.hid_url.clone(),
        }
    }

    pub fn hub_config(&self) -> HubConfig {
        HubConfig::default().with_device(self.vendor_id, self.product_id)
    }

    /// A hub over HTTP with its listeners running.
    pub fn start_hub(&self) -> Hub<HttpTransport> {
        let mut hub = Hub::new(HttpTransport::new(self.transport_config()), self.hub_config());
        hub.start();
        hub
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AreaArg {
    Main,
    Side,
}

impl From<AreaArg> for LightArea {
    fn from(area: AreaArg) -> Self {
        match area {
            AreaArg::Main => LightArea::Main,
            AreaArg::Side => LightArea::Side,
        }
    }
}

/// Parameters of a lighting command.
#[derive(Args, Debug, Clone)]
pub struct LightArgs {
    /// Light zone to address.
    #[arg(long, value_enum, default_value = "main")]
    pub area: AreaArg,
    /// Mode index (see `nanogear modes`).
    #[arg(long, default_value_t = 1)]
    pub mode: u8,
    /// Brightness level, 0-4.
    #[arg(long, default_value_t = 4)]
    pub brightness: u8,
    /// Effect speed, 0 (slow) to 4 (fast).
    #[arg(long, default_value_t = 3)]
    pub speed: u8,
    /// Color as RRGGBB or #RRGGBB.
    #[arg(long, default_value = "00D2FF")]
    pub color: String,
}

impl LightArgs {
    pub fn to_request(&self) -> CliResult<CommandRequest> {
        let color: Rgb = self
            .color
            .parse()
            .map_err(|err| validation_error("invalid --color", err))?;
        Ok(CommandRequest {
            area: self.area.into(),
            mode: self.mode,
            brightness: self.brightness,
            speed: self.speed,
            color,
        })
    }
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Print status at this interval as well as on every change (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub status_interval: String,
    /// Exit after printing N status lines.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    #[command(flatten)]
    pub light: LightArgs,
    /// How long to wait for the keyboard to be linked (e.g. 10s, 500ms).
    #[arg(long, default_value = "10s")]
    pub ready_timeout: String,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub light: LightArgs,
}

#[derive(Args, Debug)]
pub struct ModesArgs {
    /// Only list this area.
    #[arg(long, value_enum)]
    pub area: Option<AreaArg>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Run `future` to completion on a fresh multi-threaded runtime.
pub fn block_on<F: Future>(future: F) -> CliResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(INTERNAL, format!("runtime setup failed: {err}")))?;
    Ok(runtime.block_on(future))
}

/// First listener that ends with an error. Pends forever if none does.
pub async fn next_failure<T: RpcTransport>(hub: &mut Hub<T>) -> (ListenerKind, HubError) {
    while let Some(ListenerExit { kind, result }) = hub.next_exit().await {
        if let Err(err) = result {
            return (kind, err);
        }
    }
    std::future::pending().await
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

/// Decimal or `0x`-prefixed hexadecimal id.
fn parse_id(input: &str) -> Result<u32, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid id {input:?}: expected decimal or 0x-prefixed hex"))
}
