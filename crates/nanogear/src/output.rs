use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use nanogear_hub::{
    hex_upper, CommandReceipt, CommandRequest, EncodedCommand, LightArea, LinkPhase, SessionState,
};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Characters of a session token worth showing.
const TOKEN_PREVIEW: usize = 16;

#[derive(Serialize)]
struct StatusOutput<'a> {
    phase: LinkPhase,
    iot_connected: bool,
    hid_connected: bool,
    filter_registered: bool,
    device_path: Option<&'a str>,
    iot_session: Option<String>,
    hid_session: Option<String>,
    timestamp: String,
}

pub fn print_status(state: &SessionState, format: OutputFormat) {
    let out = StatusOutput {
        phase: state.phase(),
        iot_connected: state.iot_connected,
        hid_connected: state.hid_connected,
        filter_registered: state.filter_registered,
        device_path: state.device_path.as_deref(),
        iot_session: state.iot_session_token.as_deref().map(token_preview),
        hid_session: state.hid_session_token.as_deref().map(token_preview),
        timestamp: now_unix_seconds(),
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PHASE", "IOT", "FILTER", "HID", "DEVICE"])
                .add_row(vec![
                    out.phase.to_string(),
                    link_label(out.iot_connected).to_string(),
                    link_label(out.filter_registered).to_string(),
                    link_label(out.hid_connected).to_string(),
                    out.device_path.unwrap_or("-").to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!(
                "phase={} iot={} filter={} hid={} device={}",
                out.phase,
                link_label(out.iot_connected),
                link_label(out.filter_registered),
                link_label(out.hid_connected),
                out.device_path.unwrap_or("-")
            );
        }
    }
}

#[derive(Serialize)]
struct ReceiptOutput<'a> {
    sent: bool,
    #[serde(flatten)]
    receipt: &'a CommandReceipt,
    timestamp: String,
}

pub fn print_receipt(receipt: &CommandReceipt, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ReceiptOutput {
            sent: true,
            receipt,
            timestamp: now_unix_seconds(),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["AREA", "MODE", "PACKET", "DEVICE"])
                .add_row(vec![
                    receipt.area.to_string(),
                    mode_label(receipt.mode.index, receipt.mode.name),
                    receipt.trace.clone(),
                    receipt.device_path.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "sent {} {} packet={}",
                receipt.area,
                mode_label(receipt.mode.index, receipt.mode.name),
                receipt.trace
            );
        }
        OutputFormat::Raw => println!("{}", receipt.trace),
    }
}

#[derive(Serialize)]
struct EncodedOutput {
    area: LightArea,
    mode: u8,
    mode_name: &'static str,
    brightness: u8,
    speed: u8,
    color: String,
    packet: String,
    checksum: u8,
    report: String,
}

/// Print an encoded command. `raw` writes the 65 report bytes unframed.
pub fn print_encoded(request: &CommandRequest, encoded: &EncodedCommand, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&EncodedOutput {
            area: request.area,
            mode: encoded.mode.index,
            mode_name: encoded.mode.name,
            brightness: request.brightness,
            speed: request.speed,
            color: request.color.to_string(),
            packet: encoded.trace.clone(),
            checksum: encoded.packet.checksum(),
            report: hex_upper(&encoded.report),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["AREA", "MODE", "COLOR", "PACKET"])
                .add_row(vec![
                    request.area.to_string(),
                    mode_label(encoded.mode.index, encoded.mode.name),
                    request.color.to_string(),
                    encoded.trace.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", encoded.trace),
        OutputFormat::Raw => print_raw(&encoded.report),
    }
}

#[derive(Serialize)]
struct ModeOutput {
    area: LightArea,
    index: u8,
    name: &'static str,
}

pub fn print_modes(areas: &[LightArea], format: OutputFormat) {
    let rows: Vec<ModeOutput> = areas
        .iter()
        .flat_map(|area| {
            area.modes().iter().map(|mode| ModeOutput {
                area: *area,
                index: mode.index,
                name: mode.name,
            })
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["AREA", "INDEX", "NAME"]);
            for row in &rows {
                table.add_row(vec![
                    row.area.to_string(),
                    row.index.to_string(),
                    row.name.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for row in &rows {
                println!("{} {}", row.area, mode_label(row.index, row.name));
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn mode_label(index: u8, name: &str) -> String {
    format!("{index}:{name}")
}

fn link_label(linked: bool) -> &'static str {
    if linked {
        "up"
    } else {
        "down"
    }
}

fn token_preview(token: &str) -> String {
    match token.char_indices().nth(TOKEN_PREVIEW) {
        Some((end, _)) => format!("{}...", &token[..end]),
        None => token.to_string(),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
