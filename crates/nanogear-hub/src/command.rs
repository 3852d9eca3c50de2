//! Lighting command packets.
//!
//! A command is a 9-byte packet:
//! ```text
//! [kind][mode][speed][brightness][options][R][G][B][checksum]
//! ```
//! carried at bytes 1..10 of a zero-filled 65-byte feature report (byte 0 is
//! the report id).

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Length of the command packet, checksum included.
pub const PACKET_LEN: usize = 9;

/// Length of the feature report that carries a packet.
pub const REPORT_LEN: usize = 65;

/// Highest brightness and speed level the firmware accepts.
pub const MAX_LEVEL: u8 = 4;

/// Option flags byte sent with every command.
const OPTION_FLAGS: u8 = 0x07;

/// Errors raised while building a command, before any bytes are produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("mode {index} does not exist for the {area} lights")]
    UnknownMode { area: LightArea, index: u8 },

    #[error("{field} {value} is out of range (0..={max})")]
    LevelOutOfRange {
        field: &'static str,
        value: u8,
        max: u8,
    },

    #[error("invalid color {0:?}: expected RRGGBB")]
    InvalidColor(String),
}

/// A named entry of a mode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LightMode {
    pub index: u8,
    pub name: &'static str,
}

const fn mode(index: u8, name: &'static str) -> LightMode {
    LightMode { index, name }
}

/// Effects of the main (key) lights. Indices are sparse.
pub const MAIN_LIGHT_MODES: &[LightMode] = &[
    mode(0, "Off"),
    mode(1, "Static"),
    mode(2, "Breath"),
    mode(3, "Neon"),
    mode(4, "Wave"),
    mode(5, "Ripple"),
    mode(6, "Raindrop"),
    mode(7, "Snake"),
    mode(8, "Press"),
    mode(9, "Converge"),
    mode(10, "Sine"),
    mode(11, "Kaleido"),
    mode(12, "Starry"),
    mode(13, "UserPic"),
    mode(16, "Dazzle"),
    mode(17, "Rain"),
    mode(18, "Meteor"),
    mode(25, "Custom color"),
];

/// Effects of the side light strip.
pub const SIDE_LIGHT_MODES: &[LightMode] = &[
    mode(0, "Off"),
    mode(1, "Static"),
    mode(2, "Breath"),
    mode(3, "Neon"),
    mode(4, "Wave"),
    mode(5, "Snake"),
    mode(6, "Rhythm"),
];

/// Which light zone a command addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LightArea {
    #[default]
    Main,
    Side,
}

impl LightArea {
    /// Packet kind byte.
    pub fn kind(self) -> u8 {
        match self {
            LightArea::Main => 0x07,
            LightArea::Side => 0x08,
        }
    }

    pub fn modes(self) -> &'static [LightMode] {
        match self {
            LightArea::Main => MAIN_LIGHT_MODES,
            LightArea::Side => SIDE_LIGHT_MODES,
        }
    }

    /// Look up `index` in this area's mode table.
    pub fn mode(self, index: u8) -> Option<&'static LightMode> {
        self.modes().iter().find(|mode| mode.index == index)
    }

    /// Speed byte as the firmware expects it. The main lights count down.
    fn speed_byte(self, speed: u8) -> u8 {
        match self {
            LightArea::Main => MAX_LEVEL - speed,
            LightArea::Side => speed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LightArea::Main => "main",
            LightArea::Side => "side",
        }
    }
}

impl fmt::Display for LightArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Color preselected for new commands.
pub const DEFAULT_COLOR: Rgb = Rgb::new(0, 210, 255);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        DEFAULT_COLOR
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ValidationError;

    /// Accepts `RRGGBB` or `#RRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).map_err(|_| invalid());
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Parameters of one lighting command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandRequest {
    pub area: LightArea,
    pub mode: u8,
    /// 0..=4.
    pub brightness: u8,
    /// 0..=4, slow to fast.
    pub speed: u8,
    pub color: Rgb,
}

impl Default for CommandRequest {
    fn default() -> Self {
        Self {
            area: LightArea::Main,
            mode: 1,
            brightness: MAX_LEVEL,
            speed: 3,
            color: DEFAULT_COLOR,
        }
    }
}

/// Checksum byte for a packet prefix: the packet bytes sum to 255 mod 256.
pub fn checksum(prefix: &[u8]) -> u8 {
    let sum = prefix.iter().fold(0u8, |acc, byte| acc.wrapping_add(*byte));
    0xFFu8.wrapping_sub(sum)
}

/// A validated 9-byte command packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandPacket([u8; PACKET_LEN]);

impl CommandPacket {
    /// Validate `request` and lay out its packet.
    pub fn build(request: &CommandRequest) -> Result<Self, ValidationError> {
        check_level("brightness", request.brightness)?;
        check_level("speed", request.speed)?;
        if request.area.mode(request.mode).is_none() {
            return Err(ValidationError::UnknownMode {
                area: request.area,
                index: request.mode,
            });
        }

        let mut bytes = [
            request.area.kind(),
            request.mode,
            request.area.speed_byte(request.speed),
            request.brightness,
            OPTION_FLAGS,
            request.color.r,
            request.color.g,
            request.color.b,
            0,
        ];
        bytes[PACKET_LEN - 1] = checksum(&bytes[..PACKET_LEN - 1]);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.0
    }

    pub fn checksum(&self) -> u8 {
        self.0[PACKET_LEN - 1]
    }

    /// True if the checksum byte matches the prefix.
    pub fn is_valid(&self) -> bool {
        checksum(&self.0[..PACKET_LEN - 1]) == self.checksum()
    }

    /// The 65-byte feature report carrying this packet.
    pub fn feature_report(&self) -> [u8; REPORT_LEN] {
        let mut report = [0u8; REPORT_LEN];
        report[1..=PACKET_LEN].copy_from_slice(&self.0);
        report
    }

    /// Upper-case hex, space separated: `"07 19 01 ..."`.
    pub fn hex_trace(&self) -> String {
        hex_upper(&self.0)
    }
}

/// Upper-case hex bytes separated by single spaces.
pub fn hex_upper(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Everything produced from one request.
#[derive(Debug, Clone)]
pub struct EncodedCommand {
    pub packet: CommandPacket,
    pub report: [u8; REPORT_LEN],
    pub trace: String,
    pub mode: &'static LightMode,
}

/// Validate `request` and produce packet, report and trace.
pub fn build_command(request: &CommandRequest) -> Result<EncodedCommand, ValidationError> {
    let packet = CommandPacket::build(request)?;
    let mode = request
        .area
        .mode(request.mode)
        .ok_or(ValidationError::UnknownMode {
            area: request.area,
            index: request.mode,
        })?;
    Ok(EncodedCommand {
        report: packet.feature_report(),
        trace: packet.hex_trace(),
        packet,
        mode,
    })
}

fn check_level(field: &'static str, value: u8) -> Result<(), ValidationError> {
    if value > MAX_LEVEL {
        return Err(ValidationError::LevelOutOfRange {
            field,
            value,
            max: MAX_LEVEL,
        });
    }
    Ok(())
}
