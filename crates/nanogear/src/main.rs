mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "nanogear", version, about = "NanoGear keyboard lighting control")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "nanogear",
            "send",
            "--area",
            "side",
            "--mode",
            "4",
            "--color",
            "#00FF00",
            "--ready-timeout",
            "3s",
        ])
        .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send subcommand");
        };
        assert_eq!(args.light.area, cmd::AreaArg::Side);
        assert_eq!(args.light.mode, 4);
        assert_eq!(args.light.brightness, 4);
        assert_eq!(args.ready_timeout, "3s");
    }

    #[test]
    fn rejects_unknown_area() {
        let err = Cli::try_parse_from(["nanogear", "encode", "--area", "top"])
            .expect_err("unknown area should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn parses_monitor_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nanogear",
            "monitor",
            "--count",
            "2",
            "--format",
            "json",
            "--vendor-id",
            "0x1234",
        ])
        .expect("monitor args should parse");
        assert_eq!(cli.format, Some(OutputFormat::Json));

        let Command::Monitor(args) = cli.command else {
            panic!("expected monitor subcommand");
        };
        assert_eq!(args.count, Some(2));
        assert_eq!(args.connect.vendor_id, 0x1234);
        assert_eq!(args.status_interval, "1s");
    }

    #[test]
    fn rejects_non_numeric_product_id() {
        let err = Cli::try_parse_from(["nanogear", "monitor", "--product-id", "keyboard"])
            .expect_err("bad id should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
