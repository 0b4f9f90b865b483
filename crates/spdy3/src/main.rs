mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "spdy3", version, about = "SPDY/3 control frame inspection CLI")]
struct Cli {
    /// Output format for decoded frames.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "SPDY3_LOG_LEVEL",
        global = true
    )]
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
    use crate::cmd::EncodeFrame;

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from([
            "spdy3",
            "--format",
            "json",
            "decode",
            "capture.bin",
            "--count",
            "2",
        ])
        .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => {
                assert_eq!(args.count, Some(2));
                assert!(!args.hex);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn hex_flag_accepted_after_frame_kind() {
        let cli = Cli::try_parse_from(["spdy3", "encode", "ping", "--id", "1", "--hex"])
            .expect("encode args should parse");

        match cli.command {
            Command::Encode(args) => {
                assert!(args.hex);
                assert!(matches!(args.frame, EncodeFrame::Ping(_)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_header_args() {
        let err = Cli::try_parse_from([
            "spdy3",
            "encode",
            "headers",
            "--stream-id",
            "1",
            "--header",
            "a=b",
            "--raw-headers",
            "00000000",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_out_of_range_stream_id() {
        let err = Cli::try_parse_from([
            "spdy3",
            "encode",
            "window-update",
            "--stream-id",
            "2147483648",
            "--delta",
            "1",
        ])
        .expect_err("stream id above 31 bits should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
