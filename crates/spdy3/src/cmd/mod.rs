use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a raw control frame capture and print each frame.
    Decode(DecodeArgs),
    /// Build a single control frame and write it to stdout.
    Encode(EncodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to read. Reads stdin when omitted or "-".
    pub input: Option<PathBuf>,
    /// Input is a hex dump (whitespace ignored) instead of raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Exit after decoding N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Reject frames whose declared payload length exceeds this many bytes.
    #[arg(long, value_name = "BYTES", env = "SPDY3_MAX_PAYLOAD_SIZE")]
    pub max_payload_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Write the frame as a hex string instead of raw bytes.
    #[arg(long, global = true)]
    pub hex: bool,

    #[command(subcommand)]
    pub frame: EncodeFrame,
}

#[derive(Subcommand, Debug)]
pub enum EncodeFrame {
    /// SYN_STREAM: open a stream.
    SynStream(SynStreamArgs),
    /// SYN_REPLY: accept a stream.
    SynReply(StreamHeadersArgs),
    /// RST_STREAM: abort a stream.
    RstStream(RstStreamArgs),
    /// SETTINGS: announce session parameters.
    Settings(SettingsArgs),
    /// PING: round-trip probe.
    Ping(PingArgs),
    /// GOAWAY: stop accepting new streams.
    Goaway(GoAwayArgs),
    /// HEADERS: extra headers for an open stream.
    Headers(StreamHeadersArgs),
    /// WINDOW_UPDATE: grant flow-control credit.
    WindowUpdate(WindowUpdateArgs),
}

#[derive(Args, Debug, Default)]
pub struct HeaderBlockArgs {
    /// Header to place in an uncompressed name/value block (repeatable).
    /// Repeating a name adds another value.
    #[arg(long = "header", short = 'H', value_name = "NAME=VALUE", conflicts_with = "raw_headers")]
    pub headers: Vec<String>,
    /// Header block bytes as hex, used verbatim (e.g. an already compressed block).
    #[arg(long, value_name = "HEX")]
    pub raw_headers: Option<String>,
}

#[derive(Args, Debug)]
pub struct SynStreamArgs {
    #[arg(long, value_parser = stream_id_parser())]
    pub stream_id: u32,
    #[arg(long, default_value = "0", value_parser = stream_id_parser())]
    pub associated_stream_id: u32,
    /// Priority, 0 (highest) to 7.
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=7))]
    pub priority: u8,
    /// Set FLAG_FIN.
    #[arg(long)]
    pub fin: bool,
    /// Set FLAG_UNIDIRECTIONAL.
    #[arg(long)]
    pub unidirectional: bool,
    #[command(flatten)]
    pub block: HeaderBlockArgs,
}

#[derive(Args, Debug)]
pub struct StreamHeadersArgs {
    #[arg(long, value_parser = stream_id_parser())]
    pub stream_id: u32,
    /// Set FLAG_FIN.
    #[arg(long)]
    pub fin: bool,
    #[command(flatten)]
    pub block: HeaderBlockArgs,
}

#[derive(Args, Debug)]
pub struct RstStreamArgs {
    #[arg(long, value_parser = stream_id_parser())]
    pub stream_id: u32,
    /// Status code, numeric or by name (e.g. CANCEL).
    #[arg(long, default_value = "CANCEL")]
    pub status: String,
}

#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Set FLAG_SETTINGS_CLEAR_SETTINGS.
    #[arg(long)]
    pub clear: bool,
    /// Entry as ID=VALUE, ID numeric or by name (repeatable).
    #[arg(long = "setting", short = 's', value_name = "ID=VALUE")]
    pub settings: Vec<String>,
    /// Mark every entry FLAG_SETTINGS_PERSIST_VALUE.
    #[arg(long)]
    pub persist: bool,
}

#[derive(Args, Debug)]
pub struct PingArgs {
    #[arg(long)]
    pub id: u32,
}

#[derive(Args, Debug)]
pub struct GoAwayArgs {
    #[arg(long, default_value = "0", value_parser = stream_id_parser())]
    pub last_good_stream_id: u32,
    /// 0 = OK, 1 = PROTOCOL_ERROR, 2 = INTERNAL_ERROR.
    #[arg(long, default_value = "0")]
    pub status: u32,
}

#[derive(Args, Debug)]
pub struct WindowUpdateArgs {
    #[arg(long, value_parser = stream_id_parser())]
    pub stream_id: u32,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=0x7FFF_FFFF))]
    pub delta: u32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn stream_id_parser() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(0..=0x7FFF_FFFF)
}
