use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;

use spdy3_frame::{FrameConfig, FrameError, FrameReader};
use tracing::{debug, info};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{FramePrinter, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let mut config = FrameConfig::default();
    if let Some(max) = args.max_payload_size {
        config.max_payload_size = max;
    }
    if args.count == Some(0) {
        return Err(CliError::new(USAGE, "--count must be greater than zero"));
    }

    let source = open_input(args.input.as_deref(), args.hex)?;
    let mut reader = FrameReader::with_config(source, config.clone());
    let mut printer = FramePrinter::new(format, config);

    let result = decode_frames(&mut reader, &mut printer, args.count);
    printer.finish();
    result?;

    info!(frames = printer.printed(), "decode finished");
    Ok(SUCCESS)
}

fn decode_frames<R: Read>(
    reader: &mut FrameReader<R>,
    printer: &mut FramePrinter,
    count: Option<usize>,
) -> CliResult<()> {
    loop {
        if count.is_some_and(|n| printer.printed() >= n) {
            return Ok(());
        }
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::EndOfStream) => return Ok(()),
            Err(err) => {
                let context = format!("frame #{} decode failed", printer.printed());
                return Err(frame_error(&context, err));
            }
        };
        debug!(frame_type = %frame.frame_type(), stream_id = ?frame.stream_id(), "decoded frame");
        printer.print(&frame)?;
    }
}

fn open_input(path: Option<&Path>, hex: bool) -> CliResult<Box<dyn Read>> {
    let path = path.filter(|p| p.as_os_str() != "-");
    let source: Box<dyn Read> = match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
            Box::new(file)
        }
        None => Box::new(io::stdin().lock()),
    };
    if !hex {
        return Ok(source);
    }
    let bytes = read_hex(source)?;
    Ok(Box::new(Cursor::new(bytes)))
}

fn read_hex(mut source: impl Read) -> CliResult<Vec<u8>> {
    let mut text = String::new();
    source
        .read_to_string(&mut text)
        .map_err(|err| io_error("failed reading hex input", err))?;
    parse_hex(&text)
}

/// Parse a hex dump, ignoring whitespace.
pub fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    hex::decode(&digits).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex input: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::TRUNCATED;

    fn printer() -> FramePrinter {
        FramePrinter::new(OutputFormat::Table, FrameConfig::default())
    }

    #[test]
    fn parse_hex_ignores_whitespace() {
        let bytes = parse_hex("80 03 00 06\n00 00 00 04\n\t00000001").unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[..4], &[0x80, 0x03, 0x00, 0x06]);
    }

    #[test]
    fn parse_hex_rejects_odd_digits() {
        let err = parse_hex("800").unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn decode_stops_at_count() {
        let two_pings = parse_hex("800300060000000400000001 800300060000000400000002").unwrap();
        let mut reader = FrameReader::new(Cursor::new(two_pings));
        let mut printer = printer();

        decode_frames(&mut reader, &mut printer, Some(1)).unwrap();
        assert_eq!(printer.printed(), 1);
    }

    #[test]
    fn truncated_capture_maps_to_exit_code() {
        let partial = parse_hex("80030006000000040000").unwrap();
        let mut reader = FrameReader::new(Cursor::new(partial));
        let mut printer = printer();

        let err = decode_frames(&mut reader, &mut printer, None).unwrap_err();
        assert_eq!(err.code, TRUNCATED);
        assert!(err.message.starts_with("frame #0 decode failed"));
    }
}
