use bytes::{Bytes, BytesMut};
use spdy3_frame::{
    encode_frame, flags, rst_status_name, setting_flags, setting_name, Frame, FrameConfig, GoAway,
    Headers, NameValueBlock, Ping, RstStream, Setting, Settings, SynReply, SynStream,
    WindowUpdate,
};
use tracing::debug;

use crate::cmd::decode::parse_hex;
use crate::cmd::{EncodeArgs, EncodeFrame, HeaderBlockArgs, SettingsArgs, StreamHeadersArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS};
use crate::output::write_stdout;

const MAX_SETTING_ID: u32 = 0x00FF_FFFF;

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let frame = build_frame(args.frame)?;

    let mut wire = BytesMut::new();
    let written = encode_frame(&frame, &FrameConfig::default(), &mut wire)
        .map_err(|err| frame_error("encode failed", err))?;
    debug!(frame_type = %frame.frame_type(), bytes = written, "encoded frame");

    if args.hex {
        let mut line = hex::encode(&wire);
        line.push('\n');
        write_stdout(line.as_bytes())?;
    } else {
        write_stdout(&wire)?;
    }
    Ok(SUCCESS)
}

fn build_frame(frame: EncodeFrame) -> CliResult<Frame> {
    let frame = match frame {
        EncodeFrame::SynStream(args) => {
            let mut frame_flags = 0;
            if args.fin {
                frame_flags |= flags::FIN;
            }
            if args.unidirectional {
                frame_flags |= flags::UNIDIRECTIONAL;
            }
            Frame::SynStream(SynStream {
                flags: frame_flags,
                stream_id: args.stream_id,
                associated_stream_id: args.associated_stream_id,
                priority: args.priority,
                header_block: header_block(&args.block)?,
            })
        }
        EncodeFrame::SynReply(args) => {
            let (frame_flags, stream_id, header_block) = stream_headers(&args)?;
            Frame::SynReply(SynReply {
                flags: frame_flags,
                stream_id,
                header_block,
            })
        }
        EncodeFrame::Headers(args) => {
            let (frame_flags, stream_id, header_block) = stream_headers(&args)?;
            Frame::Headers(Headers {
                flags: frame_flags,
                stream_id,
                header_block,
            })
        }
        EncodeFrame::RstStream(args) => Frame::RstStream(RstStream {
            stream_id: args.stream_id,
            status_code: parse_rst_status(&args.status)?,
        }),
        EncodeFrame::Settings(args) => Frame::Settings(settings(&args)?),
        EncodeFrame::Ping(args) => Frame::Ping(Ping { id: args.id }),
        EncodeFrame::Goaway(args) => Frame::GoAway(GoAway {
            last_good_stream_id: args.last_good_stream_id,
            status_code: args.status,
        }),
        EncodeFrame::WindowUpdate(args) => Frame::WindowUpdate(WindowUpdate {
            stream_id: args.stream_id,
            delta_window_size: args.delta,
        }),
    };
    Ok(frame)
}

fn stream_headers(args: &StreamHeadersArgs) -> CliResult<(u8, u32, Bytes)> {
    let frame_flags = if args.fin { flags::FIN } else { 0 };
    Ok((frame_flags, args.stream_id, header_block(&args.block)?))
}

fn header_block(args: &HeaderBlockArgs) -> CliResult<Bytes> {
    if let Some(raw) = &args.raw_headers {
        return Ok(Bytes::from(parse_hex(raw)?));
    }

    let mut block = NameValueBlock::new();
    for header in &args.headers {
        let (name, value) = header
            .split_once('=')
            .ok_or_else(|| CliError::usage(format!("--header expects NAME=VALUE, got {header:?}")))?;
        block
            .append(name.to_string(), value)
            .map_err(|err| frame_error(&format!("invalid header {name:?}"), err))?;
    }
    Ok(block.to_bytes())
}

fn settings(args: &SettingsArgs) -> CliResult<Settings> {
    let entry_flags = if args.persist {
        setting_flags::PERSIST_VALUE
    } else {
        0
    };
    let entries = args
        .settings
        .iter()
        .map(|entry| -> CliResult<Setting> {
            let (id, value) = entry.split_once('=').ok_or_else(|| {
                CliError::usage(format!("--setting expects ID=VALUE, got {entry:?}"))
            })?;
            let value = value
                .parse::<i32>()
                .map_err(|err| CliError::usage(format!("invalid setting value {value:?}: {err}")))?;
            Ok(Setting {
                flags: entry_flags,
                id: parse_setting_id(id)?,
                value,
            })
        })
        .collect::<CliResult<Vec<_>>>()?;

    Ok(Settings {
        flags: if args.clear {
            flags::SETTINGS_CLEAR_SETTINGS
        } else {
            0
        },
        entries,
    })
}

fn parse_rst_status(input: &str) -> CliResult<i32> {
    if let Ok(code) = input.parse::<i32>() {
        return Ok(code);
    }
    (1..=11)
        .find(|code| rst_status_name(*code).eq_ignore_ascii_case(input))
        .ok_or_else(|| CliError::usage(format!("unknown RST_STREAM status {input:?}")))
}

fn parse_setting_id(input: &str) -> CliResult<u32> {
    let id = match input.parse::<u32>() {
        Ok(id) => id,
        Err(_) => (1..=8)
            .find(|id| setting_name(*id).eq_ignore_ascii_case(input))
            .ok_or_else(|| CliError::usage(format!("unknown setting {input:?}")))?,
    };
    if id > MAX_SETTING_ID {
        return Err(CliError::usage(format!(
            "setting id {id} does not fit in 24 bits"
        )));
    }
    Ok(id)
}
