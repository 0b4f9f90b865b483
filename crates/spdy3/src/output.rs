use std::io::{IsTerminal, Write};

use bytes::BytesMut;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::{json, Map, Value};
use spdy3_frame::{
    encode_frame, rst_status_name, setting_name, Frame, FrameConfig, NameValueBlock,
};

use crate::exit::{frame_error, io_error, CliResult};

#[derive(Clone, Debug, Copy, ValueEnum)]
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

#[derive(Serialize)]
struct FrameOutput {
    index: usize,
    #[serde(rename = "type")]
    frame_type: &'static str,
    type_code: u16,
    flags: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_id: Option<u32>,
    length: usize,
    #[serde(flatten)]
    details: Map<String, Value>,
}

impl FrameOutput {
    fn new(index: usize, frame: &Frame) -> Self {
        let mut payload = BytesMut::new();
        frame.encode_payload(&mut payload);
        Self {
            index,
            frame_type: frame.frame_type().name(),
            type_code: frame.frame_type().code(),
            flags: frame.flags(),
            stream_id: frame.stream_id(),
            length: payload.len(),
            details: frame_details(frame),
        }
    }
}

/// Prints decoded frames in the selected format. Table rows are collected
/// and printed together by [`FramePrinter::finish`].
pub struct FramePrinter {
    format: OutputFormat,
    config: FrameConfig,
    printed: usize,
    rows: Vec<FrameOutput>,
}

impl FramePrinter {
    pub fn new(format: OutputFormat, config: FrameConfig) -> Self {
        Self {
            format,
            config,
            printed: 0,
            rows: Vec::new(),
        }
    }

    pub fn printed(&self) -> usize {
        self.printed
    }

    pub fn print(&mut self, frame: &Frame) -> CliResult<()> {
        let out = FrameOutput::new(self.printed, frame);
        self.printed += 1;

        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Table => self.rows.push(out),
            OutputFormat::Pretty => {
                let stream = out
                    .stream_id
                    .map(|id| format!(" stream={id}"))
                    .unwrap_or_default();
                println!(
                    "#{} {} flags=0x{:02x}{} length={} {}",
                    out.index,
                    out.frame_type,
                    out.flags,
                    stream,
                    out.length,
                    render_details(&out.details)
                );
            }
            OutputFormat::Raw => {
                let mut wire = BytesMut::new();
                encode_frame(frame, &self.config, &mut wire)
                    .map_err(|err| frame_error("re-encode failed", err))?;
                write_stdout(&wire)?;
            }
        }
        Ok(())
    }

    /// Flush any collected table rows.
    pub fn finish(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["#", "TYPE", "FLAGS", "STREAM", "LENGTH", "DETAILS"]);
        for row in self.rows.drain(..) {
            table.add_row(vec![
                row.index.to_string(),
                row.frame_type.to_string(),
                format!("0x{:02x}", row.flags),
                row.stream_id.map(|id| id.to_string()).unwrap_or_default(),
                row.length.to_string(),
                render_details(&row.details),
            ]);
        }
        println!("{table}");
    }
}

pub fn write_stdout(data: &[u8]) -> CliResult<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(data)
        .and_then(|()| out.flush())
        .map_err(|err| io_error("failed writing stdout", err))
}

fn frame_details(frame: &Frame) -> Map<String, Value> {
    let mut details = Map::new();
    match frame {
        Frame::SynStream(syn) => {
            details.insert("associated_stream_id".into(), json!(syn.associated_stream_id));
            details.insert("priority".into(), json!(syn.priority));
            details.insert("fin".into(), json!(syn.is_fin()));
            details.insert("unidirectional".into(), json!(syn.is_unidirectional()));
            details.insert("header_block".into(), header_block_details(&syn.header_block));
        }
        Frame::SynReply(reply) => {
            details.insert("fin".into(), json!(reply.is_fin()));
            details.insert("header_block".into(), header_block_details(&reply.header_block));
        }
        Frame::Headers(headers) => {
            details.insert("fin".into(), json!(headers.is_fin()));
            details.insert("header_block".into(), header_block_details(&headers.header_block));
        }
        Frame::RstStream(rst) => {
            details.insert("status_code".into(), json!(rst.status_code));
            details.insert("status".into(), json!(rst_status_name(rst.status_code)));
        }
        Frame::Settings(settings) => {
            let entries: Vec<Value> = settings
                .entries
                .iter()
                .map(|entry| {
                    json!({
                        "id": entry.id,
                        "name": setting_name(entry.id),
                        "flags": entry.flags,
                        "value": entry.value,
                    })
                })
                .collect();
            details.insert("clear_settings".into(), json!(settings.clears_settings()));
            details.insert("entries".into(), Value::Array(entries));
        }
        Frame::Ping(ping) => {
            details.insert("id".into(), json!(ping.id));
        }
        Frame::GoAway(goaway) => {
            details.insert("last_good_stream_id".into(), json!(goaway.last_good_stream_id));
            details.insert("status_code".into(), json!(goaway.status_code));
        }
        Frame::WindowUpdate(update) => {
            details.insert("delta_window_size".into(), json!(update.delta_window_size));
        }
    }
    details
}

/// Header blocks are normally compressed. When one parses as a plain
/// name/value block its headers are shown, otherwise its bytes as hex.
fn header_block_details(block: &[u8]) -> Value {
    let parsed = if block.is_empty() {
        None
    } else {
        NameValueBlock::from_bytes(block).ok()
    };

    match parsed {
        Some(nv) => {
            let headers: Map<String, Value> = nv
                .iter()
                .map(|(name, _)| {
                    let mut values: Vec<Value> = nv
                        .values(name)
                        .map(|v| Value::String(String::from_utf8_lossy(v).into_owned()))
                        .collect();
                    let value = match values.len() {
                        0 => Value::String(String::new()),
                        1 => values.remove(0),
                        _ => Value::Array(values),
                    };
                    (String::from_utf8_lossy(name).into_owned(), value)
                })
                .collect();
            json!({ "length": block.len(), "headers": headers })
        }
        None => json!({ "length": block.len(), "hex": hex::encode(block) }),
    }
}

fn render_details(details: &Map<String, Value>) -> String {
    details
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}={text}"),
            other => format!("{key}={other}"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
