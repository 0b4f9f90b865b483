//! SPDY/3 control frame encoding and decoding.
//!
//! Every control frame starts with an 8-byte header of two big-endian words:
//! - Control bit (always 1), 15-bit version, 16-bit frame type
//! - 8-bit flags, 24-bit payload length
//!
//! The payload layout depends on the frame type. Header blocks inside
//! SYN_STREAM, SYN_REPLY and HEADERS are carried as opaque bytes; compression
//! belongs to the session layer. Data frames are rejected.

pub mod codec;
pub mod error;
pub mod framer;
pub mod frames;
pub mod kind;
pub mod nv;
pub mod reader;
pub mod word;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, frame_len_hint, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE,
};
pub use error::{FrameError, Result, Violation};
pub use framer::Framer;
pub use frames::{
    ControlFrame, Frame, GoAway, Headers, Ping, RstStream, Setting, Settings, SynReply, SynStream,
    WindowUpdate,
};
pub use kind::{
    flags, goaway_status, rst_status, rst_status_name, setting_flags, setting_id, setting_name,
    FrameType, SPDY3,
};
pub use nv::NameValueBlock;
pub use reader::FrameReader;
pub use word::{FlagLengthWord, HeaderWord, PriorityWord, StreamIdWord};
pub use writer::FrameWriter;
