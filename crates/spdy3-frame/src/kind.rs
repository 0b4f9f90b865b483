//! Control frame type codes and the protocol constants carried in frames.
//!
//! Type codes 1-10 are defined by SPDY/3. Code 5 (NOOP in earlier drafts) is
//! unused. CREDENTIAL is recognized but has no payload codec.

use std::fmt;

/// Protocol version written into every control frame header.
pub const SPDY3: u16 = 3;

/// Control frame type carried in the low 16 bits of the header word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum FrameType {
    SynStream = 1,
    SynReply = 2,
    RstStream = 3,
    Settings = 4,
    Ping = 6,
    GoAway = 7,
    Headers = 8,
    WindowUpdate = 9,
    Credential = 10,
}

impl FrameType {
    /// Look up a type code. Returns `None` for codes outside the protocol.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::SynStream),
            2 => Some(Self::SynReply),
            3 => Some(Self::RstStream),
            4 => Some(Self::Settings),
            6 => Some(Self::Ping),
            7 => Some(Self::GoAway),
            8 => Some(Self::Headers),
            9 => Some(Self::WindowUpdate),
            10 => Some(Self::Credential),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    /// The protocol name of this frame type, e.g. `SYN_STREAM`.
    pub fn name(self) -> &'static str {
        match self {
            Self::SynStream => "SYN_STREAM",
            Self::SynReply => "SYN_REPLY",
            Self::RstStream => "RST_STREAM",
            Self::Settings => "SETTINGS",
            Self::Ping => "PING",
            Self::GoAway => "GOAWAY",
            Self::Headers => "HEADERS",
            Self::WindowUpdate => "WINDOW_UPDATE",
            Self::Credential => "CREDENTIAL",
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Frame-level flags. Meaning depends on the frame type.
pub mod flags {
    /// SYN_STREAM, SYN_REPLY, HEADERS: last frame the sender emits on this stream.
    pub const FIN: u8 = 0x01;
    /// SYN_STREAM: the recipient must not send on this stream.
    pub const UNIDIRECTIONAL: u8 = 0x02;
    /// SETTINGS: clear all previously persisted settings.
    pub const SETTINGS_CLEAR_SETTINGS: u8 = 0x01;
}

/// Per-entry flags inside a SETTINGS frame.
pub mod setting_flags {
    pub const PERSIST_VALUE: u8 = 0x01;
    pub const PERSISTED: u8 = 0x02;
}

/// SETTINGS entry identifiers.
pub mod setting_id {
    pub const UPLOAD_BANDWIDTH: u32 = 1;
    pub const DOWNLOAD_BANDWIDTH: u32 = 2;
    pub const ROUND_TRIP_TIME: u32 = 3;
    pub const MAX_CONCURRENT_STREAMS: u32 = 4;
    pub const CURRENT_CWND: u32 = 5;
    pub const DOWNLOAD_RETRANS_RATE: u32 = 6;
    pub const INITIAL_WINDOW_SIZE: u32 = 7;
    pub const CLIENT_CERTIFICATE_VECTOR_SIZE: u32 = 8;
}

/// RST_STREAM status codes.
pub mod rst_status {
    pub const PROTOCOL_ERROR: i32 = 1;
    pub const INVALID_STREAM: i32 = 2;
    pub const REFUSED_STREAM: i32 = 3;
    pub const UNSUPPORTED_VERSION: i32 = 4;
    pub const CANCEL: i32 = 5;
    pub const INTERNAL_ERROR: i32 = 6;
    pub const FLOW_CONTROL_ERROR: i32 = 7;
    pub const STREAM_IN_USE: i32 = 8;
    pub const STREAM_ALREADY_CLOSED: i32 = 9;
    pub const INVALID_CREDENTIALS: i32 = 10;
    pub const FRAME_TOO_LARGE: i32 = 11;
}

/// GOAWAY status codes.
pub mod goaway_status {
    pub const OK: u32 = 0;
    pub const PROTOCOL_ERROR: u32 = 1;
    pub const INTERNAL_ERROR: u32 = 2;
}

/// Returns a human-readable name for an RST_STREAM status code.
pub fn rst_status_name(code: i32) -> &'static str {
    match code {
        rst_status::PROTOCOL_ERROR => "PROTOCOL_ERROR",
        rst_status::INVALID_STREAM => "INVALID_STREAM",
        rst_status::REFUSED_STREAM => "REFUSED_STREAM",
        rst_status::UNSUPPORTED_VERSION => "UNSUPPORTED_VERSION",
        rst_status::CANCEL => "CANCEL",
        rst_status::INTERNAL_ERROR => "INTERNAL_ERROR",
        rst_status::FLOW_CONTROL_ERROR => "FLOW_CONTROL_ERROR",
        rst_status::STREAM_IN_USE => "STREAM_IN_USE",
        rst_status::STREAM_ALREADY_CLOSED => "STREAM_ALREADY_CLOSED",
        rst_status::INVALID_CREDENTIALS => "INVALID_CREDENTIALS",
        rst_status::FRAME_TOO_LARGE => "FRAME_TOO_LARGE",
        _ => "UNKNOWN",
    }
}

/// Returns a human-readable name for a SETTINGS entry id.
pub fn setting_name(id: u32) -> &'static str {
    match id {
        setting_id::UPLOAD_BANDWIDTH => "UPLOAD_BANDWIDTH",
        setting_id::DOWNLOAD_BANDWIDTH => "DOWNLOAD_BANDWIDTH",
        setting_id::ROUND_TRIP_TIME => "ROUND_TRIP_TIME",
        setting_id::MAX_CONCURRENT_STREAMS => "MAX_CONCURRENT_STREAMS",
        setting_id::CURRENT_CWND => "CURRENT_CWND",
        setting_id::DOWNLOAD_RETRANS_RATE => "DOWNLOAD_RETRANS_RATE",
        setting_id::INITIAL_WINDOW_SIZE => "INITIAL_WINDOW_SIZE",
        setting_id::CLIENT_CERTIFICATE_VECTOR_SIZE => "CLIENT_CERTIFICATE_VECTOR_SIZE",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_match_protocol() {
        assert_eq!(FrameType::SynStream.code(), 1);
        assert_eq!(FrameType::SynReply.code(), 2);
        assert_eq!(FrameType::RstStream.code(), 3);
        assert_eq!(FrameType::Settings.code(), 4);
        assert_eq!(FrameType::Ping.code(), 6);
        assert_eq!(FrameType::GoAway.code(), 7);
        assert_eq!(FrameType::Headers.code(), 8);
        assert_eq!(FrameType::WindowUpdate.code(), 9);
        assert_eq!(FrameType::Credential.code(), 10);
    }

    #[test]
    fn from_code_roundtrips_known_types() {
        for code in 0..=16u16 {
            match FrameType::from_code(code) {
                Some(ty) => assert_eq!(ty.code(), code),
                None => assert!(code == 0 || code == 5 || code > 10),
            }
        }
    }

    #[test]
    fn display_uses_protocol_name() {
        assert_eq!(FrameType::WindowUpdate.to_string(), "WINDOW_UPDATE");
        assert_eq!(rst_status_name(rst_status::CANCEL), "CANCEL");
        assert_eq!(setting_name(99), "UNKNOWN");
    }
}
