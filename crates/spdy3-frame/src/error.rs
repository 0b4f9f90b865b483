use crate::kind::FrameType;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The stream ended cleanly before any byte of a new frame was read.
    #[error("end of stream")]
    EndOfStream,

    /// The stream (or a name/value block) ended before a declared length was satisfied.
    #[error("truncated frame ({needed} bytes needed, {available} available)")]
    Truncated { needed: usize, available: usize },

    /// The type code is unknown, or known but has no payload codec (CREDENTIAL).
    #[error("unsupported frame type {0}")]
    UnsupportedFrameType(u16),

    /// The control bit is unset; data frames are not handled by this codec.
    #[error("data frames are not supported (stream {stream_id})")]
    UnsupportedDataFrame { stream_id: u32 },

    /// The control frame carries a protocol version other than the configured one.
    #[error("unsupported protocol version {actual} (expected {expected})")]
    UnsupportedVersion { expected: u16, actual: u16 },

    /// An encoded payload does not fit the 24-bit length field or the configured maximum.
    #[error("payload too large to encode ({size} bytes, max {max})")]
    LengthOverflow { size: usize, max: usize },

    /// A SETTINGS entry id does not fit the 24-bit id field.
    #[error("setting id {id:#x} does not fit in 24 bits")]
    SettingIdOverflow { id: u32 },

    /// The bytes are well-formed words but break a protocol rule.
    #[error("protocol violation: {0}")]
    ProtocolViolation(#[from] Violation),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Protocol rules a received frame can break.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("zero-length header name")]
    EmptyHeaderName,

    #[error("duplicate header name {0:?}")]
    DuplicateHeaderName(String),

    #[error("illegal NUL placement in value of header {0:?}")]
    InvalidHeaderValue(String),

    #[error("declared payload length {size} exceeds maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("{frame_type} payload too short ({needed} bytes needed, {available} available)")]
    ShortPayload {
        frame_type: FrameType,
        needed: usize,
        available: usize,
    },

    #[error("{frame_type} payload has {extra} trailing bytes")]
    TrailingBytes { frame_type: FrameType, extra: usize },

    #[error("name/value block followed by {0} trailing bytes")]
    TrailingBlockBytes(usize),
}

pub type Result<T> = std::result::Result<T, FrameError>;
