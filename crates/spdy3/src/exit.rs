use std::fmt;
use std::io;

use spdy3_frame::FrameError;

// Exit code constants aligned with sysexits-style semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRUNCATED: i32 = 2;
pub const UNSUPPORTED: i32 = 4;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::Truncated { .. } => CliError::new(TRUNCATED, format!("{context}: {err}")),
        FrameError::UnsupportedFrameType(_)
        | FrameError::UnsupportedDataFrame { .. }
        | FrameError::UnsupportedVersion { .. } => {
            CliError::new(UNSUPPORTED, format!("{context}: {err}"))
        }
        FrameError::ProtocolViolation(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::LengthOverflow { .. } | FrameError::SettingIdOverflow { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        FrameError::EndOfStream => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}
