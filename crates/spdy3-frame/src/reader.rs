use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode_frame, frame_len_hint, FrameConfig};
use crate::error::{FrameError, Result};
use crate::frames::Frame;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete control frames from any `Read` stream.
///
/// Handles partial reads internally, so callers always get complete frames.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    exhausted: bool,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            exhausted: false,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::EndOfStream)` when the stream ends between
    /// frames and `Err(FrameError::Truncated { .. })` when it ends inside one.
    pub fn read_frame(&mut self) -> Result<Frame> {
        read_frame_from(&mut self.inner, &mut self.buf, &self.config)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    ///
    /// Bytes already read from the stream but not yet decoded are dropped.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame decoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    /// Yields frames until the stream ends. A decode error is yielded once and
    /// ends the iteration, since the stream position is unknown after it.
    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.read_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(FrameError::EndOfStream) => {
                self.exhausted = true;
                None
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}

pub(crate) fn read_frame_from<R: Read>(
    inner: &mut R,
    buf: &mut BytesMut,
    config: &FrameConfig,
) -> Result<Frame> {
    loop {
        if let Some(frame) = decode_frame(buf, config)? {
            return Ok(frame);
        }

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let read = match inner.read(&mut chunk) {
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        };

        if read == 0 {
            if buf.is_empty() {
                return Err(FrameError::EndOfStream);
            }
            return Err(FrameError::Truncated {
                needed: frame_len_hint(buf),
                available: buf.len(),
            });
        }

        buf.extend_from_slice(&chunk[..read]);
    }
}
