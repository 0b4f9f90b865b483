use std::io::{Read, Write};

use bytes::BytesMut;

use crate::codec::FrameConfig;
use crate::error::Result;
use crate::frames::Frame;
use crate::reader::read_frame_from;
use crate::writer::{flush, write_frame_to};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Reads and writes control frames over one bidirectional stream.
///
/// Read and write buffers are kept apart, so a half-read frame does not
/// interfere with outgoing writes. Not safe for concurrent use; callers
/// serialize access.
pub struct Framer<T> {
    inner: T,
    read_buf: BytesMut,
    write_buf: BytesMut,
    config: FrameConfig,
}

impl<T> Framer<T> {
    /// Create a framer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a framer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            read_buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            write_buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the framer and return the inner stream. Buffered but
    /// undecoded input is discarded.
    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }
}

impl<T: Read> Framer<T> {
    /// Read the next complete control frame (blocking).
    ///
    /// Returns [`FrameError::EndOfStream`](crate::FrameError::EndOfStream)
    /// if the stream ends cleanly between frames.
    pub fn read_frame(&mut self) -> Result<Frame> {
        read_frame_from(&mut self.inner, &mut self.read_buf, &self.config)
    }
}

impl<T: Write> Framer<T> {
    /// Encode and write one control frame, then flush.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<usize> {
        write_frame_to(&mut self.inner, &mut self.write_buf, frame, &self.config)
    }

    pub fn flush(&mut self) -> Result<()> {
        flush(&mut self.inner)
    }
}
