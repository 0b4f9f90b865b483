use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::frames::Frame;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete control frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and write a complete frame (blocking), then flush.
    ///
    /// Returns the number of bytes written, header included.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<usize> {
        write_frame_to(&mut self.inner, &mut self.buf, frame, &self.config)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        flush(&mut self.inner)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame encoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

pub(crate) fn write_frame_to<W: Write>(
    inner: &mut W,
    buf: &mut BytesMut,
    frame: &Frame,
    config: &FrameConfig,
) -> Result<usize> {
    buf.clear();
    let written = encode_frame(frame, config, buf)?;

    let mut offset = 0usize;
    while offset < buf.len() {
        match inner.write(&buf[offset..]) {
            Ok(0) => return Err(FrameError::Io(ErrorKind::WriteZero.into())),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }

    flush(inner)?;
    Ok(written)
}

pub(crate) fn flush<W: Write>(inner: &mut W) -> Result<()> {
    loop {
        match inner.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use bytes::{Bytes, BytesMut};

    use super::*;
    use crate::codec::{decode_frame, HEADER_SIZE};
    use crate::frames::{GoAway, Headers, Ping, Setting, Settings};
    use crate::kind::{flags, setting_id};

    fn ping(id: u32) -> Frame {
        Frame::Ping(Ping { id })
    }

    fn decode_all(bytes: &[u8]) -> Vec<Frame> {
        let mut wire = BytesMut::from(bytes);
        let mut frames = Vec::new();
        while let Some(frame) = decode_frame(&mut wire, &FrameConfig::default()).unwrap() {
            frames.push(frame);
        }
        assert!(wire.is_empty());
        frames
    }

    #[test]
    fn write_single_frame() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        let written = writer.write_frame(&ping(0x6612)).unwrap();

        let bytes = writer.into_inner().into_inner();
        assert_eq!(written, 12);
        assert_eq!(
            bytes,
            vec![0x80, 0x03, 0x00, 0x06, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x66, 0x12]
        );
    }

    #[test]
    fn write_multiple_frames() {
        let settings = Frame::Settings(Settings {
            flags: flags::SETTINGS_CLEAR_SETTINGS,
            entries: vec![Setting {
                flags: 0,
                id: setting_id::INITIAL_WINDOW_SIZE,
                value: 65_536,
            }],
        });
        let goaway = Frame::GoAway(GoAway {
            last_good_stream_id: 11,
            status_code: 0,
        });
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        writer.write_frame(&ping(1)).unwrap();
        writer.write_frame(&settings).unwrap();
        writer.write_frame(&goaway).unwrap();

        let bytes = writer.into_inner().into_inner();
        assert_eq!(decode_all(&bytes), vec![ping(1), settings, goaway]);
    }

    #[test]
    fn flags_land_in_flag_length_word() {
        let headers = Frame::Headers(Headers {
            flags: flags::FIN,
            stream_id: 3,
            header_block: Bytes::from_static(b"abc"),
        });
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_frame(&headers).unwrap();

        let bytes = writer.into_inner().into_inner();
        assert_eq!(&bytes[4..8], &[0x01, 0x00, 0x00, 0x07]);
        assert_eq!(bytes.len(), HEADER_SIZE + 7);
    }

    #[test]
    fn payload_too_large_rejected() {
        let cfg = FrameConfig {
            max_payload_size: 4,
            ..FrameConfig::default()
        };
        let mut writer = FrameWriter::with_config(Cursor::new(Vec::<u8>::new()), cfg);
        let frame = Frame::GoAway(GoAway {
            last_good_stream_id: 1,
            status_code: 0,
        });

        let err = writer.write_frame(&frame).unwrap_err();
        assert!(matches!(err, FrameError::LengthOverflow { size: 8, max: 4 }));
        assert!(writer.get_ref().get_ref().is_empty());

        writer.set_max_payload_size(8);
        assert_eq!(writer.config().max_payload_size, 8);
        assert!(writer.write_frame(&frame).is_ok());
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.write_frame(&ping(1)).unwrap();

        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(writer.get_ref().data.len(), 12);
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = FrameWriter::new(cursor);

        let _ = writer.get_ref();
        let _ = writer.get_mut();
        writer.flush().unwrap();
        let _inner = writer.into_inner();
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let writer_impl = InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        };

        let mut writer = FrameWriter::new(writer_impl);
        writer.write_frame(&ping(5)).unwrap();

        let inner = writer.into_inner();
        assert_eq!(decode_all(&inner.data), vec![ping(5)]);
    }

    #[test]
    fn would_block_write_propagates_io_error() {
        let mut writer = FrameWriter::new(WouldBlockWriter);
        let err = writer.write_frame(&ping(6)).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    #[test]
    fn write_zero_is_an_io_error() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.write_frame(&ping(1)).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WriteZero));
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            // Short writes exercise the offset loop.
            let n = buf.len().min(5);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    struct WouldBlockWriter;

    impl Write for WouldBlockWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::WouldBlock))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn written_bytes_decode() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.write_frame(&ping(3)).unwrap();

        let wire = writer.into_inner().into_inner();
        let mut framed = crate::reader::FrameReader::new(Cursor::new(wire));
        assert_eq!(framed.read_frame().unwrap(), ping(3));
    }
}
