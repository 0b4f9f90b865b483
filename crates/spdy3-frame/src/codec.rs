use bytes::{Buf, BufMut, BytesMut};
use tracing::{debug, trace};

use crate::error::{FrameError, Result, Violation};
use crate::frames::Frame;
use crate::kind::SPDY3;
use crate::word::{FlagLengthWord, HeaderWord, MAX_LENGTH, WORD_SIZE};

/// Control frame header: header word (4) + flags/length word (4) = 8 bytes.
pub const HEADER_SIZE: usize = 2 * WORD_SIZE;

/// Default maximum payload size: the full 24-bit length range.
pub const DEFAULT_MAX_PAYLOAD: usize = MAX_LENGTH as usize;

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Protocol version written on encode and required on decode. Default: 3.
    pub version: u16,
    /// Maximum payload size in bytes. Default: 16,777,215.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            version: SPDY3,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// Encode a control frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───┬──────────────┬──────────────┐
/// │ 1 │ Version (15) │ Type (16)    │
/// ├───┴────────┬─────┴──────────────┤
/// │ Flags (8)  │ Length (24)        │
/// ├────────────┴────────────────────┤
/// │ Payload (Length bytes)          │
/// └─────────────────────────────────┘
/// ```
///
/// Returns the number of bytes appended. On error `dst` is left as it was.
pub fn encode_frame(frame: &Frame, config: &FrameConfig, dst: &mut BytesMut) -> Result<usize> {
    frame.check_encodable()?;

    let start = dst.len();
    dst.put_bytes(0, HEADER_SIZE);
    frame.encode_payload(dst);

    let length = dst.len() - start - HEADER_SIZE;
    let checked = if length > config.max_payload_size {
        Err(FrameError::LengthOverflow {
            size: length,
            max: config.max_payload_size,
        })
    } else {
        FlagLengthWord::try_new(frame.flags(), length)
    };
    let flag_length = match checked {
        Ok(word) => word,
        Err(err) => {
            dst.truncate(start);
            return Err(err);
        }
    };

    let mut header = &mut dst[start..start + HEADER_SIZE];
    HeaderWord::control(config.version, frame.frame_type()).write_to(&mut header);
    flag_length.write_to(&mut header);

    trace!(
        frame_type = %frame.frame_type(),
        flags = flag_length.flags(),
        length,
        "encoded control frame"
    );
    Ok(HEADER_SIZE + length)
}

/// Decode a control frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. On error the buffer
/// is left untouched; no attempt is made to find the next frame boundary.
pub fn decode_frame(src: &mut BytesMut, config: &FrameConfig) -> Result<Option<Frame>> {
    if src.len() < WORD_SIZE {
        return Ok(None); // Need more data
    }

    let mut peek = &src[..];
    let header = HeaderWord::from_raw(peek.get_u32());
    if !header.is_control() {
        debug!(stream_id = header.data_stream_id(), "rejecting data frame");
        return Err(FrameError::UnsupportedDataFrame {
            stream_id: header.data_stream_id(),
        });
    }
    if header.version() != config.version {
        debug!(version = header.version(), "rejecting control frame version");
        return Err(FrameError::UnsupportedVersion {
            expected: config.version,
            actual: header.version(),
        });
    }

    if peek.len() < WORD_SIZE {
        return Ok(None); // Need more data
    }
    let flag_length = FlagLengthWord::from_raw(peek.get_u32());
    let payload_len = flag_length.length() as usize;

    if payload_len > config.max_payload_size {
        return Err(Violation::PayloadTooLarge {
            size: payload_len,
            max: config.max_payload_size,
        }
        .into());
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    trace!(
        type_code = header.type_code(),
        flags = flag_length.flags(),
        length = payload_len,
        "decoding control frame"
    );

    // Payload and header blocks share the frame's allocation.
    let frame_bytes = src.split_to(total).freeze();
    match Frame::decode_payload(
        header.type_code(),
        flag_length.flags(),
        frame_bytes.slice(HEADER_SIZE..),
    ) {
        Ok(frame) => Ok(Some(frame)),
        Err(err) => {
            debug!(type_code = header.type_code(), %err, "rejecting control frame");
            restore_front(src, &frame_bytes);
            Err(err)
        }
    }
}

fn restore_front(src: &mut BytesMut, front: &[u8]) {
    let mut restored = BytesMut::with_capacity(front.len() + src.len());
    restored.put_slice(front);
    restored.put_slice(&src[..]);
    *src = restored;
}

/// Total size of the frame at the front of `src`, or of its header while the
/// length word is still missing.
pub fn frame_len_hint(src: &[u8]) -> usize {
    if src.len() < HEADER_SIZE {
        return HEADER_SIZE;
    }
    let mut peek = &src[WORD_SIZE..];
    HEADER_SIZE + FlagLengthWord::from_raw(peek.get_u32()).length() as usize
}
