//! Control frame payloads.
//!
//! Each payload type knows its fixed prefix and optional tail. Decoders get the
//! payload with the 8-byte frame header already stripped; the dispatcher in
//! [`Frame::decode_payload`] checks that the decoder consumed all of it.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result, Violation};
use crate::kind::{flags, FrameType};
use crate::word::{FlagLengthWord, PriorityWord, StreamIdWord, MAX_LENGTH, WORD_SIZE};

/// A control frame payload with a fixed type code.
pub trait ControlFrame: Sized {
    const FRAME_TYPE: FrameType;

    /// Flags written into the flag/length word.
    fn flags(&self) -> u8 {
        0
    }

    /// Decode from a payload, leaving any bytes past this frame's layout unread.
    fn decode(flags: u8, payload: &mut Bytes) -> Result<Self>;

    /// Append the payload (without the frame header).
    fn encode(&self, dst: &mut BytesMut);
}

fn need(payload: &Bytes, frame_type: FrameType, needed: usize) -> Result<()> {
    if payload.remaining() < needed {
        return Err(Violation::ShortPayload {
            frame_type,
            needed,
            available: payload.remaining(),
        }
        .into());
    }
    Ok(())
}

fn read_stream_id(payload: &mut Bytes) -> u32 {
    StreamIdWord::from_raw(payload.get_u32()).stream_id()
}

fn take_rest(payload: &mut Bytes) -> Bytes {
    payload.split_to(payload.len())
}

/// ```text
/// |X|           Stream-ID (31bits)     |
/// |X| Associated-To-Stream-ID (31bits) |
/// | Pri|Unused | Slot |                |
/// | Compressed name/value block ...    |
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynStream {
    pub flags: u8,
    pub stream_id: u32,
    /// Zero when the stream has no parent.
    pub associated_stream_id: u32,
    /// 0 is highest, 7 lowest.
    pub priority: u8,
    /// Compressed name/value block, passed through untouched.
    pub header_block: Bytes,
}

impl SynStream {
    pub fn is_fin(&self) -> bool {
        self.flags & flags::FIN != 0
    }

    pub fn is_unidirectional(&self) -> bool {
        self.flags & flags::UNIDIRECTIONAL != 0
    }
}

impl ControlFrame for SynStream {
    const FRAME_TYPE: FrameType = FrameType::SynStream;

    fn flags(&self) -> u8 {
        self.flags
    }

    fn decode(flags: u8, payload: &mut Bytes) -> Result<Self> {
        need(payload, Self::FRAME_TYPE, 3 * WORD_SIZE)?;
        let stream_id = read_stream_id(payload);
        let associated_stream_id = read_stream_id(payload);
        let priority = PriorityWord::from_raw(payload.get_u32()).priority();
        Ok(Self {
            flags,
            stream_id,
            associated_stream_id,
            priority,
            header_block: take_rest(payload),
        })
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(3 * WORD_SIZE + self.header_block.len());
        StreamIdWord::new(self.stream_id).write_to(dst);
        StreamIdWord::new(self.associated_stream_id).write_to(dst);
        PriorityWord::new(self.priority).write_to(dst);
        dst.put_slice(&self.header_block);
    }
}

/// ```text
/// |X|           Stream-ID (31bits)     |
/// | Compressed name/value block ...    |
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynReply {
    pub flags: u8,
    pub stream_id: u32,
    pub header_block: Bytes,
}

impl SynReply {
    pub fn is_fin(&self) -> bool {
        self.flags & flags::FIN != 0
    }
}

impl ControlFrame for SynReply {
    const FRAME_TYPE: FrameType = FrameType::SynReply;

    fn flags(&self) -> u8 {
        self.flags
    }

    fn decode(flags: u8, payload: &mut Bytes) -> Result<Self> {
        need(payload, Self::FRAME_TYPE, WORD_SIZE)?;
        let stream_id = read_stream_id(payload);
        Ok(Self {
            flags,
            stream_id,
            header_block: take_rest(payload),
        })
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(WORD_SIZE + self.header_block.len());
        StreamIdWord::new(self.stream_id).write_to(dst);
        dst.put_slice(&self.header_block);
    }
}

/// ```text
/// |X|          Stream-ID (31bits)    |
/// |          Status code             |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RstStream {
    pub stream_id: u32,
    /// One of [`crate::kind::rst_status`].
    pub status_code: i32,
}

impl ControlFrame for RstStream {
    const FRAME_TYPE: FrameType = FrameType::RstStream;

    fn decode(_flags: u8, payload: &mut Bytes) -> Result<Self> {
        need(payload, Self::FRAME_TYPE, 2 * WORD_SIZE)?;
        Ok(Self {
            stream_id: read_stream_id(payload),
            status_code: payload.get_i32(),
        })
    }

    fn encode(&self, dst: &mut BytesMut) {
        StreamIdWord::new(self.stream_id).write_to(dst);
        dst.put_i32(self.status_code);
    }
}

/// One SETTINGS entry. The id is 24 bits wide on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    /// One of [`crate::kind::setting_flags`].
    pub flags: u8,
    /// One of [`crate::kind::setting_id`]. Must fit in 24 bits to encode.
    pub id: u32,
    pub value: i32,
}

const SETTING_SIZE: usize = 2 * WORD_SIZE;

/// ```text
/// |         Number of entries        |
/// | Flags(8) |      ID (24 bits)     |  <+
/// |          Value (32 bits)         |  <+ repeats
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub flags: u8,
    pub entries: Vec<Setting>,
}

impl Settings {
    pub fn clears_settings(&self) -> bool {
        self.flags & flags::SETTINGS_CLEAR_SETTINGS != 0
    }

    /// Fails on the first entry whose id would be truncated by the 24-bit field.
    pub fn check_ids(&self) -> Result<()> {
        match self.entries.iter().find(|entry| entry.id > MAX_LENGTH) {
            Some(entry) => Err(FrameError::SettingIdOverflow { id: entry.id }),
            None => Ok(()),
        }
    }

    /// Value of the entry with `id`, if present.
    pub fn get(&self, id: u32) -> Option<i32> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.value)
    }
}

impl ControlFrame for Settings {
    const FRAME_TYPE: FrameType = FrameType::Settings;

    fn flags(&self) -> u8 {
        self.flags
    }

    fn decode(flags: u8, payload: &mut Bytes) -> Result<Self> {
        need(payload, Self::FRAME_TYPE, WORD_SIZE)?;
        let count = payload.get_u32() as usize;
        let needed = count.saturating_mul(SETTING_SIZE);
        if payload.remaining() < needed {
            return Err(short_settings(needed, payload.remaining()));
        }

        let entries = (0..count)
            .map(|_| {
                let word = FlagLengthWord::from_raw(payload.get_u32());
                Setting {
                    flags: word.flags(),
                    id: word.length(),
                    value: payload.get_i32(),
                }
            })
            .collect();

        Ok(Self { flags, entries })
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(WORD_SIZE + self.entries.len() * SETTING_SIZE);
        dst.put_u32(self.entries.len() as u32);
        for entry in &self.entries {
            FlagLengthWord::new(entry.flags, entry.id).write_to(dst);
            dst.put_i32(entry.value);
        }
    }
}

// Report the whole payload size, count word included.
fn short_settings(needed: usize, available: usize) -> FrameError {
    Violation::ShortPayload {
        frame_type: FrameType::Settings,
        needed: needed.saturating_add(WORD_SIZE),
        available: available + WORD_SIZE,
    }
    .into()
}

/// ```text
/// |            32-bit ID             |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ping {
    pub id: u32,
}

impl ControlFrame for Ping {
    const FRAME_TYPE: FrameType = FrameType::Ping;

    fn decode(_flags: u8, payload: &mut Bytes) -> Result<Self> {
        need(payload, Self::FRAME_TYPE, WORD_SIZE)?;
        Ok(Self {
            id: payload.get_u32(),
        })
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u32(self.id);
    }
}

/// ```text
/// |X|  Last-good-stream-ID (31 bits) |
/// |          Status code             |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoAway {
    pub last_good_stream_id: u32,
    /// One of [`crate::kind::goaway_status`].
    pub status_code: u32,
}

impl ControlFrame for GoAway {
    const FRAME_TYPE: FrameType = FrameType::GoAway;

    fn decode(_flags: u8, payload: &mut Bytes) -> Result<Self> {
        need(payload, Self::FRAME_TYPE, 2 * WORD_SIZE)?;
        Ok(Self {
            last_good_stream_id: read_stream_id(payload),
            status_code: payload.get_u32(),
        })
    }

    fn encode(&self, dst: &mut BytesMut) {
        StreamIdWord::new(self.last_good_stream_id).write_to(dst);
        dst.put_u32(self.status_code);
    }
}

/// ```text
/// |X|          Stream-ID (31bits)      |
/// | Compressed name/value block ...    |
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headers {
    pub flags: u8,
    pub stream_id: u32,
    pub header_block: Bytes,
}

impl Headers {
    pub fn is_fin(&self) -> bool {
        self.flags & flags::FIN != 0
    }
}

impl ControlFrame for Headers {
    const FRAME_TYPE: FrameType = FrameType::Headers;

    fn flags(&self) -> u8 {
        self.flags
    }

    fn decode(flags: u8, payload: &mut Bytes) -> Result<Self> {
        need(payload, Self::FRAME_TYPE, WORD_SIZE)?;
        let stream_id = read_stream_id(payload);
        Ok(Self {
            flags,
            stream_id,
            header_block: take_rest(payload),
        })
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(WORD_SIZE + self.header_block.len());
        StreamIdWord::new(self.stream_id).write_to(dst);
        dst.put_slice(&self.header_block);
    }
}

/// ```text
/// |X|     Stream-ID (31-bits)        |
/// |X|  Delta-Window-Size (31-bits)   |
/// ```
///
/// The delta is unsigned on the wire; whether a session treats it as a
/// signed adjustment is up to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowUpdate {
    pub stream_id: u32,
    pub delta_window_size: u32,
}

impl ControlFrame for WindowUpdate {
    const FRAME_TYPE: FrameType = FrameType::WindowUpdate;

    fn decode(_flags: u8, payload: &mut Bytes) -> Result<Self> {
        need(payload, Self::FRAME_TYPE, 2 * WORD_SIZE)?;
        Ok(Self {
            stream_id: read_stream_id(payload),
            delta_window_size: read_stream_id(payload),
        })
    }

    fn encode(&self, dst: &mut BytesMut) {
        StreamIdWord::new(self.stream_id).write_to(dst);
        StreamIdWord::new(self.delta_window_size).write_to(dst);
    }
}

/// A decoded control frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    SynStream(SynStream),
    SynReply(SynReply),
    RstStream(RstStream),
    Settings(Settings),
    Ping(Ping),
    GoAway(GoAway),
    Headers(Headers),
    WindowUpdate(WindowUpdate),
}

type DecodeFn = fn(u8, &mut Bytes) -> Result<Frame>;

fn decode_as<F>(flags: u8, payload: &mut Bytes) -> Result<Frame>
where
    F: ControlFrame + Into<Frame>,
{
    F::decode(flags, payload).map(Into::into)
}

// CREDENTIAL has no entry: it is a known type without a payload codec.
const DECODERS: [(FrameType, DecodeFn); 8] = [
    (FrameType::SynStream, decode_as::<SynStream>),
    (FrameType::SynReply, decode_as::<SynReply>),
    (FrameType::RstStream, decode_as::<RstStream>),
    (FrameType::Settings, decode_as::<Settings>),
    (FrameType::Ping, decode_as::<Ping>),
    (FrameType::GoAway, decode_as::<GoAway>),
    (FrameType::Headers, decode_as::<Headers>),
    (FrameType::WindowUpdate, decode_as::<WindowUpdate>),
];

fn decoder_for(frame_type: FrameType) -> Option<DecodeFn> {
    DECODERS
        .iter()
        .find(|(ty, _)| *ty == frame_type)
        .map(|(_, decode)| *decode)
}

impl Frame {
    /// Decode a payload of the given type code, requiring it to be consumed exactly.
    pub fn decode_payload(type_code: u16, flags: u8, mut payload: Bytes) -> Result<Self> {
        let frame_type =
            FrameType::from_code(type_code).ok_or(FrameError::UnsupportedFrameType(type_code))?;
        let decode = decoder_for(frame_type).ok_or(FrameError::UnsupportedFrameType(type_code))?;

        let frame = decode(flags, &mut payload)?;
        if payload.has_remaining() {
            return Err(Violation::TrailingBytes {
                frame_type,
                extra: payload.remaining(),
            }
            .into());
        }
        Ok(frame)
    }

    /// Reject field values that the wire format cannot carry without loss.
    ///
    /// Stream ids and priorities are masked to their widths instead.
    pub fn check_encodable(&self) -> Result<()> {
        match self {
            Self::Settings(settings) => settings.check_ids(),
            _ => Ok(()),
        }
    }

    /// Append the payload (without the frame header).
    pub fn encode_payload(&self, dst: &mut BytesMut) {
        match self {
            Self::SynStream(frame) => frame.encode(dst),
            Self::SynReply(frame) => frame.encode(dst),
            Self::RstStream(frame) => frame.encode(dst),
            Self::Settings(frame) => frame.encode(dst),
            Self::Ping(frame) => frame.encode(dst),
            Self::GoAway(frame) => frame.encode(dst),
            Self::Headers(frame) => frame.encode(dst),
            Self::WindowUpdate(frame) => frame.encode(dst),
        }
    }

    pub fn frame_type(&self) -> FrameType {
        match self {
            Self::SynStream(_) => SynStream::FRAME_TYPE,
            Self::SynReply(_) => SynReply::FRAME_TYPE,
            Self::RstStream(_) => RstStream::FRAME_TYPE,
            Self::Settings(_) => Settings::FRAME_TYPE,
            Self::Ping(_) => Ping::FRAME_TYPE,
            Self::GoAway(_) => GoAway::FRAME_TYPE,
            Self::Headers(_) => Headers::FRAME_TYPE,
            Self::WindowUpdate(_) => WindowUpdate::FRAME_TYPE,
        }
    }

    pub fn flags(&self) -> u8 {
        match self {
            Self::SynStream(frame) => frame.flags(),
            Self::SynReply(frame) => frame.flags(),
            Self::RstStream(frame) => frame.flags(),
            Self::Settings(frame) => frame.flags(),
            Self::Ping(frame) => frame.flags(),
            Self::GoAway(frame) => frame.flags(),
            Self::Headers(frame) => frame.flags(),
            Self::WindowUpdate(frame) => frame.flags(),
        }
    }

    /// Stream this frame is scoped to. `None` for connection-level frames.
    pub fn stream_id(&self) -> Option<u32> {
        match self {
            Self::SynStream(frame) => Some(frame.stream_id),
            Self::SynReply(frame) => Some(frame.stream_id),
            Self::RstStream(frame) => Some(frame.stream_id),
            Self::Headers(frame) => Some(frame.stream_id),
            Self::WindowUpdate(frame) => Some(frame.stream_id),
            Self::Settings(_) | Self::Ping(_) | Self::GoAway(_) => None,
        }
    }

    /// Opaque header block, for frames that carry one.
    pub fn header_block(&self) -> Option<&Bytes> {
        match self {
            Self::SynStream(frame) => Some(&frame.header_block),
            Self::SynReply(frame) => Some(&frame.header_block),
            Self::Headers(frame) => Some(&frame.header_block),
            _ => None,
        }
    }
}

macro_rules! into_frame {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Frame {
                fn from(frame: $variant) -> Self {
                    Frame::$variant(frame)
                }
            }
        )+
    };
}

into_frame!(
    SynStream,
    SynReply,
    RstStream,
    Settings,
    Ping,
    GoAway,
    Headers,
    WindowUpdate,
);
