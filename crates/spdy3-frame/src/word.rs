//! Bit-packed 32-bit words that make up control frame headers and prefixes.
//!
//! All words are big-endian on the wire. Constructors never fail: every field
//! is masked to its documented width, so out-of-range input is truncated and
//! reserved bits are always written as zero. [`FlagLengthWord::try_new`] is the
//! checked alternative used when encoding frames.

use bytes::{Buf, BufMut};

use crate::error::{FrameError, Result};
use crate::kind::FrameType;

/// Size of every word on the wire.
pub const WORD_SIZE: usize = 4;

/// Largest value of the 24-bit length field.
pub const MAX_LENGTH: u32 = 0x00FF_FFFF;

/// Largest version that fits the 15-bit version field.
pub const MAX_VERSION: u16 = 0x7FFF;

/// Largest 31-bit stream identifier.
pub const MAX_STREAM_ID: u32 = 0x7FFF_FFFF;

/// Lowest priority (3-bit field).
pub const MAX_PRIORITY: u8 = 0x07;

const CONTROL_BIT: u32 = 0x8000_0000;

macro_rules! raw_word {
    ($name:ident) => {
        impl $name {
            /// Wrap a raw word exactly as read from the wire.
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// The raw 32-bit value.
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Read one big-endian word, or `None` if fewer than 4 bytes remain.
            pub fn read_from(src: &mut impl Buf) -> Option<Self> {
                if src.remaining() < WORD_SIZE {
                    return None;
                }
                Some(Self(src.get_u32()))
            }

            /// Append this word in big-endian order.
            pub fn write_to(self, dst: &mut impl BufMut) {
                dst.put_u32(self.0);
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(word: $name) -> u32 {
                word.0
            }
        }
    };
}

/// ```text
/// +----------------------------------+
/// |C| Version(15bits) | Type(16bits) |
/// +----------------------------------+
/// ```
///
/// When `C` is unset the low 31 bits are a data frame stream id instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderWord(u32);

raw_word!(HeaderWord);

impl HeaderWord {
    /// Pack a header. `version` is masked to 15 bits.
    pub const fn new(control: bool, version: u16, type_code: u16) -> Self {
        let mut raw = ((version & MAX_VERSION) as u32) << 16 | type_code as u32;
        if control {
            raw |= CONTROL_BIT;
        }
        Self(raw)
    }

    /// Header of a control frame of a known type.
    pub const fn control(version: u16, frame_type: FrameType) -> Self {
        Self::new(true, version, frame_type as u16)
    }

    pub const fn is_control(self) -> bool {
        self.0 & CONTROL_BIT != 0
    }

    pub const fn version(self) -> u16 {
        ((self.0 >> 16) & MAX_VERSION as u32) as u16
    }

    /// Raw type code. Only meaningful for control frames.
    pub const fn type_code(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Decoded type, or `None` for codes outside the protocol.
    pub fn frame_type(self) -> Option<FrameType> {
        FrameType::from_code(self.type_code())
    }

    /// Stream id of a data frame. Only meaningful when the control bit is unset.
    pub const fn data_stream_id(self) -> u32 {
        self.0 & MAX_STREAM_ID
    }
}

/// ```text
/// +----------------------------------+
/// | Flags (8)  |  Length (24 bits)   |
/// +----------------------------------+
/// ```
///
/// SETTINGS entries reuse this shape with the length field holding the setting id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagLengthWord(u32);

raw_word!(FlagLengthWord);

impl FlagLengthWord {
    /// Pack flags and length. `length` is masked to 24 bits.
    pub const fn new(flags: u8, length: u32) -> Self {
        Self((flags as u32) << 24 | (length & MAX_LENGTH))
    }

    /// Pack flags and length, failing if `length` does not fit 24 bits.
    pub fn try_new(flags: u8, length: usize) -> Result<Self> {
        if length > MAX_LENGTH as usize {
            return Err(FrameError::LengthOverflow {
                size: length,
                max: MAX_LENGTH as usize,
            });
        }
        Ok(Self::new(flags, length as u32))
    }

    pub const fn flags(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn length(self) -> u32 {
        self.0 & MAX_LENGTH
    }
}

/// ```text
/// +------------------------------------+
/// |X|           Stream-ID (31bits)     |
/// +------------------------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamIdWord(u32);

raw_word!(StreamIdWord);

impl StreamIdWord {
    /// Pack a stream id. The reserved bit is cleared.
    pub const fn new(stream_id: u32) -> Self {
        Self(stream_id & MAX_STREAM_ID)
    }

    pub const fn stream_id(self) -> u32 {
        self.0 & MAX_STREAM_ID
    }
}

/// ```text
/// +------------------------------------+
/// | Pri|Unused | Slot |                |
/// +-------------------+----------------+
/// ```
///
/// Only the priority is modeled; slot and unused bits are written as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriorityWord(u32);

raw_word!(PriorityWord);

impl PriorityWord {
    /// Pack a priority (0 highest, 7 lowest). Masked to 3 bits.
    pub const fn new(priority: u8) -> Self {
        Self(((priority & MAX_PRIORITY) as u32) << 29)
    }

    pub const fn priority(self) -> u8 {
        ((self.0 >> 29) & MAX_PRIORITY as u32) as u8
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn header_word_syn_reply_v3() {
        let header = HeaderWord::from_raw(0x8003_0002);
        assert!(header.is_control());
        assert_eq!(header.version(), 3);
        assert_eq!(header.frame_type(), Some(FrameType::SynReply));
    }

    #[test]
    fn header_word_data_frame() {
        let header = HeaderWord::from_raw(0x000A_2C2A);
        assert!(!header.is_control());
        assert_eq!(header.data_stream_id(), 0x000A_2C2A);
    }

    #[test]
    fn header_word_roundtrips_field_extremes() {
        for control in [false, true] {
            for version in [0u16, 1, 3, 0x4000, MAX_VERSION] {
                for type_code in [0u16, 1, 10, 0x8000, u16::MAX] {
                    let word = HeaderWord::new(control, version, type_code);
                    assert_eq!(word.is_control(), control);
                    assert_eq!(word.version(), version);
                    assert_eq!(word.type_code(), type_code);
                }
            }
        }
    }

    #[test]
    fn header_word_masks_oversized_version() {
        let word = HeaderWord::new(true, 0xFFFF, 1);
        assert!(word.is_control());
        assert_eq!(word.version(), MAX_VERSION);
        assert_eq!(word.type_code(), 1);
    }

    #[test]
    fn flag_length_word_accessors() {
        let word = FlagLengthWord::from_raw(0xAB12_3456);
        assert_eq!(word.flags(), 171);
        assert_eq!(word.length(), 1_193_046);
    }

    #[test]
    fn flag_length_word_roundtrips_field_extremes() {
        for flags in [0u8, 1, 0x80, u8::MAX] {
            for length in [0u32, 1, 8, 0x0001_0000, MAX_LENGTH] {
                let word = FlagLengthWord::new(flags, length);
                assert_eq!((word.flags(), word.length()), (flags, length));
            }
        }
    }

    #[test]
    fn flag_length_word_masks_or_rejects_oversized_length() {
        assert_eq!(FlagLengthWord::new(0, 0x0100_0001).length(), 1);

        let err = FlagLengthWord::try_new(0, MAX_LENGTH as usize + 1).unwrap_err();
        assert!(matches!(err, FrameError::LengthOverflow { size, .. } if size == 0x0100_0000));
        assert!(FlagLengthWord::try_new(0, MAX_LENGTH as usize).is_ok());
    }

    #[test]
    fn stream_id_drops_reserved_bit() {
        assert_eq!(StreamIdWord::from_raw(0xFFFF_FFFF).stream_id(), 2_147_483_647);
        assert_eq!(StreamIdWord::new(0xFFFF_FFFF).raw(), MAX_STREAM_ID);
        for raw in [0u32, 1, 666, 0x8000_0000, 0x8000_029A, u32::MAX] {
            assert_eq!(StreamIdWord::from_raw(raw).stream_id(), raw & 0x7FFF_FFFF);
        }
    }

    #[test]
    fn stream_id_reads_big_endian() {
        let mut src = &[0x00, 0x00, 0x02, 0x9A][..];
        let word = StreamIdWord::read_from(&mut src).unwrap();
        assert_eq!(word.stream_id(), 666);
        assert!(src.is_empty());
    }

    #[test]
    fn short_input_yields_none() {
        let mut src = &[0x00, 0x00, 0x02][..];
        assert!(StreamIdWord::read_from(&mut src).is_none());
        assert_eq!(src.len(), 3);
    }

    #[test]
    fn priority_uses_top_three_bits() {
        assert_eq!(PriorityWord::from_raw(0x2000_0000).priority(), 1);
        assert_eq!(PriorityWord::from_raw(0xA000_0000).priority(), 5);
        assert_eq!(PriorityWord::from_raw(0xE000_0000).priority(), 7);
        assert_eq!(PriorityWord::from_raw(0xFFFF_FFFF).priority(), 7);
        for raw in [0u32, 0x1FFF_FFFF, 0x5555_5555, u32::MAX] {
            assert_eq!(PriorityWord::from_raw(raw).priority() as u32, (raw >> 29) & 0x7);
        }
    }

    #[test]
    fn priority_constructor_masks_and_zeroes_reserved() {
        assert_eq!(PriorityWord::new(5).raw(), 0xA000_0000);
        assert_eq!(PriorityWord::new(0xFF).priority(), 7);
        assert_eq!(PriorityWord::new(0xFF).raw() & 0x1FFF_FFFF, 0);
    }

    #[test]
    fn words_write_big_endian() {
        let mut dst = BytesMut::new();
        HeaderWord::control(3, FrameType::SynStream).write_to(&mut dst);
        FlagLengthWord::new(0x01, 10).write_to(&mut dst);
        assert_eq!(
            dst.as_ref(),
            &[0x80, 0x03, 0x00, 0x01, 0x01, 0x00, 0x00, 0x0A]
        );
    }

    proptest! {
        #[test]
        fn prop_header_word_roundtrips(
            control in any::<bool>(),
            version in 0..=MAX_VERSION,
            type_code in any::<u16>(),
        ) {
            let word = HeaderWord::new(control, version, type_code);
            prop_assert_eq!(word.is_control(), control);
            prop_assert_eq!(word.version(), version);
            prop_assert_eq!(word.type_code(), type_code);

            let mut dst = BytesMut::new();
            word.write_to(&mut dst);
            prop_assert_eq!(HeaderWord::read_from(&mut dst.freeze()), Some(word));
        }

        #[test]
        fn prop_flag_length_word_roundtrips(flags in any::<u8>(), length in 0..=MAX_LENGTH) {
            let word = FlagLengthWord::new(flags, length);
            prop_assert_eq!((word.flags(), word.length()), (flags, length));
            prop_assert_eq!(FlagLengthWord::try_new(flags, length as usize).ok(), Some(word));
        }

        #[test]
        fn prop_stream_id_is_low_31_bits(raw in any::<u32>()) {
            prop_assert_eq!(StreamIdWord::from_raw(raw).stream_id(), raw & 0x7FFF_FFFF);
        }

        #[test]
        fn prop_priority_is_top_3_bits(raw in any::<u32>()) {
            prop_assert_eq!(PriorityWord::from_raw(raw).priority() as u32, (raw >> 29) & 7);
        }
    }
}
