//! Uncompressed name/value header block.
//!
//! ```text
//! +------------------------------------+
//! | Number of Name/Value pairs (int32) |
//! +------------------------------------+
//! |     Length of name (int32)         |
//! +------------------------------------+
//! |           Name (string)            |
//! +------------------------------------+
//! |     Length of value  (int32)       |
//! +------------------------------------+
//! |          Value   (string)          |
//! +------------------------------------+
//! |           (repeats)                |
//! ```
//!
//! Names are unique. A header with several values is sent once, its values
//! joined by single NUL bytes. Frames carry this block compressed; the codec
//! only sees it when compression is bypassed (see [`NameValueBlock::to_bytes`]).

use std::collections::BTreeMap;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result, Violation};

const LENGTH_PREFIX: usize = 4;

/// Ordered set of unique header names and their (possibly NUL-joined) values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameValueBlock {
    pairs: BTreeMap<Bytes, Bytes>,
}

impl NameValueBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Set `name` to `value`, replacing any previous value.
    ///
    /// Returns the previous value, or a violation if the name is empty or the
    /// value has a leading, trailing or doubled NUL.
    pub fn insert(
        &mut self,
        name: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Result<Option<Bytes>> {
        let name = name.into();
        let value = value.into();
        validate_name(&name)?;
        validate_value(&name, &value)?;
        Ok(self.pairs.insert(name, value))
    }

    /// Add one more value to `name`, NUL-joining it onto any existing values.
    ///
    /// An empty value is stored as-is for a new name. Joining an empty value
    /// onto a non-empty one would leave an empty NUL segment and is rejected.
    pub fn append(&mut self, name: impl Into<Bytes>, value: impl AsRef<[u8]>) -> Result<()> {
        let name = name.into();
        let value = value.as_ref();
        validate_name(&name)?;
        if value.contains(&0) {
            return Err(Violation::InvalidHeaderValue(lossy(&name)).into());
        }

        let joined = match self.pairs.get(&name) {
            Some(existing) if !existing.is_empty() => {
                if value.is_empty() {
                    return Err(Violation::InvalidHeaderValue(lossy(&name)).into());
                }
                let mut buf = BytesMut::with_capacity(existing.len() + 1 + value.len());
                buf.put_slice(existing);
                buf.put_u8(0);
                buf.put_slice(value);
                buf.freeze()
            }
            _ => Bytes::copy_from_slice(value),
        };
        self.pairs.insert(name, joined);
        Ok(())
    }

    /// Raw value of `name`, NUL separators included.
    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&Bytes> {
        self.pairs.get(name.as_ref())
    }

    /// The individual values of `name`, split on NUL.
    pub fn values(&self, name: impl AsRef<[u8]>) -> Values<'_> {
        let inner = self
            .pairs
            .get(name.as_ref())
            .filter(|value| !value.is_empty())
            .map(|value| value.split(is_nul as fn(&u8) -> bool));
        Values { inner }
    }

    pub fn contains(&self, name: impl AsRef<[u8]>) -> bool {
        self.pairs.contains_key(name.as_ref())
    }

    pub fn remove(&mut self, name: impl AsRef<[u8]>) -> Option<Bytes> {
        self.pairs.remove(name.as_ref())
    }

    /// Pairs in name order, which is also the order they are encoded in.
    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &Bytes)> {
        self.pairs.iter()
    }

    /// Number of bytes [`encode`](Self::encode) writes.
    pub fn wire_size(&self) -> usize {
        self.pairs.iter().fold(LENGTH_PREFIX, |acc, (name, value)| {
            acc + 2 * LENGTH_PREFIX + name.len() + value.len()
        })
    }

    /// Decode a block from the front of `src`.
    ///
    /// Returns the block and the number of bytes consumed. Fails with
    /// [`FrameError::Truncated`] if a declared length runs past the input, and
    /// with a [`Violation`] on empty names, duplicate names or bad NUL placement.
    pub fn decode(src: &mut impl Buf) -> Result<(Self, usize)> {
        let count = read_u32(src)?;
        let mut consumed = LENGTH_PREFIX;
        let mut block = Self::new();

        for _ in 0..count {
            let name = read_string(src)?;
            let value = read_string(src)?;
            consumed += 2 * LENGTH_PREFIX + name.len() + value.len();

            validate_name(&name)?;
            validate_value(&name, &value)?;
            if block.pairs.contains_key(&name) {
                return Err(Violation::DuplicateHeaderName(lossy(&name)).into());
            }
            block.pairs.insert(name, value);
        }

        Ok((block, consumed))
    }

    /// Encode the block onto `dst`, returning the number of bytes written.
    pub fn encode(&self, dst: &mut impl BufMut) -> usize {
        dst.put_u32(self.pairs.len() as u32);
        for (name, value) in &self.pairs {
            dst.put_u32(name.len() as u32);
            dst.put_slice(name);
            dst.put_u32(value.len() as u32);
            dst.put_slice(value);
        }
        self.wire_size()
    }

    /// Decode a block that must span all of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut src = bytes;
        let (block, _) = Self::decode(&mut src)?;
        if !src.is_empty() {
            return Err(Violation::TrailingBlockBytes(src.len()).into());
        }
        Ok(block)
    }

    /// The encoded block, ready to place in a frame's header blob when
    /// compression is bypassed.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        self.encode(&mut buf);
        buf.freeze()
    }
}

/// Iterator over the NUL-separated values of one header.
pub struct Values<'a> {
    inner: Option<std::slice::Split<'a, u8, fn(&u8) -> bool>>,
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next()
    }
}

fn is_nul(b: &u8) -> bool {
    *b == 0
}

fn read_u32(src: &mut impl Buf) -> Result<u32> {
    if src.remaining() < LENGTH_PREFIX {
        return Err(FrameError::Truncated {
            needed: LENGTH_PREFIX,
            available: src.remaining(),
        });
    }
    Ok(src.get_u32())
}

fn read_string(src: &mut impl Buf) -> Result<Bytes> {
    let len = read_u32(src)? as usize;
    if src.remaining() < len {
        return Err(FrameError::Truncated {
            needed: len,
            available: src.remaining(),
        });
    }
    Ok(src.copy_to_bytes(len))
}

fn validate_name(name: &[u8]) -> Result<()> {
    if name.is_empty() {
        return Err(Violation::EmptyHeaderName.into());
    }
    Ok(())
}

// Empty is allowed; otherwise every NUL-separated value must be non-empty.
fn validate_value(name: &[u8], value: &[u8]) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    let bad = value.first() == Some(&0)
        || value.last() == Some(&0)
        || value.windows(2).any(|pair| pair == [0, 0]);
    if bad {
        return Err(Violation::InvalidHeaderValue(lossy(name)).into());
    }
    Ok(())
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
