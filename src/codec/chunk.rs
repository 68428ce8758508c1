//! Slot slicing and reassembly.
//!
//! # Slicing Rule
//! ```text
//! stream  = payload                 (Padding::None)
//!         | payload ++ marker       (Padding::Marker, payload shorter than N*C)
//! slot[i] = stream[i*C .. min((i+1)*C, len(stream))]
//! ```
//!
//! The marker sits directly after the last payload byte, so it always lands in
//! the trailing non-empty slot. A payload that fills all N*C bytes is written
//! without a marker.

use std::borrow::Cow;

use crate::codec::{CodecError, CodecResult};

/// Width of a contract storage slot (`bytes32`).
pub const SLOT_CAPACITY: usize = 32;

/// Number and width of the slots a field stores one payload in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    /// Bytes per slot (C).
    pub capacity: usize,
    /// Slots per payload (N).
    pub count: usize,
}

impl SlotLayout {
    /// Layout of `count` contract-width slots.
    pub const fn new(count: usize) -> Self {
        Self {
            capacity: SLOT_CAPACITY,
            count,
        }
    }

    pub const fn with_capacity(capacity: usize, count: usize) -> Self {
        Self { capacity, count }
    }

    /// Total bytes available (N*C).
    pub const fn total(&self) -> usize {
        self.capacity * self.count
    }
}

/// How short trailing slots are filled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Padding {
    /// Slots are left naturally short.
    #[default]
    None,
    /// A fixed marker is appended after the payload.
    Marker(Vec<u8>),
}

impl Padding {
    pub fn marker(bytes: impl Into<Vec<u8>>) -> Self {
        Padding::Marker(bytes.into())
    }

    fn marker_bytes(&self) -> &[u8] {
        match self {
            Padding::None => &[],
            Padding::Marker(marker) => marker,
        }
    }
}

/// Split a payload into exactly `layout.count` slots.
///
/// Fails with [`CodecError::PayloadTooLarge`] instead of truncating, and with
/// [`CodecError::AmbiguousPadding`] when the payload itself ends with the
/// pad marker.
pub fn encode(payload: &[u8], layout: SlotLayout, padding: &Padding) -> CodecResult<Vec<Vec<u8>>> {
    let total = layout.total();
    if payload.len() > total {
        return Err(CodecError::PayloadTooLarge {
            len: payload.len(),
            capacity: total,
        });
    }

    let marker = padding.marker_bytes();
    let stream: Cow<'_, [u8]> = if marker.is_empty() || payload.len() == total {
        if !marker.is_empty() {
            if payload.ends_with(marker) {
                return Err(ambiguous(marker));
            }
            // A full payload has no marker to protect trailing zeros from the word fill.
            if payload.last() == Some(&0) {
                return Err(CodecError::AmbiguousPadding(
                    "full-width payload ends with a zero byte".to_string(),
                ));
            }
        }
        Cow::Borrowed(payload)
    } else {
        if payload.ends_with(marker) {
            return Err(ambiguous(marker));
        }
        // The marker is never truncated; a partial marker could not be stripped on read.
        if payload.len() + marker.len() > total {
            return Err(CodecError::PayloadTooLarge {
                len: payload.len(),
                capacity: total.saturating_sub(marker.len()),
            });
        }
        Cow::Owned([payload, marker].concat())
    };

    let chunks = (0..layout.count)
        .map(|i| {
            let start = (i * layout.capacity).min(stream.len());
            let end = ((i + 1) * layout.capacity).min(stream.len());
            stream[start..end].to_vec()
        })
        .collect();

    Ok(chunks)
}

/// Reassemble slots produced by [`encode`].
pub fn decode<C: AsRef<[u8]>>(chunks: &[C], layout: SlotLayout, padding: &Padding) -> CodecResult<Vec<u8>> {
    if chunks.len() != layout.count {
        return Err(CodecError::Decode(format!(
            "expected {} chunks, got {}",
            layout.count,
            chunks.len()
        )));
    }

    let mut out = Vec::with_capacity(layout.total());
    for (i, chunk) in chunks.iter().enumerate() {
        let chunk = chunk.as_ref();
        if chunk.len() > layout.capacity {
            return Err(CodecError::Decode(format!(
                "chunk {} holds {} bytes, slot capacity is {}",
                i,
                chunk.len(),
                layout.capacity
            )));
        }
        out.extend_from_slice(chunk);
    }

    let marker = padding.marker_bytes();
    // Empty output means the record was never written.
    if marker.is_empty() || out.is_empty() {
        return Ok(out);
    }

    if out.ends_with(marker) {
        out.truncate(out.len() - marker.len());
        Ok(out)
    } else if out.len() == layout.total() {
        Ok(out)
    } else {
        Err(CodecError::Decode(format!(
            "missing pad marker after {} bytes",
            out.len()
        )))
    }
}

fn ambiguous(marker: &[u8]) -> CodecError {
    CodecError::AmbiguousPadding(format!(
        "payload ends with the pad marker {:?}",
        String::from_utf8_lossy(marker)
    ))
}
