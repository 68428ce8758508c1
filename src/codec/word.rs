//! Conversion between slots and `bytes32` contract words.

use alloy::primitives::B256;

use crate::codec::{CodecError, CodecResult, SLOT_CAPACITY};

/// Right-pad a slot with zero bytes into a contract word.
pub fn to_word(slot: &[u8]) -> CodecResult<B256> {
    if slot.len() > SLOT_CAPACITY {
        return Err(CodecError::PayloadTooLarge {
            len: slot.len(),
            capacity: SLOT_CAPACITY,
        });
    }
    let mut word = B256::ZERO;
    word[..slot.len()].copy_from_slice(slot);
    Ok(word)
}

/// Turn the words of one element back into slots.
///
/// Only the zero fill after the last non-zero byte of the whole element is
/// removed; interior words keep their full width, so a payload byte of zero at
/// a slot boundary survives. Always returns `words.len()` slots.
pub fn from_words(words: &[B256]) -> Vec<Vec<u8>> {
    let stream: Vec<u8> = words.iter().flat_map(|w| w.iter().copied()).collect();
    let end = stream.iter().rposition(|b| *b != 0).map(|i| i + 1).unwrap_or(0);

    let mut slots: Vec<Vec<u8>> = stream[..end].chunks(SLOT_CAPACITY).map(<[u8]>::to_vec).collect();
    slots.resize(words.len(), Vec::new());
    slots
}
