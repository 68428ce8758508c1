//! Payload chunking subsystem.
//!
//! # Data Flow
//! ```text
//! write:
//!     payload bytes
//!     → scheme.rs (base64 / utf-8 / binary wire form)
//!     → chunk.rs (slice into N slots of at most C bytes, optional marker)
//!     → word.rs (right-pad each slot into a bytes32 word)
//!
//! read:
//!     bytes32 words
//!     → word.rs (trim zero fill)
//!     → chunk.rs (concatenate, strip marker)
//!     → scheme.rs (base64 / utf-8 decode)
//! ```
//!
//! # Design Decisions
//! - Pure functions only: no I/O, no state
//! - Oversized payloads are an error, never truncated
//! - A pad marker that could be mistaken for payload bytes is rejected at
//!   encode time rather than guessed at on read

pub mod chunk;
pub mod scheme;
pub mod word;

pub use chunk::{decode, encode, Padding, SlotLayout, SLOT_CAPACITY};
pub use scheme::Scheme;

use thiserror::Error;

/// Errors produced while encoding or decoding slot payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Payload does not fit the field's slots.
    #[error("Payload of {len} bytes exceeds slot capacity of {capacity} bytes")]
    PayloadTooLarge { len: usize, capacity: usize },

    /// Payload tail could not be told apart from padding on read.
    #[error("Ambiguous padding: {0}")]
    AmbiguousPadding(String),

    /// On-chain bytes could not be interpreted under the expected scheme.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
