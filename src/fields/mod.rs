//! Field access subsystem.
//!
//! # Data Flow
//! ```text
//! Caller (field, key, payload elements)
//!     → catalog.rs (FieldSpec: names, key scope, layout, scheme, envelope)
//!     → contract.rs (dynamic ABI call data / return decoding)
//!     → facade.rs (codec + submitter for writes, eth_call for reads)
//! ```

pub mod catalog;
pub mod contract;
pub mod facade;
pub mod record;

pub use catalog::{Envelope, FieldKind, FieldSpec, KeyScope};
pub use facade::FieldStore;
pub use record::{FieldRecord, RecordKey};
