//! `mdgate-abi`: the shared-memory binary contract for the market-data
//! gateway (§3, §6).
//!
//! This crate owns everything two independently compiled processes must
//! agree on byte-for-byte: the header and entry layout, the atomic cell
//! types embedded in mapped memory, the seqlock protocol over a fixed
//! 320-byte payload, and the version-1 canonical payload shape. It has no
//! knowledge of mmap, file names, or vendor feeds — those live in
//! `mdgate-shm`, `mdgate-writer`/`mdgate-reader`, and `mdgate-ingest`.

pub mod atomic;
pub mod clock;
pub mod error;
pub mod layout;
pub mod payload;
pub mod seqlock;

pub use error::AbiError;
pub use layout::{Header, RegionLayout, ENTRY_BYTES, MAX_SYMBOLS, PAYLOAD_BYTES, SYMBOL_DIR_ENTRY_BYTES};
pub use payload::CanonicalPayloadV1;
pub use seqlock::Entry;
