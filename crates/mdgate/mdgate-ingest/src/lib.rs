//! Ingest adapter (§4.8): the boundary between a vendor feed client and the
//! shared-memory writer. Owns symbol-key resolution, limit-price fallback,
//! and the hot-path reject counters.

pub mod adapter;
pub mod limit_price;
pub mod record;
pub mod symbol_key;

pub use adapter::{IngestAdapter, IngestError};
pub use record::{Feed, FeedMessage, RecordHeader, VendorEvent, VendorRecord};
pub use symbol_key::parse_symbol_key;
