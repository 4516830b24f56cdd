//! ABI-level error kinds (§7): header validation failures. A reader that
//! hits any of these refuses to expose the region.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("bad magic: expected MDGATE1\\0")]
    BadMagic,

    #[error("abi version mismatch: found {found}, expected 1")]
    VersionMismatch { found: u32 },

    #[error("endian mismatch: found {found}, expected 1 (little)")]
    EndianMismatch { found: u32 },

    #[error("header_bytes too small: found {found}")]
    HeaderTooSmall { found: u32 },

    #[error("snapshot_entry_bytes mismatch: found {found}, expected 384")]
    EntryBytesMismatch { found: u32 },

    #[error("snapshot_payload_bytes mismatch: found {found}, expected 320")]
    PayloadBytesMismatch { found: u32 },

    #[error("mapped region smaller than declared: mapped {mapped}, declared {declared}")]
    RegionTooSmall { mapped: u64, declared: u64 },

    #[error("snapshot table extends past end of region")]
    SnapshotExceedsRegion,

    #[error("symbol_count out of range (0, 3000]: found {found}")]
    SymbolCountOutOfRange { found: u32 },

    #[error("snapshot_bytes mismatch: found {found}, expected {expected}")]
    SnapshotBytesMismatch { found: u64, expected: u64 },

    #[error("unsupported symbol_key_type: found {found}, expected 1")]
    UnsupportedSymbolKeyType { found: u32 },

    #[error("symbol directory overlaps or follows the snapshot table")]
    SymbolDirOverlapsSnapshot,

    #[error("symbol directory extent too small: found {found}, expected at least {expected}")]
    SymbolDirTooSmall { found: u64, expected: u64 },

    #[error("header offset arithmetic overflowed")]
    OffsetOverflow,
}
