//! Canonical payload (version 1, §3): the 320-byte opaque snapshot body.
//!
//! The snapshot entry carries 320 opaque bytes at the ABI boundary (§9);
//! `CanonicalPayloadV1` is the peer contract both the ingest adapter and any
//! downstream reader agree to interpret those bytes as.

use crate::layout::PAYLOAD_BYTES;

pub const PAYLOAD_VERSION_1: u32 = 1;
pub const FLAG_VALID: u32 = 1 << 0;

/// Version-1 canonical payload, exactly 320 bytes, little-endian,
/// `#[repr(C)]` with no implicit padding beyond the trailing reserved words.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct CanonicalPayloadV1 {
    pub payload_version: u32,
    pub flags: u32,

    pub action_day: i32,
    pub trading_day: i32,
    pub time_hhmmssmmm: i32,
    pub status: i32,

    pub pre_close_x10000: i64,
    pub open_x10000: i64,
    pub high_x10000: i64,
    pub low_x10000: i64,
    pub last_x10000: i64,

    pub high_limit_x10000: i64,
    pub low_limit_x10000: i64,

    pub volume: i64,
    pub turnover: i64,

    pub bid_price_x10000: [i64; 5],
    pub bid_vol: [i64; 5],
    pub ask_price_x10000: [i64; 5],
    pub ask_vol: [i64; 5],

    pub symbol: [u8; 16],
    pub prefix: [u8; 8],

    pub recv_ns: u64,

    pub reserved: [u64; 4],
}

const _: () = assert!(std::mem::size_of::<CanonicalPayloadV1>() == PAYLOAD_BYTES);
const _: () = assert!(std::mem::align_of::<CanonicalPayloadV1>() <= 8);

impl Default for CanonicalPayloadV1 {
    fn default() -> Self {
        // SAFETY: an all-zero bit pattern is valid for every field (plain
        // integers and byte arrays only).
        unsafe { std::mem::zeroed() }
    }
}

impl CanonicalPayloadV1 {
    /// Reinterprets this payload as the opaque byte array stored in a
    /// snapshot entry.
    #[inline]
    pub fn to_bytes(&self) -> [u8; PAYLOAD_BYTES] {
        // SAFETY: `CanonicalPayloadV1` is `repr(C)`, `Copy`, exactly
        // `PAYLOAD_BYTES` long, and contains no padding bytes that matter
        // (all fields are plain integers / byte arrays).
        unsafe { std::mem::transmute_copy(self) }
    }

    /// Reinterprets a raw snapshot payload as a `CanonicalPayloadV1`. The
    /// caller is responsible for having validated `payload_version` first
    /// if it cares about forward compatibility; this never fails because
    /// every bit pattern of plain integers is valid.
    #[inline]
    pub fn from_bytes(bytes: &[u8; PAYLOAD_BYTES]) -> Self {
        // SAFETY: see `to_bytes`; the reverse transmute is equally sound
        // because any byte pattern is a valid `CanonicalPayloadV1`.
        unsafe { std::mem::transmute_copy(bytes) }
    }
}
