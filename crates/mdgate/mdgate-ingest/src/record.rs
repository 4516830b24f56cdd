//! External collaborator contract (§6): the shape a real vendor feed client
//! plugs into. `mdgate-ingest` only consumes this; it never implements a
//! live feed.

/// Small fixed header some vendor wire formats prepend to each record. Its
/// size participates in the `nDataLen` ambiguity resolved in
/// `validate_record_len` (open question #1).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordHeader {
    pub market: u8,
    pub kind: u8,
    pub reserved: u16,
}

/// Market-data tick, pre-parsed by the feed client into scaled fixed-point
/// fields (§4.1's x10000 convention applies to every price field here too).
#[derive(Clone, Debug, Default)]
pub struct VendorRecord {
    pub wind_code: String,
    pub is_st: bool,

    pub action_day: i32,
    pub trading_day: i32,
    pub time_hhmmssmmm: i32,
    pub status: i32,

    pub pre_close_x10000: i64,
    pub open_x10000: i64,
    pub high_x10000: i64,
    pub low_x10000: i64,
    pub last_x10000: i64,

    /// `<= 0` means the feed did not supply an exchange-published limit
    /// price for this side; the adapter derives a fallback for that side
    /// only, via `deduce_limit_ratio` (§4.6).
    pub high_limit_x10000: i64,
    pub low_limit_x10000: i64,

    pub volume: i64,
    pub turnover: i64,

    pub bid_price_x10000: [i64; 5],
    pub bid_vol: [i64; 5],
    pub ask_price_x10000: [i64; 5],
    pub ask_vol: [i64; 5],

    /// Vendor-supplied prefix, copied truncated to 8 bytes into the
    /// canonical payload (§3, §4.6).
    pub prefix: Vec<u8>,
}

/// System-event case of the feed contract (§6): connection lifecycle
/// notifications that drive `md_status`/`last_err` rather than a symbol
/// snapshot.
#[derive(Clone, Debug)]
pub enum VendorEvent {
    Connect,
    Login,
    CodeTable,
    Disconnect { err: u32 },
}

/// A single message a feed client hands to the ingest adapter.
#[derive(Clone, Debug)]
pub enum FeedMessage {
    Tick(VendorRecord),
    Event(VendorEvent),
}

/// What `mdgate-ingest` expects of a pluggable vendor feed client. The
/// gateway binary does not ship a real implementation of this; `--mock`
/// mode substitutes a synthetic one.
pub trait Feed {
    fn poll(&mut self) -> Option<FeedMessage>;
}

/// Resolves the `nDataLen` ambiguity (open question #1, §4.8): a declared
/// record length is accepted if it equals either the bare record size or
/// the record size plus a small fixed header, and rejected otherwise.
pub fn validate_record_len(declared_len: usize, record_size: usize, header_size: usize) -> bool {
    declared_len == record_size || declared_len == record_size + header_size
}
