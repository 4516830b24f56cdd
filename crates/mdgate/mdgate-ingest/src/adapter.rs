//! Ingest adapter (§4.8): vendor tick to canonical payload, symbol-key
//! resolution, and the reject-counting hot path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use mdgate_abi::clock::now_ns;
use mdgate_abi::payload::{CanonicalPayloadV1, FLAG_VALID, PAYLOAD_VERSION_1};
use mdgate_writer::Writer;
use thiserror::Error;

use crate::limit_price::{build_limit_fallback, deduce_limit_ratio};
use crate::record::{RecordHeader, VendorEvent, VendorRecord};
use crate::symbol_key::parse_symbol_key;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("record rejected: {reason}")]
    RecordRejected { reason: String },

    #[error("unknown symbol key {key}")]
    UnknownSymbol { key: u32 },
}

/// How often a rejection gets logged by the caller (§7): first hit, then
/// every 10,000th. The adapter only tracks the counter; the binary owns
/// the actual logging call.
const REJECT_LOG_STRIDE: u64 = 10_000;

/// Binds a writer to a symbol-key-to-slot-id map and tracks reject
/// counters. Feed callbacks call `ingest_tick`/`ingest_event`; neither ever
/// panics (§4.8: malformed input is counted, not propagated to the hot
/// path caller as a fatal error).
pub struct IngestAdapter {
    writer: Writer,
    key_to_id: HashMap<u32, u32>,
    limit_overrides: HashMap<u32, f64>,
    rejected_unparseable_symbol: AtomicU64,
    rejected_unknown_symbol: AtomicU64,
    rejected_bad_len: AtomicU64,
}

impl IngestAdapter {
    /// `symbols` is the ordered list assigned to slots `0..symbols.len()`,
    /// matching the order the caller already wrote to the symbol
    /// directory (§4.4). `limit_ratio_overrides` maps a wind-code to a
    /// ratio that supersedes `deduce_limit_ratio` for that symbol.
    pub fn new(writer: Writer, symbols: &[String], limit_ratio_overrides: &HashMap<String, f64>) -> Self {
        let mut key_to_id = HashMap::with_capacity(symbols.len());
        let mut limit_overrides = HashMap::with_capacity(limit_ratio_overrides.len());

        for (id, wind_code) in symbols.iter().enumerate() {
            if let Some((key, _canonical)) = parse_symbol_key(wind_code) {
                key_to_id.insert(key, id as u32);
            }
        }
        for (wind_code, ratio) in limit_ratio_overrides {
            if let Some((key, _canonical)) = parse_symbol_key(wind_code) {
                limit_overrides.insert(key, *ratio);
            }
        }

        Self {
            writer,
            key_to_id,
            limit_overrides,
            rejected_unparseable_symbol: AtomicU64::new(0),
            rejected_unknown_symbol: AtomicU64::new(0),
            rejected_bad_len: AtomicU64::new(0),
        }
    }

    pub fn writer(&self) -> &Writer {
        &self.writer
    }

    /// Validates the declared wire length against the `nDataLen` decision
    /// (open question #1), then ingests the tick. Returns `Ok(())` once the
    /// canonical payload has been published; rejections are reported as an
    /// `Err` the caller may log, never a panic.
    pub fn ingest_tick(&self, record: &VendorRecord, declared_len: usize) -> Result<(), IngestError> {
        let record_size = std::mem::size_of::<VendorRecord>();
        let header_size = std::mem::size_of::<RecordHeader>();
        if !crate::record::validate_record_len(declared_len, record_size, header_size) {
            let hit = self.rejected_bad_len.fetch_add(1, Ordering::Relaxed) + 1;
            return Err(IngestError::RecordRejected {
                reason: format!("declared length {declared_len} matches neither {record_size} nor {} (hit #{hit})", record_size + header_size),
            });
        }

        let Some((key, _canonical)) = parse_symbol_key(&record.wind_code) else {
            self.rejected_unparseable_symbol.fetch_add(1, Ordering::Relaxed);
            return Err(IngestError::RecordRejected {
                reason: format!("malformed symbol {:?}", record.wind_code),
            });
        };

        let Some(&id) = self.key_to_id.get(&key) else {
            self.rejected_unknown_symbol.fetch_add(1, Ordering::Relaxed);
            return Err(IngestError::UnknownSymbol { key });
        };

        let payload = self.build_payload(record, key);
        self.writer.update_snapshot(id, &payload.to_bytes(), payload.recv_ns);
        Ok(())
    }

    /// System-event case (§6): drives `md_status`/`last_err`, never
    /// touches the snapshot table.
    pub fn ingest_event(&self, event: &VendorEvent) {
        use mdgate_abi::layout::{MD_STATUS_OK, MD_STATUS_RECONNECTING};

        match event {
            VendorEvent::Connect | VendorEvent::Login => self.writer.set_md_status(MD_STATUS_OK),
            VendorEvent::CodeTable => {}
            VendorEvent::Disconnect { err } => {
                self.writer.set_md_status(MD_STATUS_RECONNECTING);
                self.writer.set_last_err(*err);
            }
        }
    }

    fn build_payload(&self, record: &VendorRecord, key: u32) -> CanonicalPayloadV1 {
        let (high_limit, low_limit) = if record.high_limit_x10000 <= 0 || record.low_limit_x10000 <= 0 {
            let ratio = self
                .limit_overrides
                .get(&key)
                .copied()
                .unwrap_or_else(|| deduce_limit_ratio(record.wind_code.as_bytes(), record.is_st));
            let (fallback_high, fallback_low) = build_limit_fallback(record.pre_close_x10000, ratio);
            (
                if record.high_limit_x10000 <= 0 { fallback_high } else { record.high_limit_x10000 },
                if record.low_limit_x10000 <= 0 { fallback_low } else { record.low_limit_x10000 },
            )
        } else {
            (record.high_limit_x10000, record.low_limit_x10000)
        };

        let mut symbol = [0u8; 16];
        let bytes = record.wind_code.as_bytes();
        let n = bytes.len().min(symbol.len());
        symbol[..n].copy_from_slice(&bytes[..n]);

        let mut prefix = [0u8; 8];
        let prefix_n = record.prefix.len().min(prefix.len());
        prefix[..prefix_n].copy_from_slice(&record.prefix[..prefix_n]);

        CanonicalPayloadV1 {
            payload_version: PAYLOAD_VERSION_1,
            flags: FLAG_VALID,
            action_day: record.action_day,
            trading_day: record.trading_day,
            time_hhmmssmmm: record.time_hhmmssmmm,
            status: record.status,
            pre_close_x10000: record.pre_close_x10000,
            open_x10000: record.open_x10000,
            high_x10000: record.high_x10000,
            low_x10000: record.low_x10000,
            last_x10000: record.last_x10000,
            high_limit_x10000: high_limit,
            low_limit_x10000: low_limit,
            volume: record.volume,
            turnover: record.turnover,
            bid_price_x10000: record.bid_price_x10000,
            bid_vol: record.bid_vol,
            ask_price_x10000: record.ask_price_x10000,
            ask_vol: record.ask_vol,
            symbol,
            prefix,
            recv_ns: now_ns(),
            reserved: [0u64; 4],
        }
    }

    /// `true` on the hits the caller should log: the first rejection of
    /// each kind, then every `REJECT_LOG_STRIDE`th after.
    pub fn should_log_rejection(hit_count: u64) -> bool {
        hit_count == 1 || hit_count % REJECT_LOG_STRIDE == 0
    }

    pub fn rejected_unparseable_symbol(&self) -> u64 {
        self.rejected_unparseable_symbol.load(Ordering::Relaxed)
    }

    pub fn rejected_unknown_symbol(&self) -> u64 {
        self.rejected_unknown_symbol.load(Ordering::Relaxed)
    }

    pub fn rejected_bad_len(&self) -> u64 {
        self.rejected_bad_len.load(Ordering::Relaxed)
    }
}
