//! Reader (§4.5): header validation, spin-bounded snapshot reads, and
//! health introspection.

use mdgate_abi::{AbiError, Entry, Header, PAYLOAD_BYTES};
use mdgate_shm::{ShmError, ShmRegion};
use thiserror::Error;

/// Default retry budget for `read_snapshot` (§4.2).
pub const DEFAULT_MAX_SPINS: u32 = 200;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error(transparent)]
    Shm(#[from] ShmError),

    #[error("abi validation failed: {0}")]
    Abi(#[from] AbiError),

    #[error("symbol id {id} out of range [0, {symbol_count})")]
    SymbolIdOutOfRange { id: u32, symbol_count: u32 },

    #[error("seqlock retry budget exhausted after {max_spins} spins")]
    StaleRead { max_spins: u32 },
}

/// Read-only handle onto a validated market-data gateway region. Many
/// readers may open the same region concurrently; each owns an independent
/// mapping.
pub struct Reader {
    region: ShmRegion,
    header: *const Header,
    entries: *const Entry,
}

// Shared for reads only: every accessor takes `&self` and the underlying
// mapping is read-only memory from the OS's point of view.
unsafe impl Send for Reader {}
unsafe impl Sync for Reader {}

impl Reader {
    /// Maps the region, binds header/table pointers, and validates the
    /// header (§4.5). Refuses to expose the region on any validation
    /// failure — callers MUST NOT fall back to guessing offsets.
    pub fn open(name: &str) -> Result<Self, ReaderError> {
        let region = ShmRegion::open_ro(name)?;
        let header_ptr = region.as_ptr() as *const Header;

        // SAFETY: header_ptr is within the mapped region as long as the
        // region is at least `size_of::<Header>()` bytes; `validate` below
        // checks `total_bytes`/`header_bytes` before any further field use,
        // but reading the raw header fields here to validate them is sound
        // because the mapping covers at least the OS-reported file size.
        let header = unsafe { &*header_ptr };
        header.validate(region.len() as u64)?;

        // SAFETY: validated: snapshot_offset + snapshot_bytes <= total_bytes
        // <= region.len().
        let entries = unsafe { region.as_ptr().add(header.snapshot_offset as usize) as *const Entry };

        Ok(Self {
            region,
            header: header_ptr,
            entries,
        })
    }

    fn header(&self) -> &Header {
        // SAFETY: valid for the lifetime of `self.region`.
        unsafe { &*self.header }
    }

    /// Bounds-checks `id`, then retries the seqlock read up to `max_spins`
    /// times (§4.2). Returns the payload bytes and the observed even
    /// sequence on success.
    pub fn read_snapshot(&self, id: u32, max_spins: u32) -> Result<([u8; PAYLOAD_BYTES], u32), ReaderError> {
        let symbol_count = self.header().symbol_count;
        if id >= symbol_count {
            return Err(ReaderError::SymbolIdOutOfRange { id, symbol_count });
        }
        // SAFETY: id < symbol_count, entries points to symbol_count
        // contiguous, validated `Entry` slots.
        let entry = unsafe { &*self.entries.add(id as usize) };
        entry
            .read_spin(max_spins)
            .ok_or(ReaderError::StaleRead { max_spins })
    }

    /// Convenience wrapper using the default 200-spin budget (§4.2).
    #[inline]
    pub fn read_snapshot_default(&self, id: u32) -> Result<([u8; PAYLOAD_BYTES], u32), ReaderError> {
        self.read_snapshot(id, DEFAULT_MAX_SPINS)
    }

    #[inline]
    pub fn heartbeat_ns(&self) -> u64 {
        self.header().heartbeat_ns.load_acquire()
    }

    #[inline]
    pub fn md_status(&self) -> u32 {
        self.header().md_status.load_acquire()
    }

    #[inline]
    pub fn last_err(&self) -> u32 {
        self.header().last_err.load_acquire()
    }

    #[inline]
    pub fn last_md_ns(&self) -> u64 {
        self.header().last_md_ns.load_acquire()
    }

    #[inline]
    pub fn writer_start_ns(&self) -> u64 {
        self.header().writer_start_ns
    }

    #[inline]
    pub fn symbol_count(&self) -> u32 {
        self.header().symbol_count
    }

    /// Reads the directory entry for `id`, trimming trailing NULs. Returns
    /// `None` if the region has no symbol directory or `id` is out of
    /// range.
    pub fn symbol_dir_entry(&self, id: u32) -> Option<String> {
        let header = self.header();
        if header.symbol_dir_bytes == 0 || id >= header.symbol_count {
            return None;
        }
        let entry_bytes = mdgate_abi::SYMBOL_DIR_ENTRY_BYTES;
        let offset = header.symbol_dir_offset as usize + id as usize * entry_bytes;
        // SAFETY: validated during `open()`: symbol_dir_offset + id *
        // entry_bytes stays within symbol_dir_bytes <= snapshot_offset <=
        // total_bytes <= region length.
        let bytes = unsafe { std::slice::from_raw_parts(self.region.as_ptr().add(offset), entry_bytes) };
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdgate_writer::Writer;

    fn unique_name(tag: &str) -> String {
        format!("/mdgate_reader_test_{tag}_{}", std::process::id())
    }

    #[test]
    fn open_validates_freshly_created_region() {
        let name = unique_name("open");
        let _w = Writer::create(&name, 4).unwrap();
        let r = Reader::open(&name).unwrap();
        assert_eq!(r.symbol_count(), 4);
        mdgate_writer::unlink(&name).unwrap();
    }

    #[test]
    fn fresh_entry_reads_success_with_zero_payload_and_seq_zero() {
        let name = unique_name("fresh");
        let _w = Writer::create(&name, 4).unwrap();
        let r = Reader::open(&name).unwrap();
        let (bytes, seq) = r.read_snapshot_default(0).unwrap();
        assert_eq!(seq, 0);
        assert_eq!(bytes, [0u8; PAYLOAD_BYTES]);
        mdgate_writer::unlink(&name).unwrap();
    }

    #[test]
    fn out_of_range_id_is_reported_as_failure() {
        let name = unique_name("oob");
        let _w = Writer::create(&name, 2).unwrap();
        let r = Reader::open(&name).unwrap();
        assert!(matches!(
            r.read_snapshot_default(5),
            Err(ReaderError::SymbolIdOutOfRange { id: 5, symbol_count: 2 })
        ));
        mdgate_writer::unlink(&name).unwrap();
    }

    #[test]
    fn symbol_directory_round_trips_with_trailing_nuls_trimmed() {
        let name = unique_name("dir");
        let symbols = ["600000.SH", "000001.SZ"];
        let mut w = Writer::create(&name, 2).unwrap();
        for (i, s) in symbols.iter().enumerate() {
            w.write_symbol_dir_entry(i as u32, s).unwrap();
        }
        let r = Reader::open(&name).unwrap();
        assert_eq!(r.symbol_dir_entry(0).as_deref(), Some("600000.SH"));
        assert_eq!(r.symbol_dir_entry(1).as_deref(), Some("000001.SZ"));
        mdgate_writer::unlink(&name).unwrap();
    }

    #[test]
    fn health_fields_observe_writer_status_changes() {
        let name = unique_name("health");
        let w = Writer::create(&name, 1).unwrap();
        w.set_md_status(1);
        w.set_last_err(2);
        let r = Reader::open(&name).unwrap();
        assert_eq!(r.md_status(), 1);
        assert_eq!(r.last_err(), 2);
        mdgate_writer::unlink(&name).unwrap();
    }

    #[test]
    fn publish_then_read_round_trips_payload() {
        let name = unique_name("publish");
        let w = Writer::create(&name, 1).unwrap();
        let mut payload = [0u8; PAYLOAD_BYTES];
        payload[0] = 7;
        w.update_snapshot(0, &payload, 99);
        let r = Reader::open(&name).unwrap();
        let (bytes, _seq) = r.read_snapshot_default(0).unwrap();
        assert_eq!(bytes, payload);
        assert_eq!(r.last_md_ns(), 99);
        mdgate_writer::unlink(&name).unwrap();
    }
}
