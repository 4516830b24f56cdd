//! Writer (§4.4): region creation, symbol-directory publication, and the
//! hot-path snapshot publish.

use mdgate_abi::layout::{MAX_SYMBOLS, RegionLayout, SYMBOL_DIR_ENTRY_BYTES};
use mdgate_abi::{Entry, Header, PAYLOAD_BYTES};
use mdgate_shm::{ShmError, ShmRegionMut};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Shm(#[from] ShmError),
}

/// Single-writer handle onto a market-data gateway region. The documented
/// configuration is a single-threaded writer (§4.4); if multiple
/// feed-callback threads call `update_snapshot` they must serialize access
/// per symbol id externally.
pub struct Writer {
    region: ShmRegionMut,
    header: *mut Header,
    symbol_dir: *mut u8,
    entries: *mut Entry,
    symbol_count: u32,
}

// The region is exclusively owned by this handle; raw pointers into it are
// only ever dereferenced through `&self`/`&mut self` borrows of `Writer`.
// Every `&self` method touches the region exclusively through atomic cells
// or the per-entry seqlock protocol (§5: a heartbeat thread and the ingest
// hot path are expected to hold `&Writer` concurrently), so sharing a
// reference across threads is sound even though mutating methods take
// `&mut self` only for the one-time directory setup.
unsafe impl Send for Writer {}
unsafe impl Sync for Writer {}

impl Writer {
    /// Allocates the region, zero-fills it, and populates the header
    /// (magic, ABI version, offsets, sizes, writer pid/uid, start
    /// timestamp, initial status `RECONNECTING`). Also zeroes every
    /// snapshot-table slot to `FRESH (seq=0)`.
    pub fn create(name: &str, symbol_count: u32) -> Result<Self, WriterError> {
        if symbol_count == 0 || symbol_count > MAX_SYMBOLS {
            return Err(WriterError::InvalidArgument(format!(
                "symbol_count {symbol_count} out of range (0, {MAX_SYMBOLS}]"
            )));
        }

        let layout = RegionLayout::compute(symbol_count);
        let mut region = ShmRegionMut::create(name, layout.total_bytes() as u64)?;

        let base = region.as_mut_ptr();
        // SAFETY: `base` points to `layout.total_bytes()` freshly mapped,
        // exclusively owned bytes; we zero them before binding typed views.
        unsafe { std::ptr::write_bytes(base, 0, layout.total_bytes()) };

        let header_ptr = base as *mut Header;
        let symbol_dir_ptr = unsafe { base.add(layout.symbol_dir_offset()) };
        let entries_ptr = unsafe { base.add(layout.snapshot_offset()) as *mut Entry };

        let writer_pid = std::process::id();
        let writer_uid = unsafe { libc::getuid() };
        let writer_start_ns = mdgate_abi::clock::now_ns();

        // SAFETY: header_ptr is valid, aligned (region start is page
        // aligned, well beyond the 64-byte alignment `Header` needs), and
        // exclusively ours.
        unsafe {
            (*header_ptr).init(symbol_count, writer_pid, writer_uid as u32, writer_start_ns);
        }

        for i in 0..symbol_count as usize {
            // SAFETY: i is within [0, symbol_count), entries_ptr points to
            // symbol_count contiguous, exclusively owned `Entry` slots.
            unsafe { (*entries_ptr.add(i)).init() };
        }

        Ok(Self {
            region,
            header: header_ptr,
            symbol_dir: symbol_dir_ptr,
            entries: entries_ptr,
            symbol_count,
        })
    }

    fn header(&self) -> &Header {
        // SAFETY: valid for the lifetime of `self.region`.
        unsafe { &*self.header }
    }

    /// Writes the 16-byte zero-padded identifier for `id`. Called once per
    /// id during initialization, never on the hot path.
    pub fn write_symbol_dir_entry(&mut self, id: u32, identifier: &str) -> Result<(), WriterError> {
        if id >= self.symbol_count {
            return Err(WriterError::InvalidArgument(format!(
                "symbol id {id} out of range [0, {})",
                self.symbol_count
            )));
        }
        let bytes = identifier.as_bytes();
        if bytes.len() >= SYMBOL_DIR_ENTRY_BYTES {
            return Err(WriterError::InvalidArgument(format!(
                "identifier {identifier:?} exceeds {SYMBOL_DIR_ENTRY_BYTES} bytes"
            )));
        }

        let offset = id as usize * SYMBOL_DIR_ENTRY_BYTES;
        // SAFETY: offset + SYMBOL_DIR_ENTRY_BYTES stays within the
        // symbol-directory extent computed at `create()` time.
        unsafe {
            let dst = self.symbol_dir.add(offset);
            std::ptr::write_bytes(dst, 0, SYMBOL_DIR_ENTRY_BYTES);
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
        }
        Ok(())
    }

    /// Hot path: out-of-range ids are silently rejected (§4.8), never
    /// panic, never propagate an error the caller must handle per tick.
    #[inline]
    pub fn update_snapshot(&self, id: u32, payload: &[u8; PAYLOAD_BYTES], now_ns: u64) {
        if id >= self.symbol_count {
            return;
        }
        // SAFETY: id < symbol_count, entries points to symbol_count
        // contiguous slots.
        let entry = unsafe { &*self.entries.add(id as usize) };
        entry.publish(payload, now_ns);
        self.header().last_md_ns.store_release(now_ns);
    }

    #[inline]
    pub fn update_heartbeat(&self, now_ns: u64) {
        self.header().heartbeat_ns.store_release(now_ns);
    }

    #[inline]
    pub fn set_md_status(&self, status: u32) {
        self.header().md_status.store_release(status);
    }

    #[inline]
    pub fn set_last_err(&self, err: u32) {
        self.header().last_err.store_release(err);
    }

    pub fn symbol_count(&self) -> u32 {
        self.symbol_count
    }

    pub fn region_bytes(&self) -> usize {
        self.region.len()
    }
}

/// `shm_unlink(name)` (§4.3): removes the name binding. A no-op for already
/// unlinked names is not attempted — callers get the platform error.
pub fn unlink(name: &str) -> Result<(), WriterError> {
    mdgate_shm::unlink(name).map_err(WriterError::from)
}
