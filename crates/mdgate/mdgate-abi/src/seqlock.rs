//! Seqlock protocol for the fixed 320-byte canonical payload (§4.2).
//!
//! Even sequence = stable, odd = writing. A reader that observes an even
//! sequence before and after copying the payload has observed a committed,
//! untorn write; a reader that observes odd, or a sequence that changed
//! across the copy, must retry.

use crate::atomic::{Cell32, Cell64, compiler_barrier};
use crate::layout::{ENTRY_BYTES, PAYLOAD_BYTES};

/// A single snapshot-table slot: a 64-byte meta cache line followed by the
/// 320-byte payload, aligned so `payload` sits at offset 64 within the
/// entry (checked by the const assertion below).
#[repr(C, align(64))]
pub struct Entry {
    seq: Cell32,
    _pad0: u32,
    last_update_ns: Cell64,
    _meta_pad: [u8; 48],
    pub payload: [u8; PAYLOAD_BYTES],
}

const _: () = assert!(std::mem::size_of::<Entry>() == ENTRY_BYTES);
const _: () = assert!(std::mem::offset_of!(Entry, payload) == 64);
const _: () = assert!(ENTRY_BYTES % 64 == 0);

impl Entry {
    /// Resets a freshly mapped slot to `FRESH (seq=0)`. Called once per slot
    /// during region creation, never on the hot path.
    #[inline]
    pub fn init(&mut self) {
        self.seq.store_relaxed(0);
        self.last_update_ns.store_relaxed(0);
        self.payload = [0u8; PAYLOAD_BYTES];
    }

    /// Single-writer publish: fetch-add to odd, write `last_update_ns` and
    /// the payload, then release-store to the next even value.
    ///
    /// # Safety
    /// Caller must guarantee no other thread is concurrently writing this
    /// same entry (§4.4 edge policy: single writer per id, or an external
    /// per-id exclusion discipline).
    #[inline(always)]
    pub fn publish(&self, payload: &[u8; PAYLOAD_BYTES], now_ns: u64) {
        let s0 = self.seq.load_relaxed();
        let odd = s0.wrapping_add(1);
        self.seq.store_relaxed(odd);
        compiler_barrier();

        self.last_update_ns.store_relaxed(now_ns);
        // SAFETY: single writer per entry; no reader observes `payload` as
        // stable while `seq` is odd, so a plain write here is sound even
        // though readers may be mid-spin against the same memory.
        unsafe {
            let dst = self.payload.as_ptr() as *mut [u8; PAYLOAD_BYTES];
            dst.write(*payload);
        }

        compiler_barrier();
        self.seq.store_release(odd.wrapping_add(1));
    }

    /// Bounded-retry read: returns `Some((bytes, seq))` on a coherent read,
    /// `None` once `max_spins` attempts are exhausted. The caller MUST NOT
    /// treat the output buffer as valid on `None`.
    #[inline(always)]
    pub fn read_spin(&self, max_spins: u32) -> Option<([u8; PAYLOAD_BYTES], u32)> {
        for _ in 0..max_spins {
            let s1 = self.seq.load_acquire();
            if s1 & 1 == 1 {
                std::hint::spin_loop();
                continue;
            }

            compiler_barrier();
            // SAFETY: reading a plain byte array; coherence is established
            // below by re-checking the sequence number.
            let bytes = unsafe { *(self.payload.as_ptr() as *const [u8; PAYLOAD_BYTES]) };
            compiler_barrier();

            let s2 = self.seq.load_acquire();
            if s1 == s2 {
                return Some((bytes, s2));
            }
            std::hint::spin_loop();
        }
        None
    }

    #[inline(always)]
    pub fn last_update_ns(&self) -> u64 {
        self.last_update_ns.load_relaxed()
    }

    #[inline(always)]
    pub fn seq_relaxed(&self) -> u32 {
        self.seq.load_relaxed()
    }
}
