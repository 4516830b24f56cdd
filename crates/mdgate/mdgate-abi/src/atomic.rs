//! Typed atomic cells over plain words embedded in mapped shared memory.
//!
//! These are thin wrappers around `std::sync::atomic`, not a reimplementation
//! of atomics: the point is to name the orderings the seqlock protocol needs
//! (relaxed, acquire, release) so call sites read as intent rather than a
//! bare `Ordering::Acquire` scattered through the header/entry code.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering, compiler_fence};

/// A 32-bit word living at a fixed offset inside a mapped region.
///
/// `#[repr(transparent)]` so a `Cell32` has the exact layout of a `u32`,
/// which is what lets two independently compiled processes agree on the
/// header/entry byte layout byte-for-byte.
#[repr(transparent)]
pub struct Cell32(AtomicU32);

impl Cell32 {
    pub const fn new(v: u32) -> Self {
        Self(AtomicU32::new(v))
    }

    #[inline(always)]
    pub fn load_relaxed(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn load_acquire(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn store_relaxed(&self, v: u32) {
        self.0.store(v, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn store_release(&self, v: u32) {
        self.0.store(v, Ordering::Release);
    }

    #[inline(always)]
    pub fn fetch_add_relaxed(&self, d: u32) -> u32 {
        self.0.fetch_add(d, Ordering::Relaxed)
    }
}

/// A 64-bit word living at a fixed offset inside a mapped region.
#[repr(transparent)]
pub struct Cell64(AtomicU64);

impl Cell64 {
    pub const fn new(v: u64) -> Self {
        Self(AtomicU64::new(v))
    }

    #[inline(always)]
    pub fn load_relaxed(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub fn load_acquire(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    #[inline(always)]
    pub fn store_relaxed(&self, v: u64) {
        self.0.store(v, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn store_release(&self, v: u64) {
        self.0.store(v, Ordering::Release);
    }

    #[inline(always)]
    pub fn fetch_add_relaxed(&self, d: u64) -> u64 {
        self.0.fetch_add(d, Ordering::Relaxed)
    }
}

/// Forbids the compiler from reordering memory accesses across this point,
/// without emitting a hardware fence. On architectures with a strong memory
/// model (x86_64's TSO) the seqlock's acquire/release stores are already
/// sufficient and this is the only barrier the payload memcpy needs.
#[inline(always)]
pub fn compiler_barrier() {
    compiler_fence(Ordering::SeqCst);
}
