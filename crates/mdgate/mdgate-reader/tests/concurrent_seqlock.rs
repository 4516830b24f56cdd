//! Concurrent writer/reader coherence test: a dedicated writer thread
//! publishes continuously to slot 0 while a reader thread spins
//! `read_snapshot`. Every successful read must see a fully committed,
//! untorn payload — never a value that mixes bytes from two different
//! publishes.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use mdgate_abi::PAYLOAD_BYTES;
use mdgate_reader::Reader;
use mdgate_writer::Writer;

const TARGET_SUCCESSFUL_READS: u64 = 1_000_000;
const READER_MAX_SPINS: u32 = 1000;

/// A payload whose first and last 8 bytes both carry the same tick
/// counter. A coherent read must see them match; a torn read (front from
/// one publish, back from another) would not.
fn make_payload(tick: u64) -> [u8; PAYLOAD_BYTES] {
    let mut buf = [0u8; PAYLOAD_BYTES];
    buf[..8].copy_from_slice(&tick.to_le_bytes());
    buf[PAYLOAD_BYTES - 8..].copy_from_slice(&tick.to_le_bytes());
    buf
}

fn unique_name() -> String {
    format!("/mdgate_e2e_concurrent_{}", std::process::id())
}

#[test]
fn concurrent_writer_and_reader_never_observe_a_torn_payload() {
    let name = unique_name();
    let writer = Writer::create(&name, 1).unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let successful_reads = Arc::new(AtomicU64::new(0));

    let writer_stop = Arc::clone(&stop);
    let writer_thread = std::thread::spawn(move || {
        let mut tick: u64 = 0;
        while !writer_stop.load(Ordering::Relaxed) {
            tick += 1;
            writer.update_snapshot(0, &make_payload(tick), tick);
        }
    });

    let reader_stop = Arc::clone(&stop);
    let reader_successful_reads = Arc::clone(&successful_reads);
    let reader_name = name.clone();
    let reader_thread = std::thread::spawn(move || {
        let reader = Reader::open(&reader_name).expect("reader: failed to open region");
        let mut torn_reads = 0u64;

        while reader_successful_reads.load(Ordering::Relaxed) < TARGET_SUCCESSFUL_READS {
            if let Ok((bytes, _seq)) = reader.read_snapshot(0, READER_MAX_SPINS) {
                let front = u64::from_le_bytes(bytes[..8].try_into().unwrap());
                let back = u64::from_le_bytes(bytes[PAYLOAD_BYTES - 8..].try_into().unwrap());
                if front != back {
                    torn_reads += 1;
                }
                reader_successful_reads.fetch_add(1, Ordering::Relaxed);
            }
        }

        reader_stop.store(true, Ordering::Relaxed);
        torn_reads
    });

    let torn_reads = reader_thread.join().expect("reader thread panicked");
    writer_thread.join().expect("writer thread panicked");

    assert_eq!(torn_reads, 0, "observed a torn (non-coherent) payload");
    assert!(successful_reads.load(Ordering::Relaxed) >= TARGET_SUCCESSFUL_READS);

    mdgate_writer::unlink(&name).unwrap();
}
