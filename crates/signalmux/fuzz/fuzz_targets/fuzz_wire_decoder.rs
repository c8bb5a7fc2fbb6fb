// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fuzz target for the wire record decoder — must not panic on any input,
//! including truncated, resynced, or oversized garbage.

#![no_main]

use libfuzzer_sys::fuzz_target;
use signalmux::wire::{RecordReader, DEFAULT_MAX_MESSAGE_SIZE};

fuzz_target!(|data: &[u8]| {
    let mut reader = RecordReader::new();
    reader.feed(data);
    while let Ok(Some(_record)) = reader.next_record(DEFAULT_MAX_MESSAGE_SIZE) {
        // keep draining until no more complete records are available
    }
});
