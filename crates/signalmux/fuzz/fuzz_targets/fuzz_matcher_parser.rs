// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fuzz target for the matcher DSL parser — must not panic on any input.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(spec) = std::str::from_utf8(data) {
        let _ = signalmux::compile(spec);
    }
});
