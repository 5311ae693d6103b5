#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Content classification must never panic on arbitrary bytes
    let _ = csindex::utils::index_content(data, u64::MAX);
    let _ = csindex::utils::is_binary(data);
});
