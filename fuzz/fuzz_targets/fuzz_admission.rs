#![no_main]

use csindex::index::{AdmissionFilter, Scope};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|name: &str| {
    let filter = AdmissionFilter::default();
    let _ = filter.decide(name, Scope::File);
    let _ = filter.decide(name, Scope::Directory);
});
