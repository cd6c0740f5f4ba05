#![no_main]

use libfuzzer_sys::fuzz_target;
use rcalc_core::frame::{Request, Response};

fuzz_target!(|data: &[u8]| {
    // Fuzz frame decoding - should never panic on any input
    let _ = Request::decode(data);
    let _ = Response::decode(data);
});
