#![no_main]

use libfuzzer_sys::fuzz_target;
use rcalc_core::eval::evaluate;

fuzz_target!(|data: &[u8]| {
    // Fuzz expression evaluation - should never panic on any input
    if let Ok(expr) = std::str::from_utf8(data) {
        let _ = evaluate(expr);
    }
});
