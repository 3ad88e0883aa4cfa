#![no_main]

use libfuzzer_sys::fuzz_target;
use strata_visibility::VisibilityExpression;

fuzz_target!(|data: &[u8]| {
    // Parsing arbitrary bytes must never panic, only return Err.
    let _ = VisibilityExpression::parse(data.to_vec());
});
