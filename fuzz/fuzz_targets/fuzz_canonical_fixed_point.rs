#![no_main]

use libfuzzer_sys::fuzz_target;
use strata_visibility::VisibilityExpression;

fuzz_target!(|data: &[u8]| {
    // Any expression that parses must canonicalize to a fixed point.
    if let Ok(expr) = VisibilityExpression::parse(data.to_vec()) {
        let canonical = expr.canonical().expect("parsed expressions canonicalize");
        let reparsed =
            VisibilityExpression::parse(canonical.clone()).expect("canonical text reparses");
        assert_eq!(
            reparsed.canonical().expect("canonical text recanonicalizes"),
            canonical
        );
    }
});
