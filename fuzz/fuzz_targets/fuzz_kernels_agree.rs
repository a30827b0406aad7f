#![no_main]

use chorba32::base::base;
use chorba32::braid::braid;
use chorba32::chorba_large::{chorba_large, chorba_mid};
use chorba32::chorba_small::chorba_small;
use libfuzzer_sys::fuzz_target;

// Differential fuzzing across the §8 "reference equivalence" invariant: for
// any byte sequence, every kernel must produce the same raw (pre-NOT)
// register value as the byte-at-a-time base kernel, regardless of which
// length bracket the dispatcher would have routed it to.
fuzz_target!(|data: &[u8]| {
    let reference = base(0, data);

    assert_eq!(braid(0, data), reference, "braid diverged, len={}", data.len());

    if data.len() >= 72 {
        assert_eq!(
            chorba_small(0, data),
            reference,
            "chorba_small diverged, len={}",
            data.len()
        );
        assert_eq!(
            chorba_mid(0, data),
            reference,
            "chorba_mid diverged, len={}",
            data.len()
        );
        assert_eq!(
            chorba_large(0, data),
            reference,
            "chorba_large diverged, len={}",
            data.len()
        );
    }
});
