#![no_main]

use chorba32::base::base;
use chorba32::crc32;
use libfuzzer_sys::fuzz_target;

// The public dispatcher, whatever kernel it picks on this host (braid,
// Chorba, CLMUL, or ACLE), must agree with the fully-conditioned base
// kernel for arbitrary input and an arbitrary carried-in prior CRC.
fuzz_target!(|input: (u32, Vec<u8>)| {
    let (prior, data) = input;
    let expected = !base(!prior, &data);
    assert_eq!(crc32(prior, &data), expected, "len={}", data.len());
});
