#![no_main]

use chorba32::{FoldState, crc32};
use libfuzzer_sys::fuzz_target;

// Arbitrary chunk splits of the streaming `FoldState` API must match a
// single `crc32` call over the whole buffer, no matter how the caller
// carves up its `append` boundaries (including one byte at a time).
fuzz_target!(|input: (Vec<u8>, Vec<u8>)| {
    let (data, chunk_lens) = input;
    if data.is_empty() {
        return;
    }

    let mut state = FoldState::begin_stream();
    let mut pos = 0usize;
    let mut idx = 0usize;
    while pos < data.len() {
        let want = if chunk_lens.is_empty() {
            1
        } else {
            (chunk_lens[idx % chunk_lens.len()] as usize % 37) + 1
        };
        let take = want.min(data.len() - pos);
        state.append(&data[pos..pos + take], 0).unwrap();
        pos += take;
        idx += 1;
    }

    let streamed = state.finalize().unwrap();
    assert_eq!(streamed, crc32(0, &data));
});
