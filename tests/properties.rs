//! Integration-level property tests against the public API.
//!
//! Per-kernel equivalence and boundary-length checks already live next to
//! each kernel (`#[cfg(test)]` modules in `src/`, matching the teacher's own
//! per-module test placement); this file covers the whole-crate invariants
//! from the design notes (§8) that only make sense against the public
//! surface: concatenation via `combine`, the linearity witness, and
//! misaligned-offset equivalence across the full length spectrum, driven by
//! `quickcheck` instead of fixed data.

use chorba32::{FoldState, combine, crc32};
use quickcheck_macros::quickcheck;

#[test]
fn test_check_vectors() {
    assert_eq!(crc32(0, b""), 0x0000_0000);
    assert_eq!(crc32(0, b"a"), 0xE8B7_BE43);
    assert_eq!(crc32(0, b"abc"), 0x3524_41C2);
    assert_eq!(crc32(0, b"123456789"), 0xCBF4_3926);
    assert_eq!(
        crc32(0, b"The quick brown fox jumps over the lazy dog"),
        0x414F_A339
    );
}

#[test]
fn test_one_million_a_matches_known_value() {
    let data = vec![b'a'; 1_000_000];
    assert_eq!(crc32(0, &data), 0xDC25_BFBC);
}

#[quickcheck]
fn prop_identity_of_empty_input(prior: u32) -> bool {
    crc32(prior, b"") == prior
}

#[quickcheck]
fn prop_concatenation_matches_combine(a: Vec<u8>, b: Vec<u8>) -> bool {
    let whole: Vec<u8> = a.iter().chain(b.iter()).copied().collect();
    let expected = crc32(0, &whole);
    let combined = combine(crc32(0, &a), crc32(0, &b), b.len() as u64);
    combined == expected
}

#[quickcheck]
fn prop_linearity_witness(a: Vec<u8>, mut b: Vec<u8>) -> bool {
    // |A| = |B| is required by the witness; pad/truncate b to match.
    b.resize(a.len(), 0);
    let xor: Vec<u8> = a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect();
    let zeros = vec![0u8; a.len()];

    let lhs = crc32(0, &xor) ^ crc32(0, &zeros);
    let rhs = crc32(0, &a) ^ crc32(0, &b);
    lhs == rhs
}

#[quickcheck]
fn prop_streaming_fold_matches_one_shot(data: Vec<u8>, chunk_len: u8) -> bool {
    let chunk_len = (chunk_len as usize % 37) + 1;
    let mut state = FoldState::begin_stream();
    for chunk in data.chunks(chunk_len) {
        state.append(chunk, 0).unwrap();
    }
    state.finalize().unwrap() == crc32(0, &data)
}

#[quickcheck]
fn prop_misaligned_offsets_agree(data: Vec<u8>) -> bool {
    if data.len() < 16 {
        return true;
    }
    let whole = crc32(0, &data);
    (0..16).all(|offset| {
        let tail = &data[offset..];
        let prefix = &data[..offset];
        combine(crc32(0, prefix), crc32(0, tail), tail.len() as u64) == whole
    })
}

#[test]
fn test_boundary_lengths_round_trip_through_combine() {
    let data: Vec<u8> = (0..1_048_600u32)
        .map(|i| i.wrapping_mul(2654435761) as u8)
        .collect();
    for &len in &[
        0, 1, 15, 16, 17, 63, 64, 65, 71, 72, 73, 255, 256, 511, 512, 8191, 8192, 8193, 32767,
        32768, 32769, 524287, 524288, 524289, 1_048_576,
    ] {
        let buf = &data[..len];
        let whole = crc32(0, buf);
        let mut state = FoldState::begin_stream();
        state.append(buf, 0).unwrap();
        assert_eq!(state.finalize().unwrap(), whole, "len={len}");
    }
}
