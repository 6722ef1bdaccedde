//! Fuzz target for bounds-checked view access.
//!
//! Arbitrary offsets and lengths must never panic, and a rejected write must
//! leave the buffer unchanged.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use memres::memory::MemViewMut;

#[derive(Debug, Arbitrary)]
struct Input {
    buffer: Vec<u8>,
    payload: Vec<u8>,
    sub_offset: usize,
    sub_len: usize,
    write_offset: usize,
}

fuzz_target!(|input: Input| {
    let mut buffer = input.buffer;
    let before = buffer.clone();
    let mut view = MemViewMut::new(&mut buffer);

    let mut window = view.sub(input.sub_offset, input.sub_len);
    let window_len = window.len();
    let written = window.write(&input.payload, input.write_offset);

    if written {
        let mut out = vec![0u8; input.payload.len()];
        assert!(window.read(&mut out, input.write_offset));
        assert_eq!(out, input.payload);
    } else {
        assert!(window_len == 0 || input.write_offset.saturating_add(input.payload.len()) > window_len);
        assert_eq!(buffer, before);
    }
});
