//! Fuzz target: `ContentHash` digest and display.
//!
//! Any input must hash to 64 lowercase hex chars whose first 12 form the
//! short digest used in log lines.

#![no_main]

use libfuzzer_sys::fuzz_target;
use snipbox_core::ContentHash;

fuzz_target!(|data: &[u8]| {
    let hash = ContentHash::of(data);

    let hex = hash.to_string();
    assert_eq!(hex.len(), 64, "ContentHash Display must produce 64 hex chars");
    assert!(hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    assert!(hex.starts_with(&hash.short()));

    let json = serde_json::to_string(&hash).expect("ContentHash serialization must not fail");
    let back: ContentHash =
        serde_json::from_str(&json).expect("ContentHash deserialization must not fail");
    assert_eq!(back, hash);
});
