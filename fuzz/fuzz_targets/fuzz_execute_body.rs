//! Fuzz target: `POST /` body parsing and field checks.
//!
//! Arbitrary bytes must never panic the parser, and any accepted request
//! must carry trimmed, non-empty code within the length limit.

#![no_main]

use libfuzzer_sys::fuzz_target;
use snipbox_gateway::routes::ExecuteBody;

const MAX_CODE_LEN: usize = 10_000;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = serde_json::from_slice::<ExecuteBody>(data) else {
        return;
    };
    if let Ok(request) = body.into_request(MAX_CODE_LEN) {
        assert!(!request.code.is_empty());
        assert_eq!(request.code.trim(), request.code, "accepted code must be trimmed");
        assert!(request.code.chars().count() <= MAX_CODE_LEN);
    }
});
