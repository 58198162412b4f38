//! Fuzz target: denylist evaluation over arbitrary text.
//!
//! Every language must evaluate without panicking, and blank input must
//! always pass.

#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use snipbox_core::Language;
use snipbox_guard::PatternValidator;

fn validator() -> &'static PatternValidator {
    static VALIDATOR: OnceLock<PatternValidator> = OnceLock::new();
    VALIDATOR.get_or_init(|| PatternValidator::new().expect("built-in rules must compile"))
}

fuzz_target!(|data: &[u8]| {
    let Ok(code) = std::str::from_utf8(data) else {
        return;
    };
    for language in Language::ALL {
        let verdict = validator().validate_language(code, language);
        if code.trim().is_empty() {
            assert!(verdict.is_ok(), "blank code must pass for {language}");
        }
    }
});
