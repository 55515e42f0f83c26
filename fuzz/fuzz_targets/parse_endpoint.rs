//! Fuzz target for endpoint parsing.
//!
//! Any string that parses must render back to a string that parses to the
//! same endpoint.

#![no_main]

use libfuzzer_sys::fuzz_target;
use netpool::Endpoint;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(endpoint) = input.parse::<Endpoint>() {
        let rendered = endpoint.to_string();
        let reparsed: Endpoint = rendered
            .parse()
            .unwrap_or_else(|e| panic!("{rendered:?} does not reparse: {e}"));
        assert_eq!(reparsed, endpoint);
    }
});
