#![no_main]

use plover_addr::Identity;
use plover_addr::identity::MAX_STRING_LEN;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|identity: Identity| {
    let text = identity.to_string();
    assert!(text.len() <= MAX_STRING_LEN);

    let again = Identity::parse(&text).unwrap();
    assert_eq!(identity, again);
});
