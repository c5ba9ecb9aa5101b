#![no_main]

use plover_addr::Identity;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &str| {
    // Arbitrary input either fails with a typed error or yields an identity whose canonical text
    // form parses back to the same value.
    if let Ok(identity) = Identity::parse(input) {
        let again = Identity::parse(&identity.to_string()).unwrap();
        assert_eq!(identity, again);
    }
});
