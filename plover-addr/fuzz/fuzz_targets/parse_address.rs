#![no_main]

use plover_addr::Address;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &str| {
    // Arbitrary input either fails with a typed error or yields an address whose canonical text
    // form parses back to the same value.
    if let Ok(address) = Address::parse(input) {
        let again = Address::parse(&address.to_text(true)).unwrap();
        assert_eq!(address, again);
    }
});
