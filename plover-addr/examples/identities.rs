//! A minimal example showing how peers are addressed and identified.
//!
//! We build an address from raw parts, round-trip it through its canonical text form, wrap it
//! into an identity and finally classify a fake IP back into its identity subtype.
use plover_addr::{Address, Identity, fakeip};

fn main() {
    // A plain IPv4 address with a port.
    let address = Address::from_ipv4([192, 0, 2, 1], 27015);
    assert_eq!(address.to_text(true), "192.0.2.1:27015");

    // Parsing accepts canonical and permissive forms alike.
    let same: Address = "  192.0.2.1:27015 ".parse().unwrap();
    assert_eq!(same, address);

    // An identity naming the peer by that address.
    let identity = Identity::from(address);
    assert_eq!(identity.to_string(), "ip:192.0.2.1:27015");

    // Identities of peers without a routable IP borrow an address from the reserved fake IP
    // range. The address bits alone encode which kind of stand-in it is.
    let fake: Identity = "ip:100.127.255.9:27015".parse().unwrap();
    let fake_type = fakeip::classify(fake.as_ip().unwrap());
    assert_eq!(fake_type, Some(fakeip::FakeIpType::LocalTemp));

    // Platform account ids are identities too.
    let account: Identity = "valve:76561197960287930".parse().unwrap();
    println!("{account}");
}
