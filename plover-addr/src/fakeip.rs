// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of "fake IP" addresses.
//!
//! Identities which are not IP-addressable (platform accounts, generic strings or bytes) can
//! still be routed through IP-shaped code paths by standing in for a synthesized IPv4 address
//! drawn from a reserved slice of the RFC 6598 shared address space (`100.64.0.0/10`). The
//! sub-range an address falls into encodes which kind of stand-in it is:
//!
//! - `100.127.255.0/24`: temporary, locally assigned ([`FakeIpType::LocalTemp`])
//! - `100.127.0.0/16`: assigned to a local player session ([`FakeIpType::LocalPlayer`])
//! - rest of `100.64.0.0/10`: globally allocated ([`FakeIpType::Global`])
//!
//! The sub-ranges are nested, so membership is tested narrowest first. Classification is a pure
//! function over the address bits; nothing about fake-IP-ness is stored in the address itself.

use std::hash::Hash as StdHash;

use crate::addr::{Address, IP_LEN};

const FAKE_RANGE_BASE: u32 = 0x6440_0000; // 100.64.0.0
const FAKE_RANGE_MASK: u32 = 0xffc0_0000; // /10
const LOCAL_PLAYER_BASE: u32 = 0x647f_0000; // 100.127.0.0
const LOCAL_PLAYER_MASK: u32 = 0xffff_0000; // /16
const LOCAL_TEMP_BASE: u32 = 0x647f_ff00; // 100.127.255.0
const LOCAL_TEMP_MASK: u32 = 0xffff_ff00; // /24

/// Which fake-IP sub-range an address belongs to, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq, StdHash)]
pub enum FakeIpType {
    /// Not drawn from the reserved range. This is the outcome for every real-world address,
    /// including all IPv6 addresses which are not IPv4-mapped.
    NotFake,

    /// Globally allocated fake IP.
    Global,

    /// Fake IP assigned to a local player session.
    LocalPlayer,

    /// Temporary, locally assigned fake IP.
    LocalTemp,
}

impl FakeIpType {
    /// True for every outcome except [`FakeIpType::NotFake`].
    pub fn is_fake(&self) -> bool {
        *self != FakeIpType::NotFake
    }
}

/// Classify a raw IPv4 address given as a host-order word.
pub fn classify_ipv4(ip: u32) -> FakeIpType {
    // Narrowest sub-range first, the blocks are nested.
    if ip & LOCAL_TEMP_MASK == LOCAL_TEMP_BASE {
        FakeIpType::LocalTemp
    } else if ip & LOCAL_PLAYER_MASK == LOCAL_PLAYER_BASE {
        FakeIpType::LocalPlayer
    } else if ip & FAKE_RANGE_MASK == FAKE_RANGE_BASE {
        FakeIpType::Global
    } else {
        FakeIpType::NotFake
    }
}

/// Classify an address, or `None` for the all-zero sentinel IP which carries no information to
/// classify.
///
/// Every valid address maps to exactly one [`FakeIpType`]; addresses outside the reserved range
/// (and all non-IPv4-mapped IPv6 addresses) yield [`FakeIpType::NotFake`].
pub fn classify(address: &Address) -> Option<FakeIpType> {
    if address.ip_bytes() == &[0; IP_LEN] {
        return None;
    }
    match address.ipv4_octets() {
        Some(octets) => Some(classify_ipv4(u32::from_be_bytes(octets))),
        None => Some(FakeIpType::NotFake),
    }
}

/// True when the address is drawn from the reserved fake-IP range.
pub fn is_fake_ip(address: &Address) -> bool {
    matches!(classify(address), Some(fake_type) if fake_type.is_fake())
}

#[cfg(test)]
mod tests {
    use crate::addr::Address;

    use super::{FakeIpType, classify, is_fake_ip};

    fn v4(octets: [u8; 4]) -> Address {
        Address::from_ipv4(octets, 0)
    }

    #[test]
    fn sub_range_boundaries() {
        // Every boundary tested from both sides, narrowest range first.
        let vectors = [
            ([100, 127, 255, 0], FakeIpType::LocalTemp),
            ([100, 127, 255, 255], FakeIpType::LocalTemp),
            ([100, 127, 254, 255], FakeIpType::LocalPlayer),
            ([100, 127, 0, 0], FakeIpType::LocalPlayer),
            ([100, 126, 255, 255], FakeIpType::Global),
            ([100, 64, 0, 0], FakeIpType::Global),
            ([100, 100, 7, 9], FakeIpType::Global),
            ([100, 63, 255, 255], FakeIpType::NotFake),
            ([100, 128, 0, 0], FakeIpType::NotFake),
            ([8, 8, 8, 8], FakeIpType::NotFake),
            ([192, 168, 0, 1], FakeIpType::NotFake),
        ];

        for (octets, expected) in vectors {
            assert_eq!(
                classify(&v4(octets)),
                Some(expected),
                "for {}.{}.{}.{}",
                octets[0],
                octets[1],
                octets[2],
                octets[3]
            );
        }
    }

    #[test]
    fn port_does_not_matter() {
        let a = Address::from_ipv4([100, 127, 255, 1], 0);
        let b = Address::from_ipv4([100, 127, 255, 1], 27015);
        assert_eq!(classify(&a), classify(&b));
    }

    #[test]
    fn ipv6_is_never_fake() {
        let addr = Address::parse("[2001:db8::1]:443").unwrap();
        assert_eq!(classify(&addr), Some(FakeIpType::NotFake));
        assert!(!is_fake_ip(&addr));

        // Even one which happens to contain the fake range bytes somewhere inside.
        let addr = Address::parse("6440::647f:ff01").unwrap();
        assert_eq!(classify(&addr), Some(FakeIpType::NotFake));
    }

    #[test]
    fn sentinel_is_unclassifiable() {
        assert_eq!(classify(&Address::UNSPECIFIED), None);
        assert!(!is_fake_ip(&Address::UNSPECIFIED));

        // A zero IP with a non-zero port still carries no IP bits to classify.
        assert_eq!(classify(&Address::from_ipv6([0; 16], 80)), None);
    }

    #[test]
    fn predicate_matches_classification() {
        assert!(is_fake_ip(&v4([100, 64, 0, 1])));
        assert!(is_fake_ip(&v4([100, 127, 0, 1])));
        assert!(is_fake_ip(&v4([100, 127, 255, 1])));
        assert!(!is_fake_ip(&v4([100, 32, 0, 1])));
        assert!(!is_fake_ip(&v4([127, 0, 0, 1])));
    }
}
