// SPDX-License-Identifier: MIT OR Apache-2.0

//! Network address and identity data-types for the plover transport.
//!
//! Peers are addressed either directly by IP ([`Address`]) or by a more abstract [`Identity`]
//! which can hold an IP address, a platform account id, free-form strings or bytes. Identities
//! which are not IP-addressable can still travel through IP-shaped code paths by borrowing an
//! address from a reserved "fake IP" range, see [`fakeip`].
//!
//! All types are plain values: `Copy`, comparable, hashable and free of heap allocations. Their
//! canonical text encodings are part of the wire and debugging contract and are stable.

pub mod addr;
pub mod fakeip;
pub mod identity;
mod serde;

pub use addr::{Address, ParseAddressError};
pub use fakeip::FakeIpType;
pub use identity::{
    AccountId, GenericBytes, GenericString, Identity, IdentityError, ParseIdentityError, Platform,
    UnknownIdentity,
};
