// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identities of peers on the network.
//!
//! An [`Identity`] names a peer by whatever the application has at hand: a plain IP address, a
//! platform account id, a free-form string or byte payload, or a type tag this implementation
//! does not know about. Every variant is a fixed-size value, checked against its capacity at
//! construction, so identities stay `Copy` and allocation-free no matter where they came from.
//!
//! The canonical text form is `type:payload` (for example `ip:192.0.2.1:27015` or
//! `valve:76561197960287930`) and round-trips losslessly through [`Identity::parse`].

use std::fmt;
use std::hash::Hash as StdHash;
use std::str::FromStr;

use thiserror::Error;

use crate::addr::{Address, ParseAddressError};

/// Maximum byte length of string, bytes and unknown-type payloads.
pub const MAX_PAYLOAD_LEN: usize = 32;

/// Fixed upper bound on the length of an identity in text form.
///
/// Every canonical rendering fits within this bound; the parser rejects longer inputs with
/// [`ParseIdentityError::TooLong`] before doing any other work.
pub const MAX_STRING_LEN: usize = 128;

/// Separator between the type literal and the payload in the text form.
const SEPARATOR: char = ':';

/// Bounded string payload of an identity.
///
/// Holds at most [`MAX_PAYLOAD_LEN`] bytes of UTF-8 and never the `:` separator, both checked at
/// construction. Bytes past the length are kept zeroed so the derived comparison and hashing
/// traits only ever see the payload.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, StdHash)]
pub struct GenericString {
    len: u8,
    data: [u8; MAX_PAYLOAD_LEN],
}

impl GenericString {
    pub fn new(text: &str) -> Result<Self, IdentityError> {
        if text.len() > MAX_PAYLOAD_LEN {
            return Err(IdentityError::PayloadTooLong(text.len()));
        }
        if text.contains(SEPARATOR) {
            return Err(IdentityError::SeparatorInString);
        }
        let mut data = [0u8; MAX_PAYLOAD_LEN];
        data[..text.len()].copy_from_slice(text.as_bytes());
        Ok(Self {
            len: text.len() as u8,
            data,
        })
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.data[..self.len as usize]).expect("checked utf-8 at construction")
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for GenericString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for GenericString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GenericString").field(&self.as_str()).finish()
    }
}

/// Bounded byte payload of an identity, at most [`MAX_PAYLOAD_LEN`] bytes.
///
/// Bytes past the length are kept zeroed so the derived comparison and hashing traits only ever
/// see the payload.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, StdHash)]
pub struct GenericBytes {
    len: u8,
    data: [u8; MAX_PAYLOAD_LEN],
}

impl GenericBytes {
    pub fn new(bytes: &[u8]) -> Result<Self, IdentityError> {
        if bytes.len() > MAX_PAYLOAD_LEN {
            return Err(IdentityError::PayloadTooLong(bytes.len()));
        }
        let mut data = [0u8; MAX_PAYLOAD_LEN];
        data[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            len: bytes.len() as u8,
            data,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Debug for GenericBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GenericBytes")
            .field(&hex::encode(self.as_bytes()))
            .finish()
    }
}

/// Platform an [`AccountId`] belongs to.
///
/// The text literal of each platform doubles as the type prefix of the identity text form and is
/// therefore part of the wire contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, StdHash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Platform {
    Valve,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Valve => "valve",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "valve" => Some(Platform::Valve),
            _ => None,
        }
    }
}

/// Numeric account id on a platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, StdHash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct AccountId {
    pub platform: Platform,
    pub id: u64,
}

impl AccountId {
    pub fn valve(id: u64) -> Self {
        Self {
            platform: Platform::Valve,
            id,
        }
    }
}

/// Identity of a type this implementation does not recognize.
///
/// The raw type tag and payload are preserved so unknown identities still round-trip through the
/// text form instead of being silently dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, StdHash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct UnknownIdentity {
    tag: u8,
    data: GenericBytes,
}

impl UnknownIdentity {
    pub fn new(tag: u8, bytes: &[u8]) -> Result<Self, IdentityError> {
        Ok(Self {
            tag,
            data: GenericBytes::new(bytes)?,
        })
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn data(&self) -> &GenericBytes {
        &self.data
    }
}

/// Identity of a peer: exactly one way of naming it is active at a time.
///
/// Identities compare equal only on identical variant and payload. In particular an
/// [`Identity::Ip`] holding a fake IP and any non-IP identity it may stand in for are never equal
/// here; recovering the relationship is the job of [`crate::fakeip::classify`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, StdHash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Identity {
    /// No identity. This is the `Default` and the defined state after any failed decode.
    #[default]
    Invalid,

    /// Peer named directly by IP address and port.
    Ip(Address),

    /// Free-form string, for example a user name or service label.
    Str(GenericString),

    /// Free-form bytes, for example a key fingerprint.
    Bytes(GenericBytes),

    /// Account id on a known platform.
    Account(AccountId),

    /// Identity of an unrecognized type, preserved for round-tripping.
    Unknown(UnknownIdentity),
}

impl Identity {
    /// Identity of the IPv6 loopback address with port 0.
    pub fn localhost() -> Self {
        Identity::Ip(Address::ipv6_localhost(0))
    }

    pub fn is_invalid(&self) -> bool {
        *self == Identity::Invalid
    }

    /// True when this is an IP identity pointing at a loopback address.
    pub fn is_localhost(&self) -> bool {
        matches!(self, Identity::Ip(address) if address.is_localhost())
    }

    /// The embedded address when this is an IP identity.
    pub fn as_ip(&self) -> Option<&Address> {
        match self {
            Identity::Ip(address) => Some(address),
            _ => None,
        }
    }

    /// Parse an identity from its `type:payload` text form.
    ///
    /// The payload decoder is picked by the type literal before the first `:`. Payload lengths
    /// are validated before anything is copied into the fixed-size payload storage, so no input
    /// can overflow it. On failure no partially decoded value is returned.
    pub fn parse(input: &str) -> Result<Self, ParseIdentityError> {
        if input.len() > MAX_STRING_LEN {
            return Err(ParseIdentityError::TooLong);
        }
        // No whitespace trimming here: string payloads may legitimately end in whitespace and
        // must survive a round-trip through the text form unchanged.
        if input == "invalid" {
            return Ok(Identity::Invalid);
        }

        let (prefix, payload) = input
            .split_once(SEPARATOR)
            .ok_or(ParseIdentityError::UnknownType)?;
        match prefix {
            "ip" => Ok(Identity::Ip(Address::parse(payload)?)),
            "str" => Ok(Identity::Str(GenericString::new(payload)?)),
            "gen" => Ok(Identity::Bytes(parse_hex_payload(payload)?)),
            prefix => {
                if let Some(platform) = Platform::from_prefix(prefix) {
                    let id = parse_decimal(payload)?;
                    return Ok(Identity::Account(AccountId { platform, id }));
                }
                if let Some(tag_text) = prefix.strip_prefix("unk") {
                    let tag = parse_tag(tag_text)?;
                    let data = parse_hex_payload(payload)?;
                    return Ok(Identity::Unknown(UnknownIdentity { tag, data }));
                }
                Err(ParseIdentityError::UnknownType)
            }
        }
    }
}

/// Decode a hex payload, bounding the decoded size before any copy happens.
fn parse_hex_payload(payload: &str) -> Result<GenericBytes, ParseIdentityError> {
    if payload.len() > MAX_PAYLOAD_LEN * 2 {
        return Err(ParseIdentityError::TooLong);
    }
    let bytes = hex::decode(payload).map_err(|_| ParseIdentityError::Malformed)?;
    Ok(GenericBytes::new(&bytes)?)
}

fn parse_decimal(text: &str) -> Result<u64, ParseIdentityError> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ParseIdentityError::Malformed);
    }
    text.parse::<u64>().map_err(|_| ParseIdentityError::Malformed)
}

/// The digits between `unk` and the separator. A non-numeric suffix means the prefix is simply
/// not ours; a numeric one that overflows a byte is a malformed tag.
fn parse_tag(text: &str) -> Result<u8, ParseIdentityError> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ParseIdentityError::UnknownType);
    }
    text.parse::<u8>().map_err(|_| ParseIdentityError::Malformed)
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Invalid => f.write_str("invalid"),
            Identity::Ip(address) => {
                f.write_str("ip:")?;
                address.write_text(f, address.port() != 0)
            }
            Identity::Str(text) => write!(f, "str:{text}"),
            Identity::Bytes(bytes) => write!(f, "gen:{}", hex::encode(bytes.as_bytes())),
            Identity::Account(account) => {
                write!(f, "{}:{}", account.platform.as_str(), account.id)
            }
            Identity::Unknown(unknown) => write!(
                f,
                "unk{}:{}",
                unknown.tag,
                hex::encode(unknown.data.as_bytes())
            ),
        }
    }
}

impl FromStr for Identity {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Address> for Identity {
    fn from(address: Address) -> Self {
        Identity::Ip(address)
    }
}

impl From<AccountId> for Identity {
    fn from(account: AccountId) -> Self {
        Identity::Account(account)
    }
}

impl From<GenericString> for Identity {
    fn from(text: GenericString) -> Self {
        Identity::Str(text)
    }
}

impl From<GenericBytes> for Identity {
    fn from(bytes: GenericBytes) -> Self {
        Identity::Bytes(bytes)
    }
}

impl From<UnknownIdentity> for Identity {
    fn from(unknown: UnknownIdentity) -> Self {
        Identity::Unknown(unknown)
    }
}

/// Error types for constructing identity payloads.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Payload of the given length exceeds [`MAX_PAYLOAD_LEN`].
    #[error("payload of {0} bytes exceeds the fixed capacity")]
    PayloadTooLong(usize),

    /// String payloads may not contain the `:` separator of the text form.
    #[error("string payload may not contain ':'")]
    SeparatorInString,
}

/// Error types for parsing an [`Identity`] from text.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ParseIdentityError {
    /// The type literal before the first `:` is not recognized.
    #[error("unrecognized identity type prefix")]
    UnknownType,

    /// The payload does not match the syntax of its type.
    #[error("malformed identity payload")]
    Malformed,

    /// The input or the decoded payload exceeds its fixed capacity.
    #[error("identity string or payload too long")]
    TooLong,

    /// The payload of an `ip` identity failed to parse.
    #[error(transparent)]
    Address(#[from] ParseAddressError),
}

impl From<IdentityError> for ParseIdentityError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::PayloadTooLong(_) => ParseIdentityError::TooLong,
            IdentityError::SeparatorInString => ParseIdentityError::Malformed,
        }
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for GenericBytes {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let len = u.int_in_range(0..=MAX_PAYLOAD_LEN)?;
        let mut data = [0u8; MAX_PAYLOAD_LEN];
        u.fill_buffer(&mut data[..len])?;
        Ok(Self {
            len: len as u8,
            data,
        })
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for GenericString {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let source: &str = u.arbitrary()?;
        let mut text = String::new();
        for ch in source.chars() {
            if ch == SEPARATOR {
                continue;
            }
            if text.len() + ch.len_utf8() > MAX_PAYLOAD_LEN {
                break;
            }
            text.push(ch);
        }
        GenericString::new(&text).map_err(|_| arbitrary::Error::IncorrectFormat)
    }
}
