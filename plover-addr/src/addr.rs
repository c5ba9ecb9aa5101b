// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::hash::Hash as StdHash;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::str::FromStr;

use thiserror::Error;

/// Size of the IP storage in bytes. IPv4 addresses are stored in their IPv4-mapped IPv6 form.
pub const IP_LEN: usize = 16;

/// Fixed upper bound on the length of an address in text form.
///
/// Every canonical rendering fits within this bound, including the largest possible one
/// (`[0123:4567:89ab:cdef:0123:4567:89ab:cdef]:12345`). The parser rejects longer inputs with
/// [`ParseAddressError::TooLong`] before doing any other work.
pub const MAX_STRING_LEN: usize = 48;

/// Prefix which marks an IPv4-mapped IPv6 address (`::ffff:a.b.c.d`).
const IPV4_MAPPED_PREFIX: [u8; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff];

/// IP address and port of a peer.
///
/// The IP is always stored as 16 bytes in IPv6 form, IPv4 addresses use the standard IPv4-mapped
/// prefix. Two addresses are equal exactly when all 16 bytes and the port are equal, and the
/// derived ordering is the byte-wise comparison over the `(ip, port)` tuple, making `Address`
/// directly usable for de-duplication and as a map key.
///
/// The all-zero value ([`Address::UNSPECIFIED`], also the `Default`) acts as the "no address"
/// sentinel.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, StdHash, Default)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Address {
    ip: [u8; IP_LEN],
    port: u16,
}

impl Address {
    /// The all-zero sentinel (`::` with port 0).
    pub const UNSPECIFIED: Self = Self {
        ip: [0; IP_LEN],
        port: 0,
    };

    /// Address from IPv4 octets, stored in IPv4-mapped form.
    pub const fn from_ipv4(octets: [u8; 4], port: u16) -> Self {
        let mut ip = [0u8; IP_LEN];
        ip[10] = 0xff;
        ip[11] = 0xff;
        ip[12] = octets[0];
        ip[13] = octets[1];
        ip[14] = octets[2];
        ip[15] = octets[3];
        Self { ip, port }
    }

    /// Address from raw IPv6 bytes.
    pub const fn from_ipv6(ip: [u8; IP_LEN], port: u16) -> Self {
        Self { ip, port }
    }

    /// The IPv6 loopback address (`::1`) with the given port.
    pub const fn ipv6_localhost(port: u16) -> Self {
        let mut ip = [0u8; IP_LEN];
        ip[15] = 1;
        Self { ip, port }
    }

    /// Raw bytes of the IP in IPv6 form.
    pub fn ip_bytes(&self) -> &[u8; IP_LEN] {
        &self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// True when this is the all-zero sentinel.
    pub fn is_unspecified(&self) -> bool {
        *self == Self::UNSPECIFIED
    }

    /// True when the stored IP carries the IPv4-mapped prefix.
    pub fn is_ipv4(&self) -> bool {
        self.ip[..12] == IPV4_MAPPED_PREFIX
    }

    /// The four IPv4 octets when this is an IPv4-mapped address.
    pub fn ipv4_octets(&self) -> Option<[u8; 4]> {
        if self.is_ipv4() {
            Some([self.ip[12], self.ip[13], self.ip[14], self.ip[15]])
        } else {
            None
        }
    }

    /// True for the IPv6 loopback or an IPv4-mapped `127.0.0.0/8` address, with any port.
    pub fn is_localhost(&self) -> bool {
        if self.ip == Self::ipv6_localhost(0).ip {
            return true;
        }
        matches!(self.ipv4_octets(), Some([127, _, _, _]))
    }

    /// Canonical text form.
    ///
    /// IPv4-mapped addresses render as dotted-quad, everything else in zero-compressed IPv6
    /// notation (longest run of zero groups collapsed to `::`, leftmost run on a tie, single zero
    /// groups left alone). With `with_port` the IPv4 form is `a.b.c.d:port` and the IPv6 form is
    /// bracketed as `[..]:port`.
    pub fn to_text(&self, with_port: bool) -> String {
        let mut out = String::new();
        self.write_text(&mut out, with_port)
            .expect("writing to a string is infallible");
        out
    }

    /// Write the canonical text form into `out`.
    ///
    /// The output is bounded by [`MAX_STRING_LEN`] so callers with fixed-capacity buffers can
    /// size them up front.
    pub fn write_text<W: fmt::Write>(&self, out: &mut W, with_port: bool) -> fmt::Result {
        match self.ipv4_octets() {
            Some([a, b, c, d]) => {
                if with_port {
                    write!(out, "{a}.{b}.{c}.{d}:{}", self.port)
                } else {
                    write!(out, "{a}.{b}.{c}.{d}")
                }
            }
            None => {
                let ip = Ipv6Addr::from(self.ip);
                if with_port {
                    write!(out, "[{ip}]:{}", self.port)
                } else {
                    write!(out, "{ip}")
                }
            }
        }
    }

    /// Parse an address from text.
    ///
    /// Accepts the canonical forms produced by [`Address::to_text`] plus permissive variants:
    /// surrounding whitespace is trimmed, IPv6 addresses may be bracketed with or without a port
    /// and a missing port defaults to 0. Non-canonical aliases (leading zeros in IPv6 groups,
    /// alternative compressions) normalize to the same value.
    pub fn parse(input: &str) -> Result<Self, ParseAddressError> {
        if input.len() > MAX_STRING_LEN {
            return Err(ParseAddressError::TooLong);
        }
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseAddressError::Malformed);
        }

        // Bracketed IPv6, with or without a port.
        if let Some(rest) = input.strip_prefix('[') {
            let (ip_text, tail) = rest.split_once(']').ok_or(ParseAddressError::Malformed)?;
            let ip: Ipv6Addr = ip_text.parse().map_err(|_| ParseAddressError::Malformed)?;
            let port = match tail.strip_prefix(':') {
                Some(port_text) => parse_port(port_text)?,
                None if tail.is_empty() => 0,
                None => return Err(ParseAddressError::Malformed),
            };
            return Ok(Self::from_ipv6(ip.octets(), port));
        }

        // Dotted-quad with a port. The split is taken from the right so the port digits can
        // never be confused with an IPv6 group.
        if let Some((ip_text, port_text)) = input.rsplit_once(':')
            && let Ok(ip) = ip_text.parse::<Ipv4Addr>()
        {
            let port = parse_port(port_text)?;
            return Ok(Self::from_ipv4(ip.octets(), port));
        }

        if let Ok(ip) = input.parse::<Ipv4Addr>() {
            return Ok(Self::from_ipv4(ip.octets(), 0));
        }

        if let Ok(ip) = input.parse::<Ipv6Addr>() {
            return Ok(Self::from_ipv6(ip.octets(), 0));
        }

        Err(ParseAddressError::Malformed)
    }
}

/// A port is digits only; any all-digit value above 65535 is a range error, not a syntax error.
fn parse_port(text: &str) -> Result<u16, ParseAddressError> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ParseAddressError::Malformed);
    }
    match text.parse::<u64>() {
        Ok(port) if port <= u16::MAX as u64 => Ok(port as u16),
        _ => Err(ParseAddressError::PortOutOfRange),
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_text(f, true)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&self.to_text(true)).finish()
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(v4) => Self::from_ipv4(v4.ip().octets(), v4.port()),
            SocketAddr::V6(v6) => Self::from_ipv6(v6.ip().octets(), v6.port()),
        }
    }
}

impl From<Address> for SocketAddr {
    fn from(addr: Address) -> Self {
        match addr.ipv4_octets() {
            Some(octets) => {
                SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::from(octets), addr.port))
            }
            None => SocketAddr::V6(SocketAddrV6::new(
                Ipv6Addr::from(addr.ip),
                addr.port,
                0,
                0,
            )),
        }
    }
}

/// Error types for parsing an [`Address`] from text.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ParseAddressError {
    /// Input is not a syntactically valid address.
    #[error("malformed address string")]
    Malformed,

    /// A port component exceeds 65535.
    #[error("port number out of range")]
    PortOutOfRange,

    /// Input exceeds [`MAX_STRING_LEN`].
    #[error("address string too long")]
    TooLong,
}
