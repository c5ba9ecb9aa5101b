// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use serde_bytes::{ByteBuf as SerdeByteBuf, Bytes as SerdeBytes};

use crate::addr::{Address, IP_LEN};
use crate::identity::Identity;

impl Serialize for Address {
    /// Human readable encodings (JSON) carry the canonical text form, binary encodings (CBOR)
    /// the raw 18 bytes (16 IP bytes followed by the big-endian port).
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            let mut bytes = [0u8; IP_LEN + 2];
            bytes[..IP_LEN].copy_from_slice(self.ip_bytes());
            bytes[IP_LEN..].copy_from_slice(&self.port().to_be_bytes());
            SerdeBytes::new(&bytes).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            Address::parse(&text).map_err(|err| serde::de::Error::custom(err.to_string()))
        } else {
            let bytes = <SerdeByteBuf>::deserialize(deserializer)?;
            let bytes: [u8; IP_LEN + 2] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| serde::de::Error::custom("expected 18 address bytes"))?;
            let mut ip = [0u8; IP_LEN];
            ip.copy_from_slice(&bytes[..IP_LEN]);
            let port = u16::from_be_bytes([bytes[IP_LEN], bytes[IP_LEN + 1]]);
            Ok(Address::from_ipv6(ip, port))
        }
    }
}

impl Serialize for Identity {
    /// The canonical text form is the wire contract for identities, in every encoding.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Identity::parse(&text).map_err(|err| serde::de::Error::custom(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::addr::Address;
    use crate::identity::{AccountId, Identity};

    #[test]
    fn serialize_address() {
        let address = Address::from_ipv4([192, 0, 2, 1], 27015);

        // Serialize JSON (human-readable text encoding)
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"192.0.2.1:27015\"");

        // Serialize CBOR (non human-readable byte encoding): an 18 byte string
        let mut bytes: Vec<u8> = Vec::new();
        ciborium::ser::into_writer(&address, &mut bytes).unwrap();
        assert_eq!(bytes.len(), 19);
        assert_eq!(bytes[0], 0x52);
        assert_eq!(&bytes[11..13], &[0xff, 0xff]);
        assert_eq!(&bytes[13..17], &[192, 0, 2, 1]);
        assert_eq!(&bytes[17..19], &27015u16.to_be_bytes());
    }

    #[test]
    fn deserialize_address() {
        let address = Address::from_ipv4([192, 0, 2, 1], 27015);

        let json_address: Address = serde_json::from_str("\"192.0.2.1:27015\"").unwrap();
        assert_eq!(json_address, address);

        let mut bytes: Vec<u8> = Vec::new();
        ciborium::ser::into_writer(&address, &mut bytes).unwrap();
        let cbor_address: Address = ciborium::de::from_reader(&bytes[..]).unwrap();
        assert_eq!(cbor_address, address);
    }

    #[test]
    fn serde_identity() {
        let identity = Identity::Account(AccountId::valve(76561197960287930));

        let json = serde_json::to_string(&identity).unwrap();
        assert_eq!(json, "\"valve:76561197960287930\"");
        let json_identity: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(json_identity, identity);

        let mut bytes: Vec<u8> = Vec::new();
        ciborium::ser::into_writer(&identity, &mut bytes).unwrap();
        let cbor_identity: Identity = ciborium::de::from_reader(&bytes[..]).unwrap();
        assert_eq!(cbor_identity, identity);
    }

    #[test]
    fn deserialize_invalid_input() {
        assert!(serde_json::from_str::<Address>("\"not an address\"").is_err());
        assert!(serde_json::from_str::<Identity>("\"weird:payload\"").is_err());
    }
}
