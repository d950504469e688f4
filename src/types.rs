//! Primitive identities and amounts shared by every presale component.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Address length in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Smallest-unit amount, used both for native currency and sale tokens.
pub type Balance = u128;

/// Seconds since Unix epoch.
pub type Timestamp = u64;

/// 20-byte account identity (participants, owner, receiver, presale custody).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(v: [u8; ADDRESS_LEN]) -> Self {
        Address::new(v)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Error produced when parsing an address from its hex form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address `{0}`")]
pub struct AddressParseError(pub String);

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let mut out = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut out).map_err(|_| AddressParseError(s.to_string()))?;
        Ok(Address(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Serde adapter for [`Balance`]: written as a decimal string so that amounts
/// beyond 64 bits survive TOML, YAML and environment sources; read from either a
/// string or an integer.
pub mod balance_str {
    use std::fmt;

    use serde::{de, Deserializer, Serializer};

    use super::Balance;

    pub fn serialize<S: Serializer>(v: &Balance, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Balance, D::Error> {
        deserializer.deserialize_any(BalanceVisitor)
    }

    struct BalanceVisitor;

    impl<'de> de::Visitor<'de> for BalanceVisitor {
        type Value = Balance;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer or decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Balance, E> {
            Ok(v as Balance)
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Balance, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Balance, E> {
            Balance::try_from(v).map_err(|_| E::custom(format!("negative amount {v}")))
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<Balance, E> {
            Balance::try_from(v).map_err(|_| E::custom(format!("negative amount {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Balance, E> {
            let digits: String = v.trim().chars().filter(|c| *c != '_').collect();
            digits.parse().map_err(|_| E::custom(format!("invalid amount `{v}`")))
        }
    }
}
