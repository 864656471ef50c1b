//! # Fixed-Width Identifiers
//!
//! Zero-cost wrappers around byte arrays used by the registry: 20-byte
//! addresses (tokens, pairs, registry identity, admin holder) and 32-byte
//! hashes (salts, init-code digests).
//!
//! Ordering is the derived lexicographic byte order, which for big-endian
//! addresses is the same as comparing them as 160-bit integers. Canonical
//! pair ordering relies on this.
//!
//! Human-readable serializers (JSON, TOML) see `0x`-prefixed hex strings;
//! binary serializers (bincode) see the raw bytes.

use crate::create2::keccak256;

/// Generates a `Copy + Ord` wrapper around `[u8; $len]`
///
/// ```rust
/// use pair_types::define_typed_wrapper;
///
/// define_typed_wrapper!(
///     /// Four-byte function selector
///     Selector, 4
/// );
///
/// let sel: Selector = "0xa9059cbb".parse().unwrap();
/// assert_eq!(sel.to_string(), "0xa9059cbb");
/// ```
#[macro_export]
macro_rules! define_typed_wrapper {
    (
        $(#[$meta:meta])*
        $name:ident, $len:expr
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Width of the identifier in bytes
            pub const LEN: usize = $len;

            /// All-zero value
            pub const ZERO: Self = Self([0u8; $len]);

            #[inline(always)]
            pub const fn new(inner: [u8; $len]) -> Self {
                Self(inner)
            }

            #[inline(always)]
            pub const fn into_inner(self) -> [u8; $len] {
                self.0
            }

            #[inline(always)]
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            #[inline(always)]
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|&b| b == 0)
            }

            /// Copy from a slice, rejecting any length other than `LEN`
            pub fn from_slice(bytes: &[u8]) -> Result<Self, $crate::errors::AddressParseError> {
                let inner: [u8; $len] = bytes.try_into().map_err(|_| {
                    $crate::errors::AddressParseError::InvalidLength {
                        expected: $len,
                        actual: bytes.len(),
                    }
                })?;
                Ok(Self(inner))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "0x{}", $crate::__hex::encode(self.0))
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::errors::AddressParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let digits = trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                    .unwrap_or(trimmed);
                let bytes = $crate::__hex::decode(digits).map_err(|_| {
                    $crate::errors::AddressParseError::InvalidHex {
                        input: s.to_string(),
                    }
                })?;
                Self::from_slice(&bytes)
            }
        }

        impl From<[u8; $len]> for $name {
            #[inline(always)]
            fn from(inner: [u8; $len]) -> Self {
                Self(inner)
            }
        }

        impl From<$name> for [u8; $len] {
            #[inline(always)]
            fn from(wrapper: $name) -> [u8; $len] {
                wrapper.0
            }
        }

        impl AsRef<[u8]> for $name {
            #[inline(always)]
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&self.to_string())
                } else {
                    $crate::__serde::Serialize::serialize(&self.0, serializer)
                }
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                if deserializer.is_human_readable() {
                    let text = <String as $crate::__serde::Deserialize>::deserialize(deserializer)?;
                    text.parse().map_err($crate::__serde::de::Error::custom)
                } else {
                    <[u8; $len] as $crate::__serde::Deserialize>::deserialize(deserializer).map(Self)
                }
            }
        }
    };
}

define_typed_wrapper!(
    /// Ethereum-style 20-byte address
    ///
    /// Used for asset identifiers, pair instance addresses, the registry's own
    /// identity and the administrative role holder.
    EthAddress, 20
);

define_typed_wrapper!(
    /// 32-byte Keccak-256 digest
    Hash256, 32
);

impl EthAddress {
    /// EIP-55 mixed-case checksum encoding
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = keccak256(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (digest.0[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Address holding `n` in its low eight bytes
    pub const fn from_low_u64(n: u64) -> Self {
        let be = n.to_be_bytes();
        let mut inner = [0u8; 20];
        let mut i = 0;
        while i < 8 {
            inner[12 + i] = be[i];
            i += 1;
        }
        Self(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AddressParseError;

    #[test]
    fn test_parse_and_display() {
        let addr: EthAddress = "0x1000000000000000000000000000000000000000".parse().unwrap();
        assert_eq!(addr.0[0], 0x10);
        assert_eq!(addr.to_string(), "0x1000000000000000000000000000000000000000");

        let bare: EthAddress = "1000000000000000000000000000000000000000".parse().unwrap();
        assert_eq!(addr, bare);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            "0x1234".parse::<EthAddress>(),
            Err(AddressParseError::InvalidLength {
                expected: 20,
                actual: 2
            })
        );
        assert!(matches!(
            "0xzz00000000000000000000000000000000000000".parse::<EthAddress>(),
            Err(AddressParseError::InvalidHex { .. })
        ));
    }

    #[test]
    fn test_ordering_matches_integer_order() {
        let low = EthAddress::from_low_u64(1);
        let high: EthAddress = "0x1000000000000000000000000000000000000000".parse().unwrap();
        assert!(low < high);
        assert!(EthAddress::ZERO < low);
    }

    #[test]
    fn test_eip55_checksum() {
        // Reference vectors from EIP-55
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let addr: EthAddress = expected.parse().unwrap();
            assert_eq!(addr.to_checksum(), expected);
        }
    }

    #[test]
    fn test_serde_representations() {
        let addr = EthAddress::from_low_u64(0xabcd);

        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x000000000000000000000000000000000000abcd\"");
        let back: EthAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_hash_width_is_distinct() {
        assert_eq!(Hash256::LEN, 32);
        assert!(Hash256::from_slice(&[0u8; 20]).is_err());
        assert!(Hash256::ZERO.is_zero());
    }
}
