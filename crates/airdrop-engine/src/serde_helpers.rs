//! Serde adapters for values that must stay exact in JSON and YAML.

pub use airdrop_csvs::serde_helpers::u128_string;

/// 32-byte hashes as `0x`-prefixed hex.
pub mod hex_hash {
    use airdrop_merkle::{hash_from_hex, hash_to_hex, Hash};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hash_to_hex(hash))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Hash, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hash_from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Optional 32-byte hashes as `0x`-prefixed hex.
pub mod option_hex_hash {
    use airdrop_merkle::{hash_from_hex, hash_to_hex, Hash};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(hash: &Option<Hash>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match hash {
            Some(hash) => serializer.serialize_some(&hash_to_hex(hash)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Hash>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| hash_from_hex(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
