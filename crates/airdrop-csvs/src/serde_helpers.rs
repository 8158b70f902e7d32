//! Serde adapters shared by every file format that carries token amounts.

/// `u128` token amounts written as decimal strings.
///
/// On input, plain integers are accepted as well as strings, and `_` digit
/// separators are ignored, so `"1_000"`, `"1000"` and `1000` all read the same.
pub mod u128_string {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(value: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = u128;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer amount, as a number or decimal string")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<u128, E> {
            Ok(u128::from(value))
        }

        fn visit_u128<E: de::Error>(self, value: u128) -> Result<u128, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<u128, E> {
            u128::try_from(value).map_err(|_| E::custom(format!("negative amount {value}")))
        }

        fn visit_i128<E: de::Error>(self, value: i128) -> Result<u128, E> {
            u128::try_from(value).map_err(|_| E::custom(format!("negative amount {value}")))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<u128, E> {
            value
                .trim()
                .replace('_', "")
                .parse()
                .map_err(|e| E::custom(format!("invalid amount {value:?}: {e}")))
        }
    }
}
