use serde::{Deserialize, Deserializer};

/// Keeps an explicit `null` apart from a missing field on partial updates.
///
/// Pair with `#[serde(default)]`: a missing field stays `None`, `null`
/// becomes `Some(None)` and a value becomes `Some(Some(value))`.
pub fn deserialize_nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::deserialize(deserializer).map(Some)
}
