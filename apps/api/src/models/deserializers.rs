//! Forgiving deserializers for model-produced JSON.
//!
//! Generation services occasionally emit `null` where the schema says "empty
//! string" or "empty list". These helpers fold `null` into the type's default so
//! the record keeps its shape instead of failing validation over a
//! representation detail.

use serde::{Deserialize, Deserializer};

/// Deserializes `T`, mapping an explicit JSON `null` to `T::default()`.
///
/// Use together with `#[serde(default)]` so a missing key also yields the default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserializes a list of strings, accepting `null` for the whole list and
/// dropping `null` items inside it.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}
