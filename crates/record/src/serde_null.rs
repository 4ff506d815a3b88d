//! Serde helper that decodes a JSON `null` as the type's default value.
//!
//! The conversion service emits `null` for empty collections, which a plain
//! `Vec<T>` field would reject.

use serde::{Deserialize, Deserializer};

/// Deserialize `T`, mapping `null` to `T::default()`.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
