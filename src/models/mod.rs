use serde::{Deserialize, Deserializer};

pub mod config;
pub mod facets;
pub mod filter;
pub mod host;
pub mod navigation;

/// The search API encodes an empty list or map as `null`
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
