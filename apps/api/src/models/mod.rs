pub mod application;
pub mod job;

use serde::{Deserialize, Deserializer};

/// Deserializes an explicit JSON `null` the same way as a missing field.
/// The backend serializes unset columns as `null`, not by omission.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
