//! Serde helpers for strict JSON payloads.

use serde::{Deserialize, Deserializer};

/// Deserializes a nullable field that must still be present in the payload.
///
/// Plain `Option<T>` fields silently default to `None` when the key is
/// missing. Routing the field through `deserialize_with` disables that
/// fallback, so an absent key fails with a `missing field` error while an
/// explicit `null` still yields `None`.
///
/// ```ignore
/// #[serde(deserialize_with = "shared::serde_ext::required")]
/// pub verbatim: Option<String>,
/// ```
pub fn required<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}
