//! Ordered string parameters.
//!
//!     Events, blocks and resource references all carry a map of string parameters. Dialects
//!     rely on the order in which parameters were written (renderers echo them back in the same
//!     order), so the map preserves insertion order. Inserting an existing key overwrites the
//!     value in place and keeps the key's original position.

use indexmap::IndexMap;

/// Insertion-ordered parameter map.
pub type Parameters = IndexMap<String, String>;

/// Builds a [`Parameters`] map from key/value pairs, later duplicates overwriting earlier ones.
pub fn parameters<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Parameters
where
    K: Into<String>,
    V: Into<String>,
{
    let mut map = Parameters::new();
    for (key, value) in pairs {
        map.insert(key.into(), value.into());
    }
    map
}
