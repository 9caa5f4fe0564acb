//! Extra-key declarations and their wire encoding.
//!
//! An event metric's permitted attribute keys are declared as a table of
//! names. A key's ordinal is its position in that table, looked up by name,
//! so reordering enum variants never changes what goes over the wire.

use std::collections::HashMap;
use std::hash::Hash;

/// Ordinal sent for a key whose name is missing from its own table.
/// The native store rejects it like any other unknown ordinal.
pub const UNRESOLVED_ORDINAL: i32 = -1;

/// A finite set of attribute keys an event metric accepts.
///
/// Usually implemented through the [`extra_keys!`](crate::extra_keys) macro.
pub trait ExtraKeys: Copy + Eq + Hash + Send + Sync + 'static {
    /// Key names in the order they are declared to the native store.
    const ALLOWED_KEYS: &'static [&'static str];

    /// Name of this key.
    fn key_name(&self) -> &'static str;

    /// Position of this key in [`ExtraKeys::ALLOWED_KEYS`].
    fn ordinal(&self) -> Option<i32> {
        let name = self.key_name();
        Self::ALLOWED_KEYS
            .iter()
            .position(|key| *key == name)
            .and_then(|index| i32::try_from(index).ok())
    }
}

/// Key set for events that carry no attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoExtraKeys {}

impl ExtraKeys for NoExtraKeys {
    const ALLOWED_KEYS: &'static [&'static str] = &[];

    fn key_name(&self) -> &'static str {
        match *self {}
    }
}

/// Declare an enum of extra keys together with its key-name table.
///
/// ```
/// glean_events::extra_keys! {
///     pub enum ClickKeys {
///         Button => "button",
///         Screen => "screen",
///     }
/// }
///
/// use glean_events::metrics::ExtraKeys;
/// assert_eq!(ClickKeys::ALLOWED_KEYS, &["button", "screen"]);
/// assert_eq!(ClickKeys::Screen.ordinal(), Some(1));
/// ```
#[macro_export]
macro_rules! extra_keys {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $key:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),*
        }

        impl $crate::metrics::ExtraKeys for $name {
            const ALLOWED_KEYS: &'static [&'static str] = &[$($key),*];

            fn key_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $key),*
                }
            }
        }
    };
}

/// Extra attributes encoded as two parallel sequences.
///
/// `keys[i]` and `values[i]` always describe the same pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedExtra {
    /// Key ordinals
    pub keys: Vec<i32>,
    /// Values, aligned with `keys`
    pub values: Vec<String>,
}

impl EncodedExtra {
    /// Encode a mapping. Pair order follows the map's iteration order.
    pub fn from_map<K: ExtraKeys>(extra: HashMap<K, String>) -> Self {
        let mut keys = Vec::with_capacity(extra.len());
        let mut values = Vec::with_capacity(extra.len());
        // Keys and values are pushed together so they cannot drift apart.
        for (key, value) in extra {
            keys.push(key.ordinal().unwrap_or(UNRESOLVED_ORDINAL));
            values.push(value);
        }
        Self { keys, values }
    }

    /// Encode an optional mapping; `None` gives zero-length sequences.
    pub fn encode<K: ExtraKeys>(extra: Option<HashMap<K, String>>) -> Self {
        extra.map(Self::from_map).unwrap_or_default()
    }

    /// Number of encoded pairs.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when no pairs were encoded.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate the `(ordinal, value)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (i32, &str)> + '_ {
        self.keys
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }
}
