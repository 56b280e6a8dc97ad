//! Pre-built keys for reserved metatable slots.

use tabula_foundation::{MetaMethod, Value};

/// The reserved slot names as ready-to-use table keys.
///
/// Metatables are ordinary tables, so a slot lookup is a raw lookup of the
/// slot's name. Building the key values once avoids allocating a string per
/// dispatch.
#[derive(Clone, Debug)]
pub struct SlotKeys {
    keys: Vec<Value>,
}

impl SlotKeys {
    /// Builds the key for every [`MetaMethod`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: MetaMethod::ALL
                .into_iter()
                .map(|mm| Value::from(mm.name()))
                .collect(),
        }
    }

    /// Returns the key under which `slot` is stored.
    #[must_use]
    pub fn key(&self, slot: MetaMethod) -> &Value {
        &self.keys[slot.ordinal()]
    }
}

impl Default for SlotKeys {
    fn default() -> Self {
        Self::new()
    }
}
