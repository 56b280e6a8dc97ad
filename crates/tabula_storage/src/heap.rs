//! The raw object heap.
//!
//! `Heap` is the unified interface to table storage and the metatable
//! registry. Nothing here invokes a handler: every operation is raw.

use tabula_foundation::{Error, FieldMap, MetaMethod, ObjectId, Result, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::object::ObjectStore;
use crate::registry::MetatableRegistry;
use crate::slots::SlotKeys;

/// Tables plus their metatable associations.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Heap {
    objects: ObjectStore,
    registry: MetatableRegistry,
    #[cfg_attr(feature = "serde", serde(skip))]
    slots: SlotKeys,
}

impl Heap {
    /// Creates an empty heap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Table lifecycle
    // =========================================================================

    /// Allocates a new empty table.
    pub fn create_table(&mut self) -> ObjectId {
        self.objects.create()
    }

    /// Allocates a table pre-filled with `fields`.
    ///
    /// # Errors
    /// Returns `InvalidKey` if any key is nil or NaN; the table is destroyed
    /// again in that case.
    pub fn create_table_with<I>(&mut self, fields: I) -> Result<ObjectId>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let id = self.objects.create();
        for (key, value) in fields {
            if let Err(e) = self.objects.raw_set(id, key, value) {
                self.objects.destroy(id)?;
                return Err(e);
            }
        }
        Ok(id)
    }

    /// Destroys a table and forgets its own metatable association.
    ///
    /// Tables that used `id` as their metatable keep a dangling link, which
    /// reads as "no metatable".
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn destroy(&mut self, id: ObjectId) -> Result<()> {
        self.objects.destroy(id)?;
        self.registry.remove(id);
        Ok(())
    }

    /// Returns true if the table is live.
    #[must_use]
    pub fn exists(&self, id: ObjectId) -> bool {
        self.objects.exists(id)
    }

    /// Validates that the table is live.
    ///
    /// # Errors
    /// Returns `StaleObject` or `ObjectNotFound`.
    pub fn validate(&self, id: ObjectId) -> Result<()> {
        self.objects.validate(id)
    }

    /// Returns the number of live tables.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.objects.len()
    }

    // =========================================================================
    // Raw access
    // =========================================================================

    /// Reads a field without consulting metatables.
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn raw_get(&self, id: ObjectId, key: &Value) -> Result<Option<Value>> {
        self.objects.raw_get(id, key)
    }

    /// Writes a field without consulting metatables.
    ///
    /// # Errors
    /// Returns an error if the table is not live or the key is invalid.
    pub fn raw_set(&mut self, id: ObjectId, key: Value, value: Value) -> Result<()> {
        self.objects.raw_set(id, key, value)
    }

    /// Returns the sequence border of a table.
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn raw_len(&self, id: ObjectId) -> Result<i64> {
        self.objects.raw_len(id)
    }

    /// Returns a structurally shared snapshot of a table's fields.
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn snapshot(&self, id: ObjectId) -> Result<FieldMap> {
        self.objects.fields(id).cloned()
    }

    // =========================================================================
    // Metatables
    // =========================================================================

    /// Returns the live metatable of `id`, never consulting handlers.
    ///
    /// # Errors
    /// Returns an error if `id` is not live.
    pub fn get_metatable(&self, id: ObjectId) -> Result<Option<ObjectId>> {
        self.objects.validate(id)?;
        Ok(self.live_metatable(id))
    }

    /// Replaces the metatable of `id`.
    ///
    /// # Errors
    /// Returns `ProtectedMetatable` if the current metatable has a non-nil
    /// `__metatable` slot, or an error if `id` or the new metatable is not
    /// live.
    pub fn set_metatable(&mut self, id: ObjectId, metatable: Option<ObjectId>) -> Result<()> {
        self.objects.validate(id)?;
        if self.protection(id).is_some() {
            return Err(Error::protected_metatable());
        }
        self.set_metatable_unchecked(id, metatable)
    }

    /// Replaces the metatable of `id`, ignoring `__metatable` protection.
    ///
    /// # Errors
    /// Returns an error if `id` or the new metatable is not live.
    pub fn set_metatable_unchecked(
        &mut self,
        id: ObjectId,
        metatable: Option<ObjectId>,
    ) -> Result<()> {
        self.objects.validate(id)?;
        if let Some(mt) = metatable {
            self.objects.validate(mt)?;
        }
        self.registry.set_unchecked(id, metatable);
        Ok(())
    }

    /// Returns the value of the `__metatable` slot guarding `id`, if any.
    #[must_use]
    pub fn protection(&self, id: ObjectId) -> Option<Value> {
        self.metamethod_of(id, MetaMethod::Metatable)
    }

    /// Raw lookup of a slot in the metatable of `value`.
    ///
    /// Only tables carry metatables; every other value yields `None`, as do
    /// stale tables.
    #[must_use]
    pub fn metamethod(&self, value: &Value, slot: MetaMethod) -> Option<Value> {
        value
            .as_object()
            .and_then(|id| self.metamethod_of(id, slot))
    }

    /// Raw lookup of a slot in the metatable of table `id`.
    #[must_use]
    pub fn metamethod_of(&self, id: ObjectId, slot: MetaMethod) -> Option<Value> {
        let mt = self.live_metatable(id)?;
        self.objects
            .raw_get(mt, self.slots.key(slot))
            .ok()
            .flatten()
    }

    /// Drops registry entries that refer to destroyed tables.
    ///
    /// Returns the number of entries removed.
    pub fn prune_metatables(&mut self) -> usize {
        self.registry.prune(&self.objects)
    }

    /// Read access to the registry.
    #[must_use]
    pub fn registry(&self) -> &MetatableRegistry {
        &self.registry
    }

    fn live_metatable(&self, id: ObjectId) -> Option<ObjectId> {
        self.registry
            .get(id)
            .filter(|mt| self.objects.exists(*mt))
    }
}
