//! Table lifecycle management with generational indices.
//!
//! The `ObjectStore` is the associative store behind every table: it
//! allocates arena slots, tracks generations to detect stale references to
//! destroyed tables, and offers raw field access that never consults a
//! metatable.

// Allow u64 to usize casts - we target 64-bit systems
#![allow(clippy::cast_possible_truncation)]

use tabula_foundation::{Error, FieldMap, ObjectId, Result, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One arena slot.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct Slot {
    /// Even generations are free, odd generations are alive.
    generation: u32,
    fields: FieldMap,
}

/// Arena of tables addressed by [`ObjectId`].
///
/// Slots are allocated from a free list when available, otherwise new
/// indices are allocated. When a table is destroyed, its fields are dropped,
/// its index is added to the free list and its generation is incremented.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectStore {
    slots: Vec<Slot>,
    /// Free list of indices available for reuse.
    free_list: Vec<u64>,
    /// Count of live tables.
    live_count: usize,
}

impl ObjectStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live_count: 0,
        }
    }

    /// Allocates a new empty table, returns its ID.
    ///
    /// Reuses indices from the free list when available.
    pub fn create(&mut self) -> ObjectId {
        self.live_count += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            // Was even/free, now odd/alive
            slot.generation += 1;
            ObjectId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u64;
            // New tables start at generation 1 (odd = alive)
            self.slots.push(Slot {
                generation: 1,
                fields: FieldMap::new(),
            });
            ObjectId::new(index, 1)
        }
    }

    /// Destroys a table and drops its fields.
    ///
    /// # Errors
    /// Returns an error if the table is stale or already destroyed.
    pub fn destroy(&mut self, id: ObjectId) -> Result<()> {
        self.validate(id)?;

        let slot = &mut self.slots[id.index as usize];
        // Was odd/alive, now even/free
        slot.generation += 1;
        slot.fields = FieldMap::new();
        self.free_list.push(id.index);
        self.live_count -= 1;

        Ok(())
    }

    /// Checks if a table exists and is not stale.
    #[must_use]
    pub fn exists(&self, id: ObjectId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.generation == id.generation && id.generation % 2 == 1)
    }

    /// Validates that a table is live.
    ///
    /// # Errors
    /// Returns `StaleObject` if the slot was reused or freed since `id` was
    /// issued, and `ObjectNotFound` if it never existed.
    pub fn validate(&self, id: ObjectId) -> Result<()> {
        let Some(slot) = self.slots.get(id.index as usize) else {
            return Err(Error::object_not_found(id));
        };

        if slot.generation != id.generation {
            // Generation mismatch - table was destroyed and possibly reused
            return Err(Error::stale_object(id));
        }

        if slot.generation % 2 == 0 {
            // Even generation means the slot is free
            return Err(Error::object_not_found(id));
        }

        Ok(())
    }

    /// Returns the fields of a live table.
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn fields(&self, id: ObjectId) -> Result<&FieldMap> {
        self.validate(id)?;
        Ok(&self.slots[id.index as usize].fields)
    }

    /// Returns the fields of a live table for mutation.
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn fields_mut(&mut self, id: ObjectId) -> Result<&mut FieldMap> {
        self.validate(id)?;
        Ok(&mut self.slots[id.index as usize].fields)
    }

    /// Reads a field without consulting any metatable.
    ///
    /// Keys that can never be stored (nil, NaN) read as absent.
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn raw_get(&self, id: ObjectId, key: &Value) -> Result<Option<Value>> {
        let fields = self.fields(id)?;
        let Ok(key) = key.clone().into_key() else {
            return Ok(None);
        };
        Ok(fields.get(&key).cloned())
    }

    /// Writes a field without consulting any metatable.
    ///
    /// Writing nil removes the field.
    ///
    /// # Errors
    /// Returns an error if the table is not live, or `InvalidKey` for a nil
    /// or NaN key.
    pub fn raw_set(&mut self, id: ObjectId, key: Value, value: Value) -> Result<()> {
        let fields = self.fields_mut(id)?;
        let key = key.into_key()?;
        fields.set(key, value);
        Ok(())
    }

    /// Returns the border of a table's sequence part.
    ///
    /// This is the largest `n` such that the integer keys `1..=n` are all
    /// present.
    ///
    /// # Errors
    /// Returns an error if the table is not live.
    pub fn raw_len(&self, id: ObjectId) -> Result<i64> {
        let fields = self.fields(id)?;
        let mut n = 0;
        while fields.contains_key(&Value::Int(n + 1)) {
            n += 1;
        }
        Ok(n)
    }

    /// Returns the total number of live tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if there are no live tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates over all live table IDs.
    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.generation % 2 == 1) // Odd generation = alive
            .map(|(idx, slot)| ObjectId::new(idx as u64, slot.generation))
    }

    /// Returns the current generation for an index, if it exists.
    ///
    /// This is useful for debugging and testing.
    #[must_use]
    pub fn generation(&self, index: u64) -> Option<u32> {
        self.slots.get(index as usize).map(|slot| slot.generation)
    }
}
