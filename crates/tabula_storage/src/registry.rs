//! Object-to-metatable associations.
//!
//! The registry is a side table: tables do not own their metatables, and a
//! metatable is just another table in the [`ObjectStore`]. Associations are
//! weak in both directions. A destroyed subject's entry is removed by
//! [`Heap::destroy`](crate::Heap::destroy), and an entry pointing at a
//! destroyed metatable reads as absent until [`MetatableRegistry::prune`]
//! drops it.

use tabula_foundation::ObjectId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::object::ObjectStore;

/// Many-to-one map from subject tables to their metatables.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetatableRegistry {
    links: im::HashMap<ObjectId, ObjectId>,
}

impl MetatableRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded metatable of `obj`, without any liveness check.
    #[must_use]
    pub fn get(&self, obj: ObjectId) -> Option<ObjectId> {
        self.links.get(&obj).copied()
    }

    /// Replaces the association of `obj`, ignoring `__metatable` protection.
    ///
    /// This is raw access: the protection gate never routes through it.
    /// Returns the previous metatable.
    pub fn set_unchecked(&mut self, obj: ObjectId, metatable: Option<ObjectId>) -> Option<ObjectId> {
        match metatable {
            Some(mt) => self.links.insert(obj, mt),
            None => self.links.remove(&obj),
        }
    }

    /// Removes the association of `obj`, returning the previous metatable.
    pub fn remove(&mut self, obj: ObjectId) -> Option<ObjectId> {
        self.links.remove(&obj)
    }

    /// Drops every association whose subject or metatable is no longer live.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self, store: &ObjectStore) -> usize {
        let before = self.links.len();
        self.links
            .retain(|obj, mt| store.exists(*obj) && store.exists(*mt));
        before - self.links.len()
    }

    /// Returns the number of recorded associations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if no associations are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterates over `(subject, metatable)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, ObjectId)> + '_ {
        self.links.iter().map(|(obj, mt)| (*obj, *mt))
    }

    /// Returns every subject currently associated with `metatable`.
    #[must_use]
    pub fn subjects_of(&self, metatable: ObjectId) -> Vec<ObjectId> {
        let mut subjects: Vec<_> = self
            .links
            .iter()
            .filter(|(_, mt)| **mt == metatable)
            .map(|(obj, _)| *obj)
            .collect();
        subjects.sort();
        subjects
    }
}
