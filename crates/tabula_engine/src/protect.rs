//! The metatable protection gate.
//!
//! A metatable whose `__metatable` slot is non-nil hides itself from
//! [`Engine::get_metatable_visible`] and refuses replacement through
//! [`Engine::set_metatable_guarded`]. Raw access through the storage layer
//! bypasses both.

use tabula_foundation::{ErrorKind, ObjectId, Result, Value};
use tracing::debug;

use crate::engine::Engine;
use crate::trace::TraceEvent;

impl Engine {
    /// Returns the metatable as the evaluator should see it.
    ///
    /// If the metatable defines `__metatable`, that slot's value is returned
    /// in place of the metatable itself.
    ///
    /// # Errors
    /// Returns an error if `obj` is not a live table.
    pub fn get_metatable_visible(&self, obj: ObjectId) -> Result<Option<Value>> {
        let Some(mt) = self.heap.get_metatable(obj)? else {
            return Ok(None);
        };
        Ok(Some(self.heap.protection(obj).unwrap_or(Value::Object(mt))))
    }

    /// Replaces the metatable of `obj` unless it is protected.
    ///
    /// Passing `None` removes the association.
    ///
    /// # Errors
    /// Returns `ProtectedMetatable` if the current metatable defines
    /// `__metatable`, or an error if `obj` or `metatable` is not live.
    pub fn set_metatable_guarded(
        &mut self,
        obj: ObjectId,
        metatable: Option<ObjectId>,
    ) -> Result<()> {
        match self.heap.set_metatable(obj, metatable) {
            Ok(()) => {
                debug!(%obj, ?metatable, "metatable changed");
                self.record(TraceEvent::MetatableChanged {
                    object: obj,
                    metatable,
                });
                Ok(())
            }
            Err(err) => {
                if matches!(err.kind, ErrorKind::ProtectedMetatable) {
                    self.record(TraceEvent::ProtectionDenied { object: obj });
                }
                Err(err)
            }
        }
    }
}
