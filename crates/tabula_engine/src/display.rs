//! String conversion through `__tostring`.

use tabula_foundation::{Error, MetaMethod, Result, Type, Value};
use tracing::warn;

use crate::arith;
use crate::engine::Engine;
use crate::resolve;

impl Engine {
    /// Converts a value to its display string, propagating failures.
    ///
    /// A table whose metatable has a `__tostring` handler renders as the
    /// handler's result; a number result is formatted. Everything else uses
    /// the structural rendering of [`Value`]'s `Display`.
    ///
    /// # Errors
    /// Returns `InvalidHandlerResult` when the handler returns something
    /// other than a string or number, and any failure the handler raises.
    pub fn try_to_display_string(&mut self, value: &Value) -> Result<String> {
        let slot = MetaMethod::ToString;
        let Some(resolved) = resolve::resolve_unary(&self.heap, slot, value) else {
            return Ok(value.to_string());
        };

        let result = self.invoke(Some(slot), &resolved.handler.to_value(), &[value.clone()])?;
        arith::concat_text(&result)
            .ok_or_else(|| Error::invalid_handler_result(slot, Type::String, result.value_type()))
    }

    /// Converts a value to its display string. Never fails.
    ///
    /// When the `__tostring` handler fails, the failure is logged and the
    /// structural rendering is returned instead.
    pub fn to_display_string(&mut self, value: &Value) -> String {
        match self.try_to_display_string(value) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "__tostring failed; using default rendering");
                value.to_string()
            }
        }
    }
}
