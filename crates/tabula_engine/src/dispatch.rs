//! Operator and table-access dispatch.
//!
//! Each entry point tries the primitive semantics first, then asks the
//! resolver for a handler and invokes it at most once. Index reads and
//! writes may follow a bounded chain of table redirections.

use tabula_foundation::{BinaryOp, Error, MetaMethod, ObjectId, Result, UnaryOp, Value};
use tracing::trace;

use crate::arith;
use crate::engine::Engine;
use crate::resolve::{self, Handler, Shared};
use crate::trace::TraceEvent;

impl Engine {
    /// Evaluates a binary operator.
    ///
    /// Comparison operators return `Value::Bool`. `a > b` is evaluated as
    /// `b < a`, `a >= b` as `b <= a`, and `a ~= b` as the negation of
    /// equality.
    ///
    /// # Errors
    /// Returns `UnsupportedOperation` when neither operand resolves a
    /// handler for an arithmetic or concat operator, `NotComparable` when
    /// ordering operands do not share a handler, and any failure raised by
    /// the invoked handler.
    pub fn dispatch_binary(&mut self, op: BinaryOp, a: Value, b: Value) -> Result<Value> {
        match op {
            BinaryOp::Eq => self.equals(&a, &b).map(Value::Bool),
            BinaryOp::Ne => self.equals(&a, &b).map(|eq| Value::Bool(!eq)),
            BinaryOp::Lt => self.less_than(&a, &b).map(Value::Bool),
            BinaryOp::Le => self.less_equal(&a, &b).map(Value::Bool),
            BinaryOp::Gt => self.less_than(&b, &a).map(Value::Bool),
            BinaryOp::Ge => self.less_equal(&b, &a).map(Value::Bool),
            BinaryOp::Concat => match arith::concat(&a, &b) {
                Some(value) => Ok(value),
                None => self.binary_handler(MetaMethod::Concat, &a, &b, |v| {
                    arith::concat_text(v).is_some()
                }),
            },
            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::Pow => {
                let slot = op.metamethod();
                match arith::arith(slot, &a, &b)? {
                    Some(value) => Ok(value),
                    None => self.binary_handler(slot, &a, &b, |v| arith::to_number(v).is_some()),
                }
            }
        }
    }

    /// Evaluates a unary operator.
    ///
    /// `#` on a table without `__len` yields its raw sequence border.
    ///
    /// # Errors
    /// Returns `UnsupportedOperation` when the operand has neither a
    /// primitive form nor a handler, and any failure raised by the handler.
    pub fn dispatch_unary(&mut self, op: UnaryOp, a: Value) -> Result<Value> {
        let slot = op.metamethod();
        let primitive = match op {
            UnaryOp::Neg => arith::negate(&a),
            UnaryOp::Len => arith::string_len(&a),
        };
        if let Some(value) = primitive {
            return Ok(value);
        }

        if let Some(resolved) = resolve::resolve_unary(&self.heap, slot, &a) {
            self.record(TraceEvent::Resolved {
                slot,
                operand: resolved.operand,
            });
            return self.invoke(Some(slot), &resolved.handler.to_value(), &[a]);
        }

        if let (UnaryOp::Len, Some(id)) = (op, a.as_object()) {
            return self.heap.raw_len(id).map(Value::Int);
        }

        self.record(TraceEvent::ResolutionFailed { slot });
        Err(Error::unsupported_operation(slot, a.value_type()))
    }

    /// Resolves and invokes an arithmetic or concat handler with `(a, b)`.
    ///
    /// `usable` tells which operand lacked a primitive form, for the error.
    fn binary_handler(
        &mut self,
        slot: MetaMethod,
        a: &Value,
        b: &Value,
        usable: fn(&Value) -> bool,
    ) -> Result<Value> {
        let Some(resolved) = resolve::resolve_binary(&self.heap, slot, a, b) else {
            trace!(%slot, "no handler on either operand");
            self.record(TraceEvent::ResolutionFailed { slot });
            let culprit = if usable(a) { b } else { a };
            return Err(Error::unsupported_operation(slot, culprit.value_type()));
        };

        trace!(%slot, operand = %resolved.operand, "resolved handler");
        self.record(TraceEvent::Resolved {
            slot,
            operand: resolved.operand,
        });
        self.invoke(
            Some(slot),
            &resolved.handler.to_value(),
            &[a.clone(), b.clone()],
        )
    }

    /// Equality with `__eq` fallback.
    ///
    /// Primitively equal or identical values are equal without consulting
    /// any handler. Two tables whose metatables hold the same `__eq` handler
    /// invoke it once; every other pairing is unequal.
    ///
    /// # Errors
    /// Returns only failures raised by the `__eq` handler itself.
    pub fn equals(&mut self, a: &Value, b: &Value) -> Result<bool> {
        if arith::raw_equal(a, b) {
            return Ok(true);
        }
        if !matches!((a, b), (Value::Object(_), Value::Object(_))) {
            return Ok(false);
        }

        match resolve::resolve_shared(&self.heap, MetaMethod::Eq, a, b) {
            Shared::Agreed(handler @ Handler::Function(_)) => {
                trace!("shared __eq handler");
                let result = self.invoke(
                    Some(MetaMethod::Eq),
                    &handler.to_value(),
                    &[a.clone(), b.clone()],
                )?;
                Ok(result.is_truthy())
            }
            _ => Ok(false),
        }
    }

    /// `a < b` with `__lt` fallback.
    ///
    /// # Errors
    /// Returns `NotComparable` unless both operands are numbers, both are
    /// strings, or both resolve the same `__lt` handler.
    pub fn less_than(&mut self, a: &Value, b: &Value) -> Result<bool> {
        match arith::less_than(a, b) {
            Some(result) => Ok(result),
            None => self.ordering(MetaMethod::Lt, a, b),
        }
    }

    /// `a <= b` with `__le` fallback.
    ///
    /// There is no emulation of `__le` through `__lt`.
    ///
    /// # Errors
    /// Returns `NotComparable` unless both operands are numbers, both are
    /// strings, or both resolve the same `__le` handler.
    pub fn less_equal(&mut self, a: &Value, b: &Value) -> Result<bool> {
        match arith::less_equal(a, b) {
            Some(result) => Ok(result),
            None => self.ordering(MetaMethod::Le, a, b),
        }
    }

    fn ordering(&mut self, slot: MetaMethod, a: &Value, b: &Value) -> Result<bool> {
        match resolve::resolve_shared(&self.heap, slot, a, b) {
            Shared::Agreed(handler) => {
                let result = self.invoke(Some(slot), &handler.to_value(), &[a.clone(), b.clone()])?;
                Ok(result.is_truthy())
            }
            Shared::Disagreed => {
                self.record(TraceEvent::ResolutionFailed { slot });
                Err(Error::not_comparable(slot, a.value_type(), b.value_type()))
            }
        }
    }

    /// Reads `obj[key]`, falling back through `__index` when the key is
    /// absent.
    ///
    /// A handler's nil result reads as absent.
    ///
    /// # Errors
    /// Returns `ChainDepthExceeded` when table redirections exceed the
    /// configured bound, `NotIndexable` when `__index` holds neither a
    /// handler nor a table, and any failure raised by the handler.
    pub fn dispatch_index_read(&mut self, obj: ObjectId, key: &Value) -> Result<Option<Value>> {
        let slot = MetaMethod::Index;
        let mut current = obj;
        let mut hops = 0;

        loop {
            if let Some(value) = self.heap.raw_get(current, key)? {
                return Ok(Some(value));
            }

            match resolve::lookup(&self.heap, slot, &Value::Object(current)) {
                None => {
                    self.record(TraceEvent::RawFallback {
                        slot,
                        object: current,
                    });
                    return Ok(None);
                }
                Some(handler @ Handler::Function(_)) => {
                    let result = self.invoke(
                        Some(slot),
                        &handler.to_value(),
                        &[Value::Object(current), key.clone()],
                    )?;
                    return Ok((!result.is_nil()).then_some(result));
                }
                Some(Handler::Table(next)) => {
                    hops += 1;
                    self.hop(slot, current, next, hops)?;
                    current = next;
                }
                Some(Handler::Other(value)) => {
                    return Err(Error::not_indexable(value.value_type()));
                }
            }
        }
    }

    /// Writes `obj[key] = value`, intercepting through `__newindex` when the
    /// key is absent.
    ///
    /// Keys already present are overwritten raw. A handler replaces the
    /// store entirely.
    ///
    /// # Errors
    /// Returns `InvalidKey` when the raw store gets a nil or NaN key,
    /// `ChainDepthExceeded` when table redirections exceed the configured
    /// bound, `NotIndexable` when `__newindex` holds neither a handler nor a
    /// table, and any failure raised by the handler.
    pub fn dispatch_index_write(&mut self, obj: ObjectId, key: Value, value: Value) -> Result<()> {
        let slot = MetaMethod::NewIndex;
        let mut current = obj;
        let mut hops = 0;

        loop {
            if self.heap.raw_get(current, &key)?.is_some() {
                return self.heap.raw_set(current, key, value);
            }

            match resolve::lookup(&self.heap, slot, &Value::Object(current)) {
                None => {
                    self.record(TraceEvent::RawFallback {
                        slot,
                        object: current,
                    });
                    return self.heap.raw_set(current, key, value);
                }
                Some(handler @ Handler::Function(_)) => {
                    self.invoke(
                        Some(slot),
                        &handler.to_value(),
                        &[Value::Object(current), key, value],
                    )?;
                    return Ok(());
                }
                Some(Handler::Table(next)) => {
                    hops += 1;
                    self.hop(slot, current, next, hops)?;
                    current = next;
                }
                Some(Handler::Other(other)) => {
                    return Err(Error::not_indexable(other.value_type()));
                }
            }
        }
    }

    fn hop(&mut self, slot: MetaMethod, from: ObjectId, to: ObjectId, hops: usize) -> Result<()> {
        let limit = self.config.max_chain_depth;
        if hops > limit {
            trace!(%slot, limit, "redirection chain too long");
            return Err(Error::chain_depth_exceeded(slot, limit));
        }
        trace!(%slot, %from, %to, hops, "following redirection");
        self.record(TraceEvent::ChainHop {
            slot,
            from,
            to,
            hops,
        });
        Ok(())
    }
}
