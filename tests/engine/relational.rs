//! Integration tests for equality and ordering dispatch
//!
//! Tests the shared-handler rule, partial orders, and equality
//! short-circuits.

use std::cell::Cell;
use std::rc::Rc;

use tabula_engine::Engine;
use tabula_engine::handler::table_arg;
use tabula_foundation::{BinaryOp, ErrorKind, MetaMethod, ObjectId, Value};

use crate::table_with_slots;

/// Builds three "interval" tables sharing `__lt`/`__le` handlers that order
/// by containment: `a <= b` when `a`'s bounds lie within `b`'s.
fn intervals(engine: &mut Engine) -> (ObjectId, ObjectId, ObjectId) {
    fn bounds(engine: &Engine, id: ObjectId) -> (i64, i64) {
        let lo = engine.raw_get(id, &Value::from("lo")).ok().flatten();
        let hi = engine.raw_get(id, &Value::from("hi")).ok().flatten();
        (
            lo.and_then(|v| v.as_int()).unwrap_or(0),
            hi.and_then(|v| v.as_int()).unwrap_or(0),
        )
    }

    let le = engine.register_handler("within", |engine, args| {
        let (a, b) = (table_arg(args, 0, "within")?, table_arg(args, 1, "within")?);
        let ((alo, ahi), (blo, bhi)) = (bounds(engine, a), bounds(engine, b));
        Ok(Value::Bool(blo <= alo && ahi <= bhi))
    });
    let lt = engine.register_handler("strictly_within", |engine, args| {
        let (a, b) = (
            table_arg(args, 0, "strictly_within")?,
            table_arg(args, 1, "strictly_within")?,
        );
        let ((alo, ahi), (blo, bhi)) = (bounds(engine, a), bounds(engine, b));
        Ok(Value::Bool(blo <= alo && ahi <= bhi && (alo, ahi) != (blo, bhi)))
    });

    let mt = engine
        .create_table_with([
            (Value::from("__le"), Value::from(le)),
            (Value::from("__lt"), Value::from(lt)),
        ])
        .unwrap();
    let mut make = |lo: i64, hi: i64| {
        let t = engine
            .create_table_with([
                (Value::from("lo"), Value::Int(lo)),
                (Value::from("hi"), Value::Int(hi)),
            ])
            .unwrap();
        engine.set_metatable_guarded(t, Some(mt)).unwrap();
        t
    };
    (make(2, 3), make(0, 10), make(5, 20))
}

#[test]
fn containment_is_a_partial_order() {
    let mut engine = Engine::new();
    let (small, big, other) = intervals(&mut engine);

    assert!(engine.less_equal(&small.into(), &big.into()).unwrap());
    assert!(!engine.less_equal(&big.into(), &small.into()).unwrap());
    assert!(engine.less_than(&small.into(), &big.into()).unwrap());
    assert!(!engine.less_than(&big.into(), &big.into()).unwrap());

    // Neither contains the other
    assert!(!engine.less_equal(&big.into(), &other.into()).unwrap());
    assert!(!engine.less_equal(&other.into(), &big.into()).unwrap());
}

#[test]
fn greater_operators_swap_operands() {
    let mut engine = Engine::new();
    let (small, big, _) = intervals(&mut engine);

    assert_eq!(
        engine
            .dispatch_binary(BinaryOp::Gt, big.into(), small.into())
            .unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        engine
            .dispatch_binary(BinaryOp::Ge, small.into(), big.into())
            .unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn different_handlers_are_not_comparable() {
    let mut engine = Engine::new();
    let h1 = engine.register_handler("lt1", |_, _| Ok(Value::Bool(true)));
    let h2 = engine.register_handler("lt2", |_, _| Ok(Value::Bool(true)));
    let a = table_with_slots(&mut engine, &[("__lt", h1.into())]);
    let b = table_with_slots(&mut engine, &[("__lt", h2.into())]);

    let err = engine.less_than(&a.into(), &b.into()).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::NotComparable {
            op: MetaMethod::Lt,
            ..
        }
    ));
}

#[test]
fn le_is_not_emulated_through_lt() {
    let mut engine = Engine::new();
    let lt = engine.register_handler("lt", |_, _| Ok(Value::Bool(false)));
    let a = table_with_slots(&mut engine, &[("__lt", lt.into())]);
    let b = table_with_slots(&mut engine, &[("__lt", lt.into())]);

    assert!(!engine.less_than(&a.into(), &b.into()).unwrap());
    let err = engine.less_equal(&a.into(), &b.into()).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::NotComparable {
            op: MetaMethod::Le,
            ..
        }
    ));
}

#[test]
fn shared_eq_handler_runs_exactly_once() {
    let mut engine = Engine::new();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let eq = engine.register_handler("same_size", move |engine, args| {
        counter.set(counter.get() + 1);
        let a = table_arg(args, 0, "same_size")?;
        let b = table_arg(args, 1, "same_size")?;
        Ok(Value::Bool(engine.raw_len(a)? == engine.raw_len(b)?))
    });
    let a = table_with_slots(&mut engine, &[("__eq", eq.into())]);
    let b = table_with_slots(&mut engine, &[("__eq", eq.into())]);

    assert!(engine.equals(&a.into(), &b.into()).unwrap());
    assert_eq!(calls.get(), 1);

    assert_eq!(
        engine
            .dispatch_binary(BinaryOp::Ne, a.into(), b.into())
            .unwrap(),
        Value::Bool(false)
    );
    assert_eq!(calls.get(), 2);
}

#[test]
fn equality_short_circuits_without_handlers() {
    let mut engine = Engine::new();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let eq = engine.register_handler("eq", move |_, _| {
        counter.set(counter.get() + 1);
        Ok(Value::Bool(true))
    });
    let other = engine.register_handler("other", |_, _| Ok(Value::Bool(true)));
    let a = table_with_slots(&mut engine, &[("__eq", eq.into())]);
    let b = table_with_slots(&mut engine, &[("__eq", other.into())]);
    let plain = engine.create_table();

    // Identity never consults the handler
    assert!(engine.equals(&a.into(), &a.into()).unwrap());
    // Different or absent handlers compare false
    assert!(!engine.equals(&a.into(), &b.into()).unwrap());
    assert!(!engine.equals(&a.into(), &plain.into()).unwrap());
    // Mixed kinds compare false
    assert!(!engine.equals(&a.into(), &Value::from("a")).unwrap());
    assert_eq!(calls.get(), 0);

    assert!(engine.equals(&Value::Int(2), &Value::Float(2.0)).unwrap());
}

#[test]
fn non_callable_eq_slot_compares_false() {
    let mut engine = Engine::new();
    let shared = engine.create_table();
    let a = table_with_slots(&mut engine, &[("__eq", shared.into())]);
    let b = table_with_slots(&mut engine, &[("__eq", shared.into())]);

    assert!(!engine.equals(&a.into(), &b.into()).unwrap());
}

#[test]
fn mixed_number_ordering_agrees_with_equality() {
    let mut engine = Engine::new();
    let big = Value::Int(9_007_199_254_740_993);
    let float = Value::Float(9_007_199_254_740_992.0);

    assert!(!engine.equals(&big, &float).unwrap());
    assert_eq!(
        engine
            .dispatch_binary(BinaryOp::Le, big.clone(), float.clone())
            .unwrap(),
        Value::Bool(false)
    );
    assert_eq!(
        engine.dispatch_binary(BinaryOp::Gt, big, float).unwrap(),
        Value::Bool(true)
    );
    assert!(
        engine
            .less_than(&Value::Int(i64::MAX), &Value::Float(9_223_372_036_854_775_808.0))
            .unwrap()
    );
}
