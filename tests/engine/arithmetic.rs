//! Integration tests for arithmetic and concat dispatch
//!
//! Tests operand order, resolution failures, and handler errors.

use std::cell::RefCell;
use std::rc::Rc;

use tabula_engine::Engine;
use tabula_engine::handler::arg;
use tabula_foundation::{BinaryOp, Error, ErrorKind, MetaMethod, Type, UnaryOp, Value};

use crate::table_with_slots;

/// Registers a handler that records the arguments it receives.
fn recorder(engine: &mut Engine, log: &Rc<RefCell<Vec<Vec<Value>>>>) -> Value {
    let log = Rc::clone(log);
    engine
        .register_handler("record", move |_, args| {
            log.borrow_mut().push(args.to_vec());
            Ok(Value::from("handled"))
        })
        .into()
}

#[test]
fn handler_on_left_operand_only() {
    let mut engine = Engine::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let handler = recorder(&mut engine, &log);
    let t = table_with_slots(&mut engine, &[("__add", handler)]);

    let result = engine
        .dispatch_binary(BinaryOp::Add, t.into(), Value::Int(1))
        .unwrap();

    assert_eq!(result, Value::from("handled"));
    assert_eq!(*log.borrow(), vec![vec![Value::Object(t), Value::Int(1)]]);
}

#[test]
fn handler_on_right_operand_only_keeps_order() {
    let mut engine = Engine::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let handler = recorder(&mut engine, &log);
    let t = table_with_slots(&mut engine, &[("__add", handler)]);

    engine
        .dispatch_binary(BinaryOp::Add, Value::Int(1), t.into())
        .unwrap();

    assert_eq!(*log.borrow(), vec![vec![Value::Int(1), Value::Object(t)]]);
}

#[test]
fn left_operand_wins_when_both_have_handlers() {
    let mut engine = Engine::new();
    let left = engine.register_handler("left", |_, _| Ok(Value::from("left")));
    let right = engine.register_handler("right", |_, _| Ok(Value::from("right")));
    let a = table_with_slots(&mut engine, &[("__concat", left.into())]);
    let b = table_with_slots(&mut engine, &[("__concat", right.into())]);

    assert_eq!(
        engine
            .dispatch_binary(BinaryOp::Concat, a.into(), b.into())
            .unwrap(),
        Value::from("left")
    );
    assert_eq!(
        engine
            .dispatch_binary(BinaryOp::Concat, b.into(), a.into())
            .unwrap(),
        Value::from("right")
    );
}

#[test]
fn every_arithmetic_slot_dispatches() {
    let mut engine = Engine::new();
    let name = engine.register_handler("name", |engine, args| {
        // Report which slot fired by echoing the second operand
        Ok(engine.to_display_string(arg(args, 1)).into())
    });
    let slots: Vec<(&str, Value)> = ["__add", "__sub", "__mul", "__div", "__mod", "__pow"]
        .into_iter()
        .map(|slot| (slot, Value::from(name)))
        .collect();
    let t = table_with_slots(&mut engine, &slots);

    for op in [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
        BinaryOp::Pow,
    ] {
        let result = engine
            .dispatch_binary(op, t.into(), Value::from(op.symbol()))
            .unwrap();
        assert_eq!(result, Value::from(op.symbol()));
    }
}

#[test]
fn no_handler_is_unsupported() {
    let mut engine = Engine::new();
    let a = engine.create_table();
    let b = engine.create_table();

    let err = engine
        .dispatch_binary(BinaryOp::Add, a.into(), b.into())
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::UnsupportedOperation {
            op: MetaMethod::Add,
            operand_type: Type::Table
        }
    ));

    let err = engine
        .dispatch_binary(BinaryOp::Sub, Value::from("ten"), Value::Int(1))
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::UnsupportedOperation {
            operand_type: Type::String,
            ..
        }
    ));

    let err = engine.dispatch_unary(UnaryOp::Neg, a.into()).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::UnsupportedOperation {
            op: MetaMethod::Unm,
            operand_type: Type::Table
        }
    ));
}

#[test]
fn primitive_semantics() {
    let mut engine = Engine::new();
    let cases = [
        (BinaryOp::Add, Value::from("10"), Value::Int(1), Value::Int(11)),
        (BinaryOp::Div, Value::Int(1), Value::Int(4), Value::Float(0.25)),
        (BinaryOp::Mod, Value::Int(-1), Value::Int(5), Value::Int(4)),
        (BinaryOp::Pow, Value::Int(3), Value::Int(2), Value::Float(9.0)),
        (BinaryOp::Concat, Value::Int(1), Value::Int(2), Value::from("12")),
    ];
    for (op, a, b, expected) in cases {
        assert_eq!(engine.dispatch_binary(op, a, b).unwrap(), expected);
    }

    let err = engine
        .dispatch_binary(BinaryOp::Mod, Value::Int(1), Value::Int(0))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DivisionByZero));
}

#[test]
fn length_prefers_handler_then_border() {
    let mut engine = Engine::new();
    let len = engine.register_handler("len", |_, _| Ok(Value::Int(99)));
    let t = table_with_slots(&mut engine, &[("__len", len.into())]);
    engine.raw_set(t, Value::Int(1), Value::Bool(true)).unwrap();

    assert_eq!(
        engine.dispatch_unary(UnaryOp::Len, t.into()).unwrap(),
        Value::Int(99)
    );

    let plain = engine.create_table();
    engine.raw_set(plain, Value::Int(1), Value::Bool(true)).unwrap();
    engine.raw_set(plain, Value::Int(2), Value::Bool(true)).unwrap();
    assert_eq!(
        engine.dispatch_unary(UnaryOp::Len, plain.into()).unwrap(),
        Value::Int(2)
    );
}

#[test]
fn handler_errors_propagate_with_kind_intact() {
    let mut engine = Engine::new();
    let fail = engine.register_handler("union", |_, _| Err(Error::handler("not a set")));
    let t = table_with_slots(&mut engine, &[("__add", fail.into())]);

    let err = engine
        .dispatch_binary(BinaryOp::Add, t.into(), Value::Int(1))
        .unwrap_err();
    assert!(matches!(&err.kind, ErrorKind::Handler(msg) if msg == "not a set"));
    assert_eq!(err.frames(), ["__add handler 'union'"]);
}

#[test]
fn nested_handler_failures_accumulate_frames() {
    let mut engine = Engine::new();
    let inner = engine.register_handler("inner", |_, _| Err(Error::handler("deep")));
    let t = table_with_slots(&mut engine, &[("__sub", inner.into())]);
    let outer = engine.register_handler("outer", move |engine, _| {
        engine.dispatch_binary(BinaryOp::Sub, t.into(), Value::Int(0))
    });
    let u = table_with_slots(&mut engine, &[("__mul", outer.into())]);

    let err = engine
        .dispatch_binary(BinaryOp::Mul, u.into(), Value::Int(0))
        .unwrap_err();
    assert!(err.is_handler_error());
    assert_eq!(
        err.frames(),
        ["__sub handler 'inner'", "__mul handler 'outer'"]
    );
    assert_eq!(engine.call_depth(), 0);
}
