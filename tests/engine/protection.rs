//! Integration tests for the metatable protection gate
//!
//! Tests the `__metatable` sentinel round trip.

use tabula_engine::Engine;
use tabula_foundation::{ErrorKind, Value};

#[test]
fn sentinel_round_trip() {
    let mut engine = Engine::new();
    let t = engine.create_table();
    let mt = engine.create_table();

    engine.set_metatable_guarded(t, Some(mt)).unwrap();
    assert_eq!(engine.get_metatable_visible(t).unwrap(), Some(Value::Object(mt)));

    engine
        .raw_set(mt, "__metatable".into(), "no peeking".into())
        .unwrap();
    assert_eq!(
        engine.get_metatable_visible(t).unwrap(),
        Some(Value::from("no peeking"))
    );

    let replacement = engine.create_table();
    let err = engine
        .set_metatable_guarded(t, Some(replacement))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ProtectedMetatable));

    let err = engine.set_metatable_guarded(t, None).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ProtectedMetatable));

    // The real association is untouched
    assert_eq!(engine.get_metatable(t).unwrap(), Some(mt));
}

#[test]
fn clearing_the_sentinel_unprotects() {
    let mut engine = Engine::new();
    let t = engine.create_table();
    let mt = engine.create_table();
    engine.set_metatable_guarded(t, Some(mt)).unwrap();
    engine.raw_set(mt, "__metatable".into(), Value::Int(0)).unwrap();
    assert!(engine.set_metatable_guarded(t, None).is_err());

    engine.raw_set(mt, "__metatable".into(), Value::Nil).unwrap();
    engine.set_metatable_guarded(t, None).unwrap();
    assert_eq!(engine.get_metatable_visible(t).unwrap(), None);
}

#[test]
fn protection_follows_the_metatable_not_the_subject() {
    let mut engine = Engine::new();
    let locked = engine
        .create_table_with([(Value::from("__metatable"), Value::Bool(true))])
        .unwrap();
    let a = engine.create_table();
    let b = engine.create_table();

    engine.set_metatable_guarded(a, Some(locked)).unwrap();
    assert!(engine.set_metatable_guarded(a, None).is_err());
    // b has no metatable yet, so it can adopt the locked one too
    engine.set_metatable_guarded(b, Some(locked)).unwrap();
    assert!(engine.set_metatable_guarded(b, None).is_err());
}
