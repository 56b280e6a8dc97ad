//! Integration tests for Value types
//!
//! Tests Value variants, key normalization, display, and operator slots.

use std::collections::HashSet;

use tabula_foundation::{
    BinaryOp, FieldMap, HandlerId, InvalidKey, MetaMethod, ObjectId, Type, UnaryOp, Value,
};

// =============================================================================
// Value Construction
// =============================================================================

#[test]
fn value_truthiness() {
    assert!(!Value::Nil.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(Value::Bool(true).is_truthy());
    assert!(Value::Int(0).is_truthy());
    assert!(Value::from("").is_truthy());
}

#[test]
fn value_types() {
    assert_eq!(Value::Nil.value_type(), Type::Nil);
    assert_eq!(Value::Float(1.5).value_type(), Type::Number);
    assert_eq!(Value::Object(ObjectId::new(0, 1)).value_type(), Type::Table);
    assert_eq!(Value::Handler(HandlerId(0)).value_type(), Type::Function);
    assert_eq!(Type::Bool.to_string(), "boolean");
}

#[test]
fn value_from_option() {
    assert_eq!(Value::from(None::<i64>), Value::Nil);
    assert_eq!(Value::from(Some(3_i64)), Value::Int(3));
}

// =============================================================================
// Keys
// =============================================================================

#[test]
fn integral_float_keys_collapse_to_int() {
    assert_eq!(Value::Float(3.0).into_key(), Ok(Value::Int(3)));
    assert_eq!(Value::Float(3.5).into_key(), Ok(Value::Float(3.5)));
}

#[test]
fn nil_and_nan_are_not_keys() {
    assert_eq!(Value::Nil.into_key(), Err(InvalidKey::Nil));
    assert_eq!(Value::Float(f64::NAN).into_key(), Err(InvalidKey::NaN));
}

#[test]
fn values_hash_by_identity() {
    let a = ObjectId::new(1, 1);
    let b = ObjectId::new(1, 3);
    let set: HashSet<Value> = [Value::Object(a), Value::Object(b), Value::Object(a)]
        .into_iter()
        .collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn field_map_snapshot_is_independent() {
    let mut map = FieldMap::new();
    map.set(Value::Int(1), Value::from("one"));
    let snapshot = map.clone();
    map.set(Value::Int(2), Value::from("two"));
    map.set(Value::Int(1), Value::Nil);

    assert_eq!(snapshot.len(), 1);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&Value::Int(2)), Some(&Value::from("two")));
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn structural_display() {
    assert_eq!(Value::Float(1.0).to_string(), "1.0");
    assert_eq!(Value::Float(f64::INFINITY).to_string(), "inf");
    assert_eq!(Value::Float(f64::NEG_INFINITY).to_string(), "-inf");
    assert_eq!(Value::Object(ObjectId::new(255, 1)).to_string(), "table: 0x000000ff");
    assert_eq!(Value::Handler(HandlerId(4)).to_string(), "function: builtin: 4");
}

// =============================================================================
// Operator Slots
// =============================================================================

#[test]
fn every_slot_round_trips_by_name() {
    for slot in MetaMethod::ALL {
        assert_eq!(MetaMethod::from_name(slot.name()), Some(slot));
    }
    assert_eq!(MetaMethod::from_name("__call"), None);
}

#[test]
fn derived_operators_share_slots() {
    assert_eq!(BinaryOp::Gt.metamethod(), MetaMethod::Lt);
    assert_eq!(BinaryOp::Ge.metamethod(), MetaMethod::Le);
    assert_eq!(BinaryOp::Ne.metamethod(), MetaMethod::Eq);
    assert_eq!(UnaryOp::Neg.metamethod(), MetaMethod::Unm);
    assert_eq!(UnaryOp::Len.metamethod(), MetaMethod::Len);
}

#[test]
fn only_index_slots_accept_tables() {
    let table_slots: Vec<_> = MetaMethod::ALL
        .into_iter()
        .filter(|slot| slot.allows_table())
        .collect();
    assert_eq!(table_slots, vec![MetaMethod::Index, MetaMethod::NewIndex]);
}
