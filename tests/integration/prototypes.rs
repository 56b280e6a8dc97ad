//! Prototype-style inheritance through `__index` chains.

use tabula_engine::handler::{arg, table_arg};
use tabula_engine::{Engine, EngineConfig};
use tabula_foundation::{ErrorKind, ObjectId, Value};

/// Makes `child` inherit from `parent` through a fresh metatable.
fn inherit(engine: &mut Engine, child: ObjectId, parent: ObjectId) {
    let mt = engine
        .create_table_with([(Value::from("__index"), parent.into())])
        .unwrap();
    engine.set_metatable_guarded(child, Some(mt)).unwrap();
}

#[test]
fn methods_resolve_through_the_chain() {
    let mut engine = Engine::new();
    let describe = engine.register_handler("describe", |engine, args| {
        let this = table_arg(args, 0, "describe")?;
        let sound = engine
            .dispatch_index_read(this, &Value::from("sound"))?
            .unwrap_or(Value::from("..."));
        Ok(Value::from(format!("says {sound}")))
    });

    let animal = engine
        .create_table_with([
            (Value::from("describe"), describe.into()),
            (Value::from("legs"), Value::Int(4)),
        ])
        .unwrap();
    let dog = engine
        .create_table_with([(Value::from("sound"), Value::from("woof"))])
        .unwrap();
    inherit(&mut engine, dog, animal);
    let rex = engine.create_table();
    inherit(&mut engine, rex, dog);

    let method = engine
        .dispatch_index_read(rex, &Value::from("describe"))
        .unwrap()
        .unwrap();
    let text = engine.call(&method, &[rex.into()]).unwrap();
    assert_eq!(text, Value::from("says woof"));

    assert_eq!(
        engine.dispatch_index_read(rex, &Value::from("legs")).unwrap(),
        Some(Value::Int(4))
    );
}

#[test]
fn writes_land_on_the_instance() {
    let mut engine = Engine::new();
    let base = engine
        .create_table_with([(Value::from("hp"), Value::Int(10))])
        .unwrap();
    let unit = engine.create_table();
    inherit(&mut engine, unit, base);

    engine
        .dispatch_index_write(unit, Value::from("hp"), Value::Int(7))
        .unwrap();

    assert_eq!(engine.raw_get(unit, &Value::from("hp")).unwrap(), Some(Value::Int(7)));
    assert_eq!(engine.raw_get(base, &Value::from("hp")).unwrap(), Some(Value::Int(10)));
}

#[test]
fn read_only_proxy_rejects_writes() {
    let mut engine = Engine::new();
    let reject = engine.register_handler("readonly", |_, args| {
        Err(tabula_foundation::Error::handler(format!(
            "attempt to update a read-only table (key {})",
            arg(args, 1)
        )))
    });
    let data = engine
        .create_table_with([(Value::from("ratio"), Value::Float(2.5))])
        .unwrap();
    let proxy = engine.create_table();
    let mt = engine
        .create_table_with([
            (Value::from("__index"), data.into()),
            (Value::from("__newindex"), reject.into()),
            (Value::from("__metatable"), Value::from("read-only")),
        ])
        .unwrap();
    engine.set_metatable_guarded(proxy, Some(mt)).unwrap();

    assert_eq!(
        engine.dispatch_index_read(proxy, &Value::from("ratio")).unwrap(),
        Some(Value::Float(2.5))
    );

    let err = engine
        .dispatch_index_write(proxy, Value::from("ratio"), Value::Int(3))
        .unwrap_err();
    assert!(matches!(&err.kind, ErrorKind::Handler(msg) if msg.ends_with("(key ratio)")));
    assert!(matches!(
        engine.set_metatable_guarded(proxy, None).unwrap_err().kind,
        ErrorKind::ProtectedMetatable
    ));
    assert_eq!(
        engine.get_metatable_visible(proxy).unwrap(),
        Some(Value::from("read-only"))
    );
}

#[test]
fn self_recursive_index_handler_hits_call_limit() {
    let mut engine = Engine::with_config(EngineConfig::default().with_max_call_depth(16));
    let recurse = engine.register_handler("recurse", |engine, args| {
        let this = table_arg(args, 0, "recurse")?;
        Ok(engine
            .dispatch_index_read(this, arg(args, 1))?
            .unwrap_or(Value::Nil))
    });
    let mt = engine
        .create_table_with([(Value::from("__index"), recurse.into())])
        .unwrap();
    let t = engine.create_table();
    engine.set_metatable_guarded(t, Some(mt)).unwrap();

    let err = engine.dispatch_index_read(t, &Value::from("x")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CallDepthExceeded { limit: 16 }));
    assert_eq!(err.frames().len(), 16);
    assert_eq!(engine.call_depth(), 0);

    // The engine stays usable after the failure
    engine.raw_set(t, "x".into(), Value::Int(1)).unwrap();
    assert_eq!(
        engine.dispatch_index_read(t, &Value::from("x")).unwrap(),
        Some(Value::Int(1))
    );
}
