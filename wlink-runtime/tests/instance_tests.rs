//! Instantiation: import checks, allocation, segments, start functions

use std::{
    io::Write,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use wlink_error::{Error, ErrorCategory, codes};
use wlink_host::{HostBuilder, HostFunctionHandler};
use wlink_runtime::{Engine, EngineConfig, Extern, Instance, Module, Store};
use wlink_types::{FuncType, GlobalType, Mutability, Value, ValueType};

fn compile(engine: &Engine, text: &str) -> Module {
    Module::new(engine, wat::parse_str(text).unwrap()).unwrap()
}

fn host_instance(store: &mut Store, engine: &Engine, host: HostBuilder) -> Instance {
    let module = Module::from_host(engine, host.build().unwrap());
    Instance::new(store, &module, &[]).unwrap()
}

#[test]
fn test_data_segment_is_copied_into_memory() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let module = compile(
        &engine,
        r#"(module (memory (export "memory") 1 2) (data (i32.const 8) "hi"))"#,
    );
    let instance = Instance::new(&mut store, &module, &[]).unwrap();
    let memory = instance.get_memory(&store).unwrap();

    let mut buffer = [0u8; 2];
    memory.read(&store, 8, &mut buffer).unwrap();
    assert_eq!(&buffer, b"hi");
    assert_eq!(memory.size_pages(&store).unwrap(), 1);
    assert_eq!(memory.ty(&store).unwrap().limits.max, Some(2));

    memory.write(&mut store, 0, b"ok").unwrap();
    let error = memory.write(&mut store, 65535, b"ab").unwrap_err();
    assert_eq!(error.code, codes::OUT_OF_BOUNDS);
}

#[test]
fn test_out_of_bounds_data_segment_fails_instantiation() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let module = compile(&engine, r#"(module (memory 1) (data (i32.const 65535) "ab"))"#);

    let error = Instance::new(&mut store, &module, &[]).unwrap_err();
    assert!(error.is_instantiation_failure());
    assert_eq!(error.code, codes::SEGMENT_OUT_OF_BOUNDS);
    assert_eq!(store.instance_count(), 0);
}

#[test]
fn test_out_of_bounds_element_segment_fails_instantiation() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let module = compile(&engine, "(module (table 1 funcref) (func $f) (elem (i32.const 1) $f))");

    let error = Instance::new(&mut store, &module, &[]).unwrap_err();
    assert!(error.is_instantiation_failure());
    assert_eq!(error.code, codes::SEGMENT_OUT_OF_BOUNDS);
}

#[test]
fn test_element_segment_fills_table() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let module = compile(
        &engine,
        r#"(module (table (export "t") 2 funcref) (func $f) (elem (i32.const 1) $f))"#,
    );
    let instance = Instance::new(&mut store, &module, &[]).unwrap();
    let table = instance.get_table(&store, "t").unwrap();

    assert_eq!(table.size(&store).unwrap(), 2);
    assert_eq!(table.get(&store, 0).unwrap(), Value::FuncRef(None));
    assert!(matches!(table.get(&store, 1).unwrap(), Value::FuncRef(Some(_))));
    assert!(table.get(&store, 2).is_err());
}

#[test]
fn test_globals_initialise_and_respect_mutability() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let env = host_instance(
        &mut store,
        &engine,
        HostBuilder::new("env").with_global(
            "base",
            GlobalType::new(ValueType::I32, Mutability::Const),
            Value::I32(1024),
        ),
    );
    let module = compile(
        &engine,
        r#"(module
            (import "env" "base" (global i32))
            (global (export "copy") i32 (global.get 0))
            (global (export "counter") (mut i64) (i64.const 7)))"#,
    );
    let base = env.get_export(&store, "base").unwrap();
    let instance = Instance::new(&mut store, &module, &[base]).unwrap();

    let copy = instance.get_global(&store, "copy").unwrap();
    assert_eq!(copy.get(&store).unwrap(), Value::I32(1024));
    let error = copy.set(&mut store, Value::I32(1)).unwrap_err();
    assert_eq!(error.code, codes::IMMUTABLE_GLOBAL);

    let counter = instance.get_global(&store, "counter").unwrap();
    counter.set(&mut store, Value::I64(8)).unwrap();
    assert_eq!(counter.get(&store).unwrap(), Value::I64(8));
    assert!(counter.set(&mut store, Value::I32(8)).unwrap_err().is_type_error());
}

#[test]
fn test_import_count_and_type_are_checked() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let module = compile(&engine, r#"(module (import "env" "f" (func (param i32))))"#);

    let error = Instance::new(&mut store, &module, &[]).unwrap_err();
    assert_eq!(error.code, codes::IMPORT_COUNT_MISMATCH);

    let env = host_instance(
        &mut store,
        &engine,
        HostBuilder::new("env").with_function(
            "f",
            FuncType::new([ValueType::I64], []),
            HostFunctionHandler::new(|_, _| Ok(vec![])),
        ),
    );
    let f = env.get_export(&store, "f").unwrap();
    let error = Instance::new(&mut store, &module, &[f]).unwrap_err();
    assert_eq!(error.code, codes::IMPORT_TYPE_MISMATCH);
    assert_eq!(error.subject(), Some("f"));
}

#[test]
fn test_values_from_another_store_are_rejected() {
    let engine = Engine::default();
    let mut other = Store::new(&engine);
    let env = host_instance(
        &mut other,
        &engine,
        HostBuilder::new("env").with_function(
            "f",
            FuncType::new([], []),
            HostFunctionHandler::new(|_, _| Ok(vec![])),
        ),
    );
    let f = env.get_export(&other, "f").unwrap();

    let mut store = Store::new(&engine);
    let module = compile(&engine, r#"(module (import "env" "f" (func)))"#);
    let error = Instance::new(&mut store, &module, &[f]).unwrap_err();
    assert!(error.is_instantiation_failure());
    assert_eq!(error.code, codes::FOREIGN_STORE);
}

#[test]
fn test_module_from_another_engine_is_rejected() {
    let module = compile(&Engine::default(), "(module)");
    let mut store = Store::new(&Engine::default());
    let error = Instance::new(&mut store, &module, &[]).unwrap_err();
    assert!(error.is_instantiation_failure());
}

#[test]
fn test_memory_limit_is_enforced() {
    let engine = Engine::new(EngineConfig::new().with_max_memory_pages(1));
    let mut store = Store::new(&engine);
    let module = compile(&engine, "(module (memory 2))");

    let error = Instance::new(&mut store, &module, &[]).unwrap_err();
    assert!(error.is_instantiation_failure());
    assert_eq!(error.root_cause().category, ErrorCategory::Resource);
    assert_eq!(error.root_cause().code, codes::RESOURCE_LIMIT_EXCEEDED);
}

#[test]
fn test_host_start_function_runs_once() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let env = host_instance(
        &mut store,
        &engine,
        HostBuilder::new("env").with_function(
            "init",
            FuncType::new([], []),
            HostFunctionHandler::new(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(vec![])
            }),
        ),
    );
    let module = compile(&engine, r#"(module (import "env" "init" (func $init)) (start $init))"#);
    let init = env.get_export(&store, "init").unwrap();

    Instance::new(&mut store, &module, &[init]).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failing_start_function_fails_instantiation() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let env = host_instance(
        &mut store,
        &engine,
        HostBuilder::new("env").with_function(
            "init",
            FuncType::new([], []),
            HostFunctionHandler::new(|_, _| Err(Error::trap("boom"))),
        ),
    );
    let module = compile(&engine, r#"(module (import "env" "init" (func $init)) (start $init))"#);
    let init = env.get_export(&store, "init").unwrap();

    let error = Instance::new(&mut store, &module, &[init]).unwrap_err();
    assert_eq!(error.code, codes::START_FUNCTION_FAILED);
    assert!(error.cause().unwrap().is_trap());

    let wasm_start = compile(&engine, "(module (func $s) (start $s))");
    let error = Instance::new(&mut store, &wasm_start, &[]).unwrap_err();
    assert_eq!(error.code, codes::START_FUNCTION_FAILED);
    assert!(error.cause().unwrap().is_not_supported());
}

#[test]
fn test_host_function_sees_caller_memory() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let env = host_instance(
        &mut store,
        &engine,
        HostBuilder::new("env").with_function(
            "peek",
            FuncType::new([ValueType::I32], [ValueType::I32]),
            HostFunctionHandler::new(|ctx, args| {
                let address = args[0].as_i32().unwrap_or_default() as usize;
                let byte = match ctx.memory() {
                    Some(memory) => memory.get(address).map_or(-2, |b| i32::from(*b)),
                    None => -1,
                };
                Ok(vec![Value::I32(byte)])
            }),
        ),
    );
    let peek = env.get_func(&store, "peek").unwrap();
    let guest = compile(
        &engine,
        r#"(module
            (import "env" "peek" (func (param i32) (result i32)))
            (memory (export "memory") 1)
            (data (i32.const 0) "\2a"))"#,
    );
    let guest = Instance::new(&mut store, &guest, &[Extern::Func(peek)]).unwrap();

    assert_eq!(peek.call_as(&mut store, &guest, &[Value::I32(0)]).unwrap(), [Value::I32(42)]);
    assert_eq!(peek.call(&mut store, &[Value::I32(0)]).unwrap(), [Value::I32(-1)]);
    assert!(peek.call(&mut store, &[Value::I64(0)]).unwrap_err().is_type_error());
}

#[test]
fn test_wasm_functions_are_not_executed() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let module = compile(&engine, r#"(module (func (export "run") (param i32)))"#);
    let instance = Instance::new(&mut store, &module, &[]).unwrap();
    let run = instance.get_func(&store, "run").unwrap();

    assert_eq!(run.ty(&store).unwrap(), FuncType::new([ValueType::I32], []));
    assert!(run.call(&mut store, &[Value::I32(1)]).unwrap_err().is_not_supported());
    assert!(run.call(&mut store, &[]).unwrap_err().is_type_error());
}

#[test]
fn test_exports_keep_declaration_order() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let module = compile(
        &engine,
        r#"(module (func (export "b")) (memory (export "memory") 1) (func (export "a")))"#,
    );
    let names: Vec<_> = module.exports().iter().map(|export| export.name.as_str()).collect();
    assert_eq!(names, ["b", "memory", "a"]);

    let instance = Instance::new(&mut store, &module, &[]).unwrap();
    let names: Vec<_> =
        instance.exports(&store).unwrap().iter().map(|export| export.name.clone()).collect();
    assert_eq!(names, ["b", "memory", "a"]);
    assert!(instance.get_export(&store, "missing").is_none());

    let other = Store::new(&engine);
    assert!(instance.exports(&other).is_err());
}

#[test]
fn test_module_from_file() {
    let engine = Engine::default();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&wat::parse_str(r#"(module $named (import "env" "f" (func)))"#).unwrap())
        .unwrap();

    let module = Module::from_file(&engine, file.path()).unwrap();
    assert_eq!(module.name(), Some("named"));
    assert_eq!(module.imports()[0].to_string(), "\"env\" \"f\": func ->");
}

#[test]
fn test_segments_are_not_applied_when_one_is_out_of_bounds() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let provider = compile(&engine, r#"(module (memory (export "memory") 1))"#);
    let provider = Instance::new(&mut store, &provider, &[]).unwrap();
    let memory = provider.get_memory(&store).unwrap();

    let module = compile(
        &engine,
        r#"(module
            (import "env" "memory" (memory 1))
            (data (i32.const 0) "first")
            (data (i32.const 65535) "second"))"#,
    );
    let error = Instance::new(&mut store, &module, &[Extern::Memory(memory)]).unwrap_err();
    assert_eq!(error.code, codes::SEGMENT_OUT_OF_BOUNDS);

    let mut buffer = [0xFFu8; 5];
    memory.read(&store, 0, &mut buffer).unwrap();
    assert_eq!(buffer, [0; 5]);
    assert_eq!(store.instance_count(), 1);
}

#[test]
fn test_failed_start_function_does_not_register_instance() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let env = host_instance(
        &mut store,
        &engine,
        HostBuilder::new("env").with_function(
            "init",
            FuncType::new([], []),
            HostFunctionHandler::new(|_, _| Err(Error::trap("boom"))),
        ),
    );
    let module = compile(&engine, r#"(module (import "env" "init" (func $init)) (start $init))"#);
    let init = env.get_export(&store, "init").unwrap();

    for _ in 0..2 {
        assert!(Instance::new(&mut store, &module, &[init]).is_err());
    }
    assert_eq!(store.instance_count(), 1);
}
