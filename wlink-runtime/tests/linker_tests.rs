//! Import resolution: first-match selection, policies and instantiation

use proptest::prelude::*;
use wlink_error::codes;
use wlink_host::{HostBuilder, HostFunctionHandler};
use wlink_runtime::{
    Engine, EngineConfig, Extern, Instance, Linker, MatchPolicy, Module, ProvidedExport, Provider,
    Store, resolve_and_instantiate, resolve_imports,
};
use wlink_types::{ExportType, FuncType, ValueType};

fn wasi_like_host() -> HostBuilder {
    let ok = || HostFunctionHandler::new(|_, _| Ok(vec![wlink_types::Value::I32(0)]));
    HostBuilder::new("wasi_snapshot_preview1")
        .with_function(
            "fd_write",
            FuncType::new([ValueType::I32; 4], [ValueType::I32]),
            ok(),
        )
        .with_function(
            "proc_exit",
            FuncType::new([ValueType::I32], []),
            HostFunctionHandler::new(|_, _| Ok(vec![])),
        )
        .with_function("args_get", FuncType::new([ValueType::I32; 2], [ValueType::I32]), ok())
}

fn provider_instance(store: &mut Store, engine: &Engine, host: HostBuilder) -> Instance {
    let module = Module::from_host(engine, host.build().unwrap());
    Instance::new(store, &module, &[]).unwrap()
}

const GUEST: &str = r#"
    (module
        (import "wasi_snapshot_preview1" "fd_write" (func (param i32 i32 i32 i32) (result i32)))
        (import "wasi_snapshot_preview1" "proc_exit" (func (param i32)))
        (memory (export "memory") 1))
"#;

#[test]
fn test_wasi_imports_bind_in_provider_order() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let wasi = provider_instance(&mut store, &engine, wasi_like_host());
    let provider = Provider::from_instance("wasi_snapshot_preview1", &wasi, &store).unwrap();
    let module = Module::new(&engine, wat::parse_str(GUEST).unwrap()).unwrap();

    let table = resolve_imports(&module, std::slice::from_ref(&provider), MatchPolicy::NameOnly)
        .unwrap();
    assert_eq!(table.len(), 2);
    let picked: Vec<_> = table.iter().map(|slot| (slot.provider, slot.export)).collect();
    assert_eq!(picked, [(0, 0), (0, 1)]);
    assert_eq!(table.externs()[0], provider.exports()[0].value);

    let instance = resolve_and_instantiate(&mut store, &module, &[provider]).unwrap();
    assert!(instance.get_memory(&store).is_some());
    assert_eq!(store.instance_count(), 2);
}

#[test]
fn test_repeated_linking_yields_independent_instances() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let wasi = provider_instance(&mut store, &engine, wasi_like_host());
    let providers = [Provider::from_instance("wasi_snapshot_preview1", &wasi, &store).unwrap()];
    let module = Module::new(&engine, wat::parse_str(GUEST).unwrap()).unwrap();
    let before = store.instance_count();

    let first = resolve_and_instantiate(&mut store, &module, &providers).unwrap();
    let second = resolve_and_instantiate(&mut store, &module, &providers).unwrap();
    assert_ne!(first, second);
    assert_eq!(store.instance_count(), before + 2);

    let table = resolve_imports(&module, &providers, MatchPolicy::NameOnly).unwrap();
    let again = resolve_imports(&module, &providers, MatchPolicy::NameOnly).unwrap();
    assert_eq!(table, again);

    let first_memory = first.get_memory(&store).unwrap();
    let second_memory = second.get_memory(&store).unwrap();
    assert_ne!(first_memory, second_memory);
    first_memory.write(&mut store, 16, b"one").unwrap();
    let mut buffer = [0xFFu8; 3];
    second_memory.read(&store, 16, &mut buffer).unwrap();
    assert_eq!(buffer, [0; 3]);
}

#[test]
fn test_missing_import_fails_before_instantiation() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let wasi = provider_instance(&mut store, &engine, wasi_like_host());
    let provider = Provider::from_instance("wasi_snapshot_preview1", &wasi, &store).unwrap();
    let module = Module::new(
        &engine,
        wat::parse_str(
            r#"(module
                (import "wasi_snapshot_preview1" "fd_write" (func (param i32 i32 i32 i32) (result i32)))
                (import "wasi_snapshot_preview1" "missing_fn" (func)))"#,
        )
        .unwrap(),
    )
    .unwrap();

    let error = resolve_and_instantiate(&mut store, &module, &[provider]).unwrap_err();
    assert!(error.is_unresolved_import());
    assert_eq!(error.unresolved_import_name(), Some("missing_fn"));
    assert_eq!(error.code, codes::UNRESOLVED_IMPORT);
    assert_eq!(store.instance_count(), 1);
}

#[test]
fn test_names_are_case_sensitive() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let wasi = provider_instance(&mut store, &engine, wasi_like_host());
    let provider = Provider::from_instance("wasi_snapshot_preview1", &wasi, &store).unwrap();
    let module = Module::new(
        &engine,
        wat::parse_str(r#"(module (import "wasi_snapshot_preview1" "Proc_exit" (func (param i32))))"#)
            .unwrap(),
    )
    .unwrap();

    let error = resolve_imports(&module, &[provider], MatchPolicy::NameOnly).unwrap_err();
    assert_eq!(error.unresolved_import_name(), Some("Proc_exit"));
}

#[test]
fn test_first_match_with_wrong_type_is_rejected_by_instantiation() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let decoy = provider_instance(
        &mut store,
        &engine,
        HostBuilder::new("env").with_function(
            "proc_exit",
            FuncType::new([], []),
            HostFunctionHandler::new(|_, _| Ok(vec![])),
        ),
    );
    let wasi = provider_instance(&mut store, &engine, wasi_like_host());
    let providers = [
        Provider::from_instance("env", &decoy, &store).unwrap(),
        Provider::from_instance("wasi_snapshot_preview1", &wasi, &store).unwrap(),
    ];
    let module = Module::new(&engine, wat::parse_str(GUEST).unwrap()).unwrap();

    let table = resolve_imports(&module, &providers, MatchPolicy::NameOnly).unwrap();
    assert_eq!((table.get(1).unwrap().provider, table.get(1).unwrap().export), (0, 0));

    let error = resolve_and_instantiate(&mut store, &module, &providers).unwrap_err();
    assert!(error.is_instantiation_failure());
    assert_eq!(error.code, codes::IMPORT_TYPE_MISMATCH);
    assert_eq!(error.subject(), Some("proc_exit"));
}

#[test]
fn test_qualified_policy_requires_matching_namespace() {
    let engine = Engine::new(EngineConfig::new().with_match_policy(MatchPolicy::Qualified));
    let mut store = Store::new(&engine);
    let wasi = provider_instance(&mut store, &engine, wasi_like_host());
    let module = Module::new(&engine, wat::parse_str(GUEST).unwrap()).unwrap();

    let wrong = Provider::from_instance("env", &wasi, &store).unwrap();
    let error = resolve_and_instantiate(&mut store, &module, &[wrong.clone()]).unwrap_err();
    assert_eq!(error.unresolved_import_name(), Some("fd_write"));
    assert!(resolve_imports(&module, &[wrong], MatchPolicy::NameOnly).is_ok());

    let right = Provider::from_instance("wasi_snapshot_preview1", &wasi, &store).unwrap();
    let mut linker = Linker::new(&engine);
    assert_eq!(linker.policy(), MatchPolicy::Qualified);
    linker.define(right);
    assert!(linker.instantiate(&mut store, &module).is_ok());
}

#[test]
fn test_linker_define_instance_and_override_policy() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let wasi = provider_instance(&mut store, &engine, wasi_like_host());
    let module = Module::new(&engine, wat::parse_str(GUEST).unwrap()).unwrap();

    let mut linker = Linker::new(&engine).with_policy(MatchPolicy::Qualified);
    linker.define_instance("elsewhere", &wasi, &store).unwrap();
    assert_eq!(linker.providers().len(), 1);
    assert!(linker.resolve(&module).unwrap_err().is_unresolved_import());

    let linker = linker.clone().with_policy(MatchPolicy::NameOnly);
    assert_eq!(linker.resolve(&module).unwrap().len(), 2);
}

#[test]
fn test_module_without_imports_needs_no_providers() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let module =
        Module::new(&engine, wat::parse_str("(module (memory (export \"memory\") 1))").unwrap())
            .unwrap();
    let table = resolve_imports(&module, &[], MatchPolicy::NameOnly).unwrap();
    assert!(table.is_empty());
    assert!(resolve_and_instantiate(&mut store, &module, &[]).is_ok());
}

#[test]
fn test_from_parts_checks_lengths_and_kinds() {
    let engine = Engine::default();
    let mut store = Store::new(&engine);
    let wasi = provider_instance(&mut store, &engine, wasi_like_host());
    let func = wasi.get_export(&store, "proc_exit").unwrap();
    let descriptor = ExportType::new("proc_exit", FuncType::new([ValueType::I32], []));

    let provider = Provider::from_parts("p", vec![descriptor.clone()], vec![func]).unwrap();
    assert_eq!(provider.namespace(), "p");
    assert_eq!(provider.exports()[0].ty, descriptor);

    let error = Provider::from_parts("p", vec![descriptor.clone()], vec![]).unwrap_err();
    assert_eq!(error.code, codes::PROVIDER_MISALIGNED);

    let memory_descriptor =
        ExportType::new("memory", wlink_types::MemoryType::new(wlink_types::Limits::new(1, None)));
    assert!(Provider::from_parts("p", vec![memory_descriptor], vec![func]).is_err());
}

fn noop_func(store: &mut Store, engine: &Engine) -> Extern {
    let host = HostBuilder::new("pool").with_function(
        "noop",
        FuncType::new([], []),
        HostFunctionHandler::new(|_, _| Ok(vec![])),
    );
    let instance = provider_instance(store, engine, host);
    instance.get_export(store, "noop").unwrap()
}

fn guest_importing(names: &[String]) -> String {
    let imports: String =
        names.iter().map(|name| format!("(import \"m\" \"{}\" (func))", name)).collect();
    format!("(module {})", imports)
}

/// The position a naive scan would pick for `name`
fn first_match(providers: &[Vec<String>], name: &str) -> Option<(usize, usize)> {
    providers.iter().enumerate().find_map(|(p, exports)| {
        exports.iter().position(|export| export == name).map(|e| (p, e))
    })
}

proptest! {
    #[test]
    fn prop_resolution_takes_first_match(
        provider_names in prop::collection::vec(prop::collection::vec("[abC]{1,2}", 0..4), 0..4),
        import_names in prop::collection::vec("[abC]{1,2}", 0..5),
    ) {
        let engine = Engine::default();
        let mut store = Store::new(&engine);
        let noop = noop_func(&mut store, &engine);
        let providers: Vec<_> = provider_names
            .iter()
            .enumerate()
            .map(|(i, names)| {
                let exports = names
                    .iter()
                    .map(|name| ProvidedExport {
                        ty: ExportType::new(name.clone(), FuncType::new([], [])),
                        value: noop,
                    })
                    .collect();
                Provider::new(format!("p{}", i), exports)
            })
            .collect();
        let module = Module::new(&engine, wat::parse_str(guest_importing(&import_names)).unwrap()).unwrap();

        let expected: Option<Vec<_>> =
            import_names.iter().map(|name| first_match(&provider_names, name)).collect();
        let result = resolve_imports(&module, &providers, MatchPolicy::NameOnly);
        match expected {
            Some(expected) => {
                let table = result.unwrap();
                let picked: Vec<_> = table.iter().map(|slot| (slot.provider, slot.export)).collect();
                prop_assert_eq!(picked, expected);
                let again = resolve_imports(&module, &providers, MatchPolicy::NameOnly).unwrap();
                prop_assert_eq!(&table, &again);
                prop_assert!(Instance::new(&mut store, &module, &table.externs()).is_ok());
            }
            None => {
                let error = result.unwrap_err();
                let missing = import_names
                    .iter()
                    .find(|name| first_match(&provider_names, name).is_none())
                    .unwrap();
                prop_assert_eq!(error.unresolved_import_name(), Some(missing.as_str()));
            }
        }
    }
}
