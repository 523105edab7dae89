//! Host module building and host function calls

use wlink_error::codes;
use wlink_host::{DetachedContext, HostBuilder, HostExport, HostFunctionHandler};
use wlink_types::{FuncType, GlobalType, Mutability, Value, ValueType};

fn add() -> HostFunctionHandler {
    HostFunctionHandler::new(|_, args| {
        let a = args[0].as_i32().unwrap_or_default();
        let b = args[1].as_i32().unwrap_or_default();
        Ok(vec![Value::I32(a.wrapping_add(b))])
    })
}

fn binary_i32() -> FuncType {
    FuncType::new([ValueType::I32, ValueType::I32], [ValueType::I32])
}

#[test]
fn test_exports_keep_definition_order() {
    let module = HostBuilder::new("env")
        .with_function("add", binary_i32(), add())
        .with_global("limit", GlobalType::new(ValueType::I64, Mutability::Const), Value::I64(9))
        .with_function("sub", binary_i32(), add())
        .build()
        .unwrap();

    let names: Vec<_> = module.exports().iter().map(HostExport::name).collect();
    assert_eq!(names, ["add", "limit", "sub"]);
    assert_eq!(module.export_types()[1].to_string(), "\"limit\": global const i64");
    assert_eq!(module.name(), "env");
    assert_eq!(module.len(), 3);
}

#[test]
fn test_duplicate_names_are_rejected() {
    let error = HostBuilder::new("env")
        .with_function("f", binary_i32(), add())
        .with_global("f", GlobalType::new(ValueType::I32, Mutability::Var), Value::I32(0))
        .build()
        .unwrap_err();
    assert_eq!(error.code, codes::DUPLICATE_EXPORT);
    assert_eq!(error.subject(), Some("f"));
}

#[test]
fn test_global_value_must_match_type() {
    let error = HostBuilder::new("env")
        .with_global("g", GlobalType::new(ValueType::I32, Mutability::Const), Value::I64(1))
        .build()
        .unwrap_err();
    assert!(error.is_type_error());
}

#[test]
fn test_call_checks_signature() {
    let module = HostBuilder::new("env").with_function("add", binary_i32(), add()).build().unwrap();
    let add = module.function("add").unwrap();

    let sum = add.call(&mut DetachedContext, &[Value::I32(2), Value::I32(3)]).unwrap();
    assert_eq!(sum, [Value::I32(5)]);

    let error = add.call(&mut DetachedContext, &[Value::I32(2)]).unwrap_err();
    assert!(error.is_type_error());
    let error = add.call(&mut DetachedContext, &[Value::I32(2), Value::I64(3)]).unwrap_err();
    assert!(error.is_type_error());
}

#[test]
fn test_call_checks_results() {
    let liar = HostFunctionHandler::new(|_, _| Ok(vec![Value::from(0.0f32)]));
    let module = HostBuilder::new("env")
        .with_function("liar", FuncType::new([], [ValueType::I32]), liar)
        .build()
        .unwrap();
    let error = module.function("liar").unwrap().call(&mut DetachedContext, &[]).unwrap_err();
    assert!(error.is_type_error());
}
