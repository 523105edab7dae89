//! Type compatibility rules used when binding extern values to imports

use proptest::prelude::*;
use wlink_types::{
    ExternKind, ExternType, FuncType, GlobalType, Limits, MemoryType, Mutability, RefType,
    TableType, ValueType,
};

fn limits() -> impl Strategy<Value = Limits> {
    (0u32..100, proptest::option::of(0u32..100))
        .prop_map(|(min, extra)| Limits::new(min, extra.map(|e| min + e)))
}

proptest! {
    #[test]
    fn limits_matching_is_reflexive(l in limits()) {
        prop_assert!(l.matches(&l));
    }

    #[test]
    fn limits_matching_is_transitive(a in limits(), b in limits(), c in limits()) {
        if a.matches(&b) && b.matches(&c) {
            prop_assert!(a.matches(&c));
        }
    }

    #[test]
    fn unbounded_never_satisfies_bounded(min in 0u32..100, bound in 0u32..100) {
        let actual = Limits::new(min, None);
        prop_assert!(!actual.matches(&Limits::new(0, Some(bound))));
    }
}

#[test]
fn test_func_types_need_identical_signatures() {
    let fd_write = ExternType::Func(FuncType::new([ValueType::I32; 4], [ValueType::I32]));
    let narrower = ExternType::Func(FuncType::new([ValueType::I32; 3], [ValueType::I32]));
    assert!(fd_write.matches(&fd_write.clone()));
    assert!(!fd_write.matches(&narrower));
    assert!(!narrower.matches(&fd_write));
}

#[test]
fn test_globals_match_on_content_and_mutability() {
    let const_i32 = ExternType::Global(GlobalType::new(ValueType::I32, Mutability::Const));
    let var_i32 = ExternType::Global(GlobalType::new(ValueType::I32, Mutability::Var));
    let const_i64 = ExternType::Global(GlobalType::new(ValueType::I64, Mutability::Const));
    assert!(const_i32.matches(&const_i32));
    assert!(!const_i32.matches(&var_i32));
    assert!(!const_i32.matches(&const_i64));
}

#[test]
fn test_tables_check_element_type_and_limits() {
    let provided = ExternType::Table(TableType::new(RefType::FuncRef, Limits::new(10, Some(20))));
    let wanted = ExternType::Table(TableType::new(RefType::FuncRef, Limits::new(5, Some(30))));
    let externref = ExternType::Table(TableType::new(RefType::ExternRef, Limits::new(5, Some(30))));
    assert!(provided.matches(&wanted));
    assert!(!wanted.matches(&provided));
    assert!(!provided.matches(&externref));
}

#[test]
fn test_memories_match_by_limits() {
    let provided = ExternType::Memory(MemoryType::new(Limits::new(2, None)));
    assert!(provided.matches(&ExternType::Memory(MemoryType::new(Limits::new(1, None)))));
    assert!(!provided.matches(&ExternType::Memory(MemoryType::new(Limits::new(3, None)))));
}

#[test]
fn test_kinds_never_cross_match() {
    let func = ExternType::Func(FuncType::default());
    let memory = ExternType::Memory(MemoryType::new(Limits::new(0, None)));
    assert_eq!(func.kind(), ExternKind::Func);
    assert_eq!(memory.kind(), ExternKind::Memory);
    assert!(!func.matches(&memory));
    assert!(!memory.matches(&func));
}
