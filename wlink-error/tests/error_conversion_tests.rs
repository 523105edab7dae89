//! Tests for error conversion, taxonomy predicates and `FromError` implementations

use wlink_error::{
    Error, ErrorCategory, FromError, codes,
    kinds::{ExportNotFound, ResourceLimitExceeded, SegmentOutOfBounds, UnexpectedEof},
};

#[test]
fn test_taxonomy_is_distinguishable() {
    let load = Error::module_load_failed("guest.wasm", Error::new(ErrorCategory::Load, codes::IO_ERROR, "no such file"));
    let compile = Error::compilation_failed(Error::parse_error(codes::INVALID_MAGIC, "bad magic"));
    let link = Error::unresolved_import("missing_fn");
    let inst = Error::instantiation_failed(codes::IMPORT_COUNT_MISMATCH, "wrong import count");

    assert!(load.is_load_failure());
    assert!(compile.is_compilation_failure());
    assert!(link.is_unresolved_import());
    assert!(inst.is_instantiation_failure());

    // Each predicate holds for exactly one of the four
    let all = [&load, &compile, &link, &inst];
    assert_eq!(all.iter().filter(|e| e.is_load_failure()).count(), 1);
    assert_eq!(all.iter().filter(|e| e.is_compilation_failure()).count(), 1);
    assert_eq!(all.iter().filter(|e| e.is_unresolved_import()).count(), 1);
    assert_eq!(all.iter().filter(|e| e.is_instantiation_failure()).count(), 1);
}

#[test]
fn test_load_failure_keeps_path_and_cause() {
    let error = Error::module_load_failed(
        "missing.wasm",
        Error::new(ErrorCategory::Load, codes::IO_ERROR, "I/O error"),
    );
    assert_eq!(error.subject(), Some("missing.wasm"));
    assert_eq!(error.cause().map(|e| e.code), Some(codes::IO_ERROR));
}

#[test]
fn test_error_from_unexpected_eof() {
    let error: Error = UnexpectedEof { offset: 8 }.into();
    assert_eq!(error.category, ErrorCategory::Parse);
    assert_eq!(error.code, codes::UNEXPECTED_EOF);
    assert_eq!(error.message(), "unexpected end of input at offset 8");
}

#[test]
fn test_error_from_segment_out_of_bounds() {
    let error: Error = SegmentOutOfBounds { kind: "data", segment: 0, offset: 65534, len: 4, bound: 65536 }.into();
    assert!(error.is_instantiation_failure());
    assert_eq!(error.code, codes::SEGMENT_OUT_OF_BOUNDS);
}

#[test]
fn test_error_from_resource_limit() {
    let error: Error = ResourceLimitExceeded { resource: "memory pages", requested: 20, limit: 10 }.into();
    assert_eq!(error.category, ErrorCategory::Resource);
    assert_eq!(error.message(), "20 memory pages exceeds limit of 10");
}

#[test]
fn test_error_from_export_not_found() {
    let error: Error = ExportNotFound("memory".into()).into();
    assert_eq!(error.code, codes::EXPORT_NOT_FOUND);
    assert_eq!(error.subject(), Some("memory"));
    assert!(!error.is_unresolved_import());
}

#[test]
fn test_from_io_error() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error = Error::from_error(io);
    assert_eq!(error.category, ErrorCategory::Load);
    assert_eq!(error.code, codes::IO_ERROR);
    assert_eq!(error.subject(), Some("gone"));
}

#[test]
fn test_from_utf8_error() {
    let bytes = vec![0xffu8, 0xfe];
    let utf8 = std::str::from_utf8(&bytes).unwrap_err();
    let error = Error::from_error(utf8);
    assert_eq!(error.code, codes::INVALID_UTF8);
}

#[test]
fn test_exit_is_not_a_trap() {
    let error = Error::exit(0);
    assert!(error.is_exit());
    assert!(!error.is_trap());
    assert_eq!(error.exit_code(), Some(0));
    assert_eq!(Error::trap("unreachable").exit_code(), None);
}
