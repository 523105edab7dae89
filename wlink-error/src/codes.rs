// wlink - wlink-error
// Module: Error Codes
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error codes for wlink

// Loading and compilation error codes (1000-1999)
/// Module bytes could not be obtained
pub const MODULE_LOAD_FAILED: u16 = 1000;
/// Module bytes did not decode or validate
pub const COMPILATION_FAILED: u16 = 1001;
/// Underlying I/O error
pub const IO_ERROR: u16 = 1002;
/// Generic parse error
pub const PARSE_ERROR: u16 = 1010;
/// Binary does not start with `\0asm`
pub const INVALID_MAGIC: u16 = 1011;
/// Binary version is not 1
pub const INVALID_VERSION: u16 = 1012;
/// Input ended in the middle of a construct
pub const UNEXPECTED_EOF: u16 = 1013;
/// LEB128 integer too long or out of range
pub const INTEGER_TOO_LARGE: u16 = 1014;
/// Name is not valid UTF-8
pub const INVALID_UTF8: u16 = 1015;
/// Non-custom section out of order or repeated
pub const SECTION_ORDER: u16 = 1016;
/// Section contents did not match the declared size
pub const SECTION_SIZE_MISMATCH: u16 = 1017;
/// Unknown section id, type constructor or kind byte
pub const MALFORMED_BYTE: u16 = 1018;

// Link error codes (2000-2999)
/// Import has no matching export in any provider
pub const UNRESOLVED_IMPORT: u16 = 2000;
/// Provider descriptors and values are not aligned
pub const PROVIDER_MISALIGNED: u16 = 2001;

// Instantiation error codes (3000-3999)
/// Instantiation rejected
pub const INSTANTIATION_FAILED: u16 = 3000;
/// Wrong number of import values
pub const IMPORT_COUNT_MISMATCH: u16 = 3001;
/// Import value incompatible with its descriptor
pub const IMPORT_TYPE_MISMATCH: u16 = 3002;
/// Extern value belongs to another store
pub const FOREIGN_STORE: u16 = 3003;
/// Active data or element segment does not fit
pub const SEGMENT_OUT_OF_BOUNDS: u16 = 3004;
/// Engine resource limit exceeded
pub const RESOURCE_LIMIT_EXCEEDED: u16 = 3005;
/// Start function failed
pub const START_FUNCTION_FAILED: u16 = 3006;

// Runtime error codes (4000-4999)
/// Value or signature type mismatch
pub const TYPE_MISMATCH: u16 = 4000;
/// Memory or table access out of bounds
pub const OUT_OF_BOUNDS: u16 = 4001;
/// Operation not supported by this runtime
pub const NOT_SUPPORTED: u16 = 4002;
/// Invalid argument
pub const INVALID_ARGUMENT: u16 = 4003;
/// Trap raised by a host function
pub const TRAP: u16 = 4004;
/// Guest requested process exit
pub const PROCESS_EXIT: u16 = 4005;
/// Write to an immutable global
pub const IMMUTABLE_GLOBAL: u16 = 4006;
/// Export not present on an instance
pub const EXPORT_NOT_FOUND: u16 = 4007;

// Validation error codes (5000-5999)
/// Generic validation error
pub const VALIDATION_ERROR: u16 = 5000;
/// Type index out of range
pub const INVALID_TYPE_INDEX: u16 = 5001;
/// Function index out of range
pub const INVALID_FUNCTION_INDEX: u16 = 5002;
/// Table index out of range
pub const INVALID_TABLE_INDEX: u16 = 5003;
/// Memory index out of range
pub const INVALID_MEMORY_INDEX: u16 = 5004;
/// Global index out of range
pub const INVALID_GLOBAL_INDEX: u16 = 5005;
/// Two exports share a name
pub const DUPLICATE_EXPORT: u16 = 5006;
/// Function and code section lengths differ
pub const FUNCTION_CODE_MISMATCH: u16 = 5007;
/// Limits are inconsistent or too large
pub const INVALID_LIMITS: u16 = 5008;
/// Start function has parameters or results
pub const INVALID_START_FUNCTION: u16 = 5009;
/// Constant expression not allowed or ill-typed
pub const INVALID_CONST_EXPR: u16 = 5010;
/// More memories than allowed
pub const TOO_MANY_MEMORIES: u16 = 5011;
