// wlink - wlink-types
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Core type definitions shared across the wlink workspace.
//!
//! This crate describes what a module imports and exports: value types,
//! limits, function, global, table and memory types, and the
//! import/export descriptors that pair a name with one of those. It also
//! carries runtime [`Value`]s and the compatibility rules used when an
//! extern value is bound to an import ([`ExternType::matches`]).
//!
//! Every type renders with `Display` in the compact form used by the
//! driver's listings, for example `func i32 i32 -> i32` or `memory 1 2`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod float_repr;
pub mod types;
pub mod values;

pub use float_repr::{FloatBits32, FloatBits64};
pub use types::{
    ExportType, ExternKind, ExternType, FuncType, GlobalType, ImportType, Limits, MemoryType,
    Mutability, RefType, TableType, ValueType, MAX_MEMORY_PAGES, PAGE_SIZE,
};
pub use values::{FuncAddr, Value};
