// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)] // Rule 2

//! Runtime for linking WebAssembly modules against providers.
//!
//! An [`Engine`] compiles [`Module`]s; a [`Store`] owns the functions,
//! globals, tables and memories that [`Instance`]s create. The [`linker`]
//! binds each import of a module to the first export of the same name
//! offered by a list of [`Provider`]s and then instantiates the module.
//!
//! The runtime does not execute WebAssembly code. Host functions can be
//! called; calling a function defined in a module is reported as not
//! supported.
//!
//! ```
//! use wlink_runtime::{Engine, Module, Provider, Store, resolve_and_instantiate};
//!
//! let engine = Engine::default();
//! let mut store = Store::new(&engine);
//! let bytes = [0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];
//! let module = Module::new(&engine, bytes).unwrap();
//! let providers: Vec<Provider> = Vec::new();
//! let instance = resolve_and_instantiate(&mut store, &module, &providers).unwrap();
//! assert!(instance.exports(&store).unwrap().is_empty());
//! ```

#![warn(missing_docs)]

pub mod engine;
pub mod externals;
pub mod func;
pub mod global;
pub mod instance;
pub mod linker;
pub mod memory;
pub mod module;
pub mod store;
pub mod table;

pub use engine::{DEFAULT_MAX_MEMORY_PAGES, DEFAULT_MAX_TABLE_ELEMENTS, Engine, EngineConfig};
pub use externals::Extern;
pub use func::Func;
pub use global::Global;
pub use instance::{Instance, InstanceExport};
pub use linker::{
    ImportBindingTable, Linker, MatchPolicy, ProvidedExport, Provider, ResolvedImport,
    resolve_and_instantiate, resolve_imports,
};
pub use memory::Memory;
pub use module::Module;
pub use store::Store;
pub use table::Table;
