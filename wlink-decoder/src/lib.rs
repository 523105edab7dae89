// wlink - wlink-decoder
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly module decoder for wlink.
//!
//! Turns the bytes of a core module into a validated [`Module`] that
//! describes its imports, exports and the entities it defines. Function
//! bodies are sized and skipped; nothing here interprets code.
//!
//! ```
//! let bytes = [0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];
//! let module = wlink_decoder::decode(&bytes).unwrap();
//! assert!(module.imports.is_empty());
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod const_expr;
pub mod decoder;
pub mod module;
pub mod reader;
pub mod validation;

pub use const_expr::ConstExpr;
pub use decoder::{WASM_MAGIC, WASM_VERSION, decode_sections};
pub use module::{
    DataMode, DataSegment, ElementMode, ElementSegment, Export, Global, Import, ImportDesc, Module,
};
pub use validation::validate_module;
use wlink_error::Result;

/// Decode and validate a module
pub fn decode(bytes: &[u8]) -> Result<Module> {
    let module = decode_sections(bytes)?;
    validate_module(&module)?;
    Ok(module)
}
