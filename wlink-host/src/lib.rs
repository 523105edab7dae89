// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)] // Rule 2

//! Host function infrastructure for wlink.
//!
//! This crate provides what the embedder needs to offer host-implemented
//! functions and globals to WebAssembly modules: the handler type, the
//! context a handler is called with, and a builder that groups exports into
//! a [`HostModule`].
//!
//! ## Usage
//!
//! ```rust
//! use wlink_host::{HostBuilder, HostFunctionHandler};
//! use wlink_types::{FuncType, Value, ValueType};
//!
//! let module = HostBuilder::new("env")
//!     .with_function(
//!         "answer",
//!         FuncType::new([], [ValueType::I32]),
//!         HostFunctionHandler::new(|_, _| Ok(vec![Value::I32(42)])),
//!     )
//!     .build()
//!     .expect("Failed to build host module");
//! assert_eq!(module.export_types()[0].to_string(), "\"answer\": func -> i32");
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod function;
pub mod host;

pub use builder::HostBuilder;
pub use function::{CloneableFn, DetachedContext, HostContext, HostFunctionHandler};
pub use host::{HostExport, HostFunction, HostGlobal, HostModule};
