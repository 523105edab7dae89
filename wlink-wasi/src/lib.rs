// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![forbid(unsafe_code)] // Rule 2

//! WASI shim provider for wlink.
//!
//! Provides the complete `wasi_unstable` / `wasi_snapshot_preview1`
//! function table as a host module, so that a guest importing any of it
//! can be linked. Arguments, environment, clocks, random numbers, process
//! exit and the three standard streams are emulated; the remaining
//! functions answer `EBADF` or `ENOSYS`.
//!
//! Functions read and write the calling instance's exported `memory`.
//!
//! ```
//! use wlink_wasi::{OutputSink, SharedBuffer, WasiConfig, WasiCtx, WasiVersion};
//!
//! let stdout = SharedBuffer::new();
//! let ctx = WasiCtx::new(
//!     WasiConfig::new()
//!         .with_version(WasiVersion::Preview1)
//!         .with_arg("guest.wasm")
//!         .with_stdout(OutputSink::Buffer(stdout.clone())),
//! );
//! let module = ctx.host_module().unwrap();
//! assert_eq!(module.name(), "wasi_snapshot_preview1");
//! assert_eq!(module.len(), 45);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod ctx;
pub mod errno;
pub mod memory;
mod syscalls;

pub use config::{OutputSink, SharedBuffer, WasiConfig, WasiVersion, parse_env_pair};
pub use ctx::WasiCtx;
pub use errno::{Errno, WasiResult};
pub use memory::{GuestMemory, IoVec};
