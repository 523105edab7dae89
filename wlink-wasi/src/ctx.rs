// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The WASI context and the host module built from it.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use tracing::{debug, trace};
use wlink_error::{Error, Result};
use wlink_host::{HostBuilder, HostFunctionHandler, HostModule};
use wlink_types::{FuncType, Value};

use crate::{
    config::{OutputSink, WasiConfig, WasiVersion},
    errno::Errno,
    syscalls::{Outcome, SYSCALLS, SyscallDef},
};

/// Standard input, output and error
pub(crate) const STDIO: u32 = 3;

/// Mutable state shared by every function of one context
#[derive(Debug)]
pub(crate) struct WasiState {
    pub(crate) args:      Vec<String>,
    pub(crate) env:       Vec<(String, String)>,
    pub(crate) stdin:     Vec<u8>,
    pub(crate) stdin_pos: usize,
    pub(crate) stdout:    OutputSink,
    pub(crate) stderr:    OutputSink,
    pub(crate) open:      [bool; STDIO as usize],
    pub(crate) rng:       u64,
    pub(crate) started:   Instant,
}

impl WasiState {
    fn new(config: WasiConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0x2545_F491_4F6C_DD1D, |elapsed| elapsed.as_nanos() as u64)
        });
        Self {
            args:      config.args,
            env:       config.env,
            stdin:     config.stdin,
            stdin_pos: 0,
            stdout:    config.stdout,
            stderr:    config.stderr,
            open:      [true; STDIO as usize],
            // xorshift has a fixed point at zero
            rng:       if seed == 0 { 1 } else { seed },
            started:   Instant::now(),
        }
    }

    /// Whether `fd` names an open descriptor
    pub(crate) fn is_open(&self, fd: u32) -> bool {
        self.open.get(fd as usize).copied().unwrap_or(false)
    }

    /// Fail with `EBADF` unless `fd` is open
    pub(crate) fn check_fd(&self, fd: u32) -> crate::errno::WasiResult<()> {
        if self.is_open(fd) { Ok(()) } else { Err(Errno::Badf) }
    }
}

/// A WASI context: arguments, environment, standard streams and the
/// state the shim functions share.
///
/// Cheap to clone; clones share the same state.
#[derive(Debug, Clone)]
pub struct WasiCtx {
    version: WasiVersion,
    state:   Arc<Mutex<WasiState>>,
}

impl WasiCtx {
    /// Create a context from `config`
    pub fn new(config: WasiConfig) -> Self {
        debug!(
            version = %config.version,
            args = config.args.len(),
            env = config.env.len(),
            "WASI context created"
        );
        Self { version: config.version, state: Arc::new(Mutex::new(WasiState::new(config))) }
    }

    /// Version of the function table this context provides
    pub fn version(&self) -> WasiVersion {
        self.version
    }

    /// Import namespace of the provided functions
    pub fn namespace(&self) -> &'static str {
        self.version.namespace()
    }

    /// Names of every provided function, in table order
    pub fn function_names() -> impl Iterator<Item = &'static str> {
        SYSCALLS.iter().map(|def| def.name)
    }

    /// Build the host module exporting the complete function table
    pub fn host_module(&self) -> Result<HostModule> {
        SYSCALLS
            .iter()
            .fold(HostBuilder::new(self.namespace()), |builder, def| {
                builder.with_function(
                    def.name,
                    FuncType::new(def.params.iter().copied(), def.results.iter().copied()),
                    self.handler(def),
                )
            })
            .build()
    }

    fn handler(&self, def: &'static SyscallDef) -> HostFunctionHandler {
        let state = Arc::clone(&self.state);
        HostFunctionHandler::new(move |context, args| {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            let outcome = match def.imp {
                Some(imp) => imp(&mut *state, context, args),
                None => Outcome::Errno(def.unsupported(&*state, args)),
            };
            match outcome {
                Outcome::Exit(status) => {
                    debug!(status, "guest requested exit");
                    Err(Error::exit(status))
                }
                Outcome::Errno(errno) => {
                    trace!(function = def.name, errno = errno.raw(), "WASI call");
                    if def.results.is_empty() {
                        Ok(Vec::new())
                    } else {
                        Ok(vec![Value::I32(i32::from(errno.raw()))])
                    }
                }
            }
        })
    }
}
