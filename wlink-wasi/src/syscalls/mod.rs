// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The WASI function table.
//!
//! Every function of the snapshot is exported so that any guest links.
//! Functions without an implementation answer `EBADF` when their
//! descriptor argument is not open and `ENOSYS` otherwise.

mod cli;
mod clocks;
mod io;
mod random;

use wlink_host::HostContext;
use wlink_types::{Value, ValueType};

use crate::{
    ctx::WasiState,
    errno::{Errno, WasiResult},
    memory::GuestMemory,
};

/// What a shim function hands back to the dispatcher
pub(crate) enum Outcome {
    /// Return this errno to the guest
    Errno(Errno),
    /// Terminate with this exit status
    Exit(i32),
}

impl From<WasiResult<()>> for Outcome {
    fn from(result: WasiResult<()>) -> Self {
        Outcome::Errno(result.err().unwrap_or(Errno::Success))
    }
}

pub(crate) type Syscall = fn(&mut WasiState, &mut dyn HostContext, &[Value]) -> Outcome;

/// One entry of the function table
pub(crate) struct SyscallDef {
    pub(crate) name:    &'static str,
    pub(crate) params:  &'static [ValueType],
    pub(crate) results: &'static [ValueType],
    /// Position of the descriptor argument, if the function takes one
    pub(crate) fd:      Option<usize>,
    pub(crate) imp:     Option<Syscall>,
}

impl SyscallDef {
    pub(crate) fn unsupported(&self, state: &WasiState, args: &[Value]) -> Errno {
        match self.fd {
            Some(position) if !state.is_open(arg_u32(args, position)) => Errno::Badf,
            _ => Errno::Nosys,
        }
    }
}

/// Argument `position` as an unsigned 32-bit value
pub(crate) fn arg_u32(args: &[Value], position: usize) -> u32 {
    args.get(position).and_then(Value::as_i32).unwrap_or_default() as u32
}

/// The caller's memory, or `EFAULT` when it has none
pub(crate) fn guest(context: &mut dyn HostContext) -> WasiResult<GuestMemory<'_>> {
    context.memory().map(GuestMemory::new).ok_or(Errno::Fault)
}

const I32: ValueType = ValueType::I32;
const I64: ValueType = ValueType::I64;
const ERRNO: &[ValueType] = &[I32];

macro_rules! syscall {
    ($name:literal, [$($param:expr),*], $fd:expr, $imp:expr) => {
        SyscallDef { name: $name, params: &[$($param),*], results: ERRNO, fd: $fd, imp: $imp }
    };
}

pub(crate) static SYSCALLS: [SyscallDef; 45] = [
    syscall!("args_get", [I32, I32], None, Some(cli::args_get)),
    syscall!("args_sizes_get", [I32, I32], None, Some(cli::args_sizes_get)),
    syscall!("clock_res_get", [I32, I32], None, Some(clocks::clock_res_get)),
    syscall!("clock_time_get", [I32, I64, I32], None, Some(clocks::clock_time_get)),
    syscall!("environ_get", [I32, I32], None, Some(cli::environ_get)),
    syscall!("environ_sizes_get", [I32, I32], None, Some(cli::environ_sizes_get)),
    syscall!("fd_prestat_get", [I32, I32], Some(0), Some(io::fd_prestat_get)),
    syscall!("fd_prestat_dir_name", [I32, I32, I32], Some(0), Some(io::fd_prestat_dir_name)),
    syscall!("fd_close", [I32], Some(0), Some(io::fd_close)),
    syscall!("fd_datasync", [I32], Some(0), None),
    syscall!("fd_pread", [I32, I32, I32, I64, I32], Some(0), None),
    syscall!("fd_pwrite", [I32, I32, I32, I64, I32], Some(0), None),
    syscall!("fd_read", [I32, I32, I32, I32], Some(0), Some(io::fd_read)),
    syscall!("fd_renumber", [I32, I32], Some(0), None),
    syscall!("fd_seek", [I32, I64, I32, I32], Some(0), Some(io::fd_seek)),
    syscall!("fd_tell", [I32, I32], Some(0), Some(io::fd_tell)),
    syscall!("fd_fdstat_get", [I32, I32], Some(0), Some(io::fd_fdstat_get)),
    syscall!("fd_fdstat_set_flags", [I32, I32], Some(0), None),
    syscall!("fd_fdstat_set_rights", [I32, I64, I64], Some(0), None),
    syscall!("fd_sync", [I32], Some(0), None),
    syscall!("fd_write", [I32, I32, I32, I32], Some(0), Some(io::fd_write)),
    syscall!("fd_advise", [I32, I64, I64, I32], Some(0), None),
    syscall!("fd_allocate", [I32, I64, I64], Some(0), None),
    syscall!("path_create_directory", [I32, I32, I32], Some(0), None),
    syscall!("path_link", [I32, I32, I32, I32, I32, I32, I32], Some(0), None),
    syscall!("path_open", [I32, I32, I32, I32, I32, I64, I64, I32, I32], Some(0), None),
    syscall!("fd_readdir", [I32, I32, I32, I64, I32], Some(0), None),
    syscall!("path_readlink", [I32, I32, I32, I32, I32, I32], Some(0), None),
    syscall!("path_rename", [I32, I32, I32, I32, I32, I32], Some(0), None),
    syscall!("fd_filestat_get", [I32, I32], Some(0), None),
    syscall!("fd_filestat_set_times", [I32, I64, I64, I32], Some(0), None),
    syscall!("fd_filestat_set_size", [I32, I64], Some(0), None),
    syscall!("path_filestat_get", [I32, I32, I32, I32, I32], Some(0), None),
    syscall!("path_filestat_set_times", [I32, I32, I32, I32, I64, I64, I32], Some(0), None),
    syscall!("path_symlink", [I32, I32, I32, I32, I32], Some(2), None),
    syscall!("path_unlink_file", [I32, I32, I32], Some(0), None),
    syscall!("path_remove_directory", [I32, I32, I32], Some(0), None),
    syscall!("poll_oneoff", [I32, I32, I32, I32], None, None),
    SyscallDef { name: "proc_exit", params: &[I32], results: &[], fd: None, imp: Some(cli::proc_exit) },
    syscall!("proc_raise", [I32], None, None),
    syscall!("random_get", [I32, I32], None, Some(random::random_get)),
    syscall!("sched_yield", [], None, Some(cli::sched_yield)),
    syscall!("sock_recv", [I32, I32, I32, I32, I32, I32], Some(0), None),
    syscall!("sock_send", [I32, I32, I32, I32, I32], Some(0), None),
    syscall!("sock_shutdown", [I32, I32], Some(0), None),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn table_is_complete_and_unique() {
        let names: HashSet<_> = SYSCALLS.iter().map(|def| def.name).collect();
        assert_eq!(names.len(), 45);
        assert_eq!(SYSCALLS[0].name, "args_get");
        assert_eq!(SYSCALLS[44].name, "sock_shutdown");
    }

    #[test]
    fn descriptor_positions_are_i32_params() {
        for def in &SYSCALLS {
            if let Some(position) = def.fd {
                assert_eq!(def.params[position], ValueType::I32, "{}", def.name);
            }
        }
    }
}
