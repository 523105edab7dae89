// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Arguments, environment and process control.

use wlink_host::HostContext;
use wlink_types::Value;

use super::{Outcome, arg_u32, guest};
use crate::{
    ctx::WasiState,
    errno::{Errno, WasiResult},
};

fn environ(state: &WasiState) -> Vec<Vec<u8>> {
    state.env.iter().map(|(key, value)| format!("{}={}", key, value).into_bytes()).collect()
}

fn sizes_get(
    context: &mut dyn HostContext,
    items: &[&[u8]],
    count_ptr: u32,
    size_ptr: u32,
) -> WasiResult<()> {
    let count = u32::try_from(items.len()).map_err(|_| Errno::Inval)?;
    let size: usize = items.iter().map(|item| item.len() + 1).sum();
    let size = u32::try_from(size).map_err(|_| Errno::Inval)?;
    let mut memory = guest(context)?;
    memory.write_u32(count_ptr, count)?;
    memory.write_u32(size_ptr, size)
}

/// `args_get(argv, argv_buf)`
pub(super) fn args_get(state: &mut WasiState, context: &mut dyn HostContext, args: &[Value]) -> Outcome {
    let items = state.args.iter().map(String::as_bytes);
    guest(context)
        .and_then(|mut memory| memory.write_string_table(arg_u32(args, 0), arg_u32(args, 1), items))
        .into()
}

/// `args_sizes_get(argc, argv_buf_size)`
pub(super) fn args_sizes_get(
    state: &mut WasiState,
    context: &mut dyn HostContext,
    args: &[Value],
) -> Outcome {
    let items: Vec<&[u8]> = state.args.iter().map(String::as_bytes).collect();
    sizes_get(context, &items, arg_u32(args, 0), arg_u32(args, 1)).into()
}

/// `environ_get(environ, environ_buf)`
pub(super) fn environ_get(
    state: &mut WasiState,
    context: &mut dyn HostContext,
    args: &[Value],
) -> Outcome {
    let entries = environ(state);
    guest(context)
        .and_then(|mut memory| {
            memory.write_string_table(
                arg_u32(args, 0),
                arg_u32(args, 1),
                entries.iter().map(Vec::as_slice),
            )
        })
        .into()
}

/// `environ_sizes_get(count, buf_size)`
pub(super) fn environ_sizes_get(
    state: &mut WasiState,
    context: &mut dyn HostContext,
    args: &[Value],
) -> Outcome {
    let entries = environ(state);
    let items: Vec<&[u8]> = entries.iter().map(Vec::as_slice).collect();
    sizes_get(context, &items, arg_u32(args, 0), arg_u32(args, 1)).into()
}

/// `proc_exit(status)`
pub(super) fn proc_exit(_: &mut WasiState, _: &mut dyn HostContext, args: &[Value]) -> Outcome {
    Outcome::Exit(arg_u32(args, 0) as i32)
}

/// `sched_yield()`; there is nothing to yield to
pub(super) fn sched_yield(_: &mut WasiState, _: &mut dyn HostContext, _: &[Value]) -> Outcome {
    Outcome::Errno(Errno::Success)
}
