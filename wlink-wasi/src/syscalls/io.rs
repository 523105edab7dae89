// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Descriptor functions over the three standard streams.
//!
//! Descriptors 0, 1 and 2 are character devices: standard input reads
//! from the configured bytes, standard output and error write to their
//! sinks. There are no preopened directories and nothing is seekable.

use std::io::Write;

use tracing::warn;
use wlink_host::HostContext;
use wlink_types::Value;

use super::{Outcome, arg_u32, guest};
use crate::{
    config::OutputSink,
    ctx::WasiState,
    errno::{Errno, WasiResult},
};

const STDIN: u32 = 0;
const STDOUT: u32 = 1;
const STDERR: u32 = 2;

const FILETYPE_CHARACTER_DEVICE: u8 = 2;
const RIGHT_FD_READ: u64 = 1 << 1;
const RIGHT_FD_WRITE: u64 = 1 << 6;
const FDSTAT_SIZE: u32 = 24;

fn write_to_sink(sink: &OutputSink, fd: u32, chunks: &[&[u8]]) -> WasiResult<()> {
    fn write_all(mut stream: impl Write, chunks: &[&[u8]]) -> std::io::Result<()> {
        for chunk in chunks {
            stream.write_all(chunk)?;
        }
        stream.flush()
    }

    let result = match sink {
        OutputSink::Null => Ok(()),
        OutputSink::Buffer(buffer) => {
            for chunk in chunks {
                buffer.append(chunk);
            }
            Ok(())
        }
        OutputSink::Inherit if fd == STDERR => write_all(std::io::stderr().lock(), chunks),
        OutputSink::Inherit => write_all(std::io::stdout().lock(), chunks),
    };
    result.map_err(|error| {
        warn!(fd, %error, "guest output could not be written");
        Errno::Io
    })
}

/// `fd_write(fd, iovs, iovs_len, nwritten)`
pub(super) fn fd_write(state: &mut WasiState, context: &mut dyn HostContext, args: &[Value]) -> Outcome {
    let fd = arg_u32(args, 0);
    let result = state.check_fd(fd).and_then(|()| {
        let sink = match fd {
            STDOUT => &state.stdout,
            STDERR => &state.stderr,
            _ => return Err(Errno::Badf),
        };
        let mut memory = guest(context)?;
        let iovecs = memory.read_iovecs(arg_u32(args, 1), arg_u32(args, 2))?;
        // All buffers are checked before any byte reaches the sink.
        let mut written = 0u32;
        let mut chunks = Vec::with_capacity(iovecs.len());
        for iovec in &iovecs {
            chunks.push(memory.slice(iovec.buf, iovec.len)?);
            written = written.checked_add(iovec.len).ok_or(Errno::Inval)?;
        }
        write_to_sink(sink, fd, &chunks)?;
        memory.write_u32(arg_u32(args, 3), written)
    });
    result.into()
}

/// `fd_read(fd, iovs, iovs_len, nread)`
pub(super) fn fd_read(state: &mut WasiState, context: &mut dyn HostContext, args: &[Value]) -> Outcome {
    let fd = arg_u32(args, 0);
    let result = state.check_fd(fd).and_then(|()| {
        if fd != STDIN {
            return Err(Errno::Badf);
        }
        let mut memory = guest(context)?;
        let mut read = 0u32;
        for iovec in memory.read_iovecs(arg_u32(args, 1), arg_u32(args, 2))? {
            let remaining = &state.stdin[state.stdin_pos..];
            let len = remaining.len().min(iovec.len as usize);
            memory.write_bytes(iovec.buf, &remaining[..len])?;
            state.stdin_pos += len;
            read += len as u32;
            if len < iovec.len as usize {
                break;
            }
        }
        memory.write_u32(arg_u32(args, 3), read)
    });
    result.into()
}

/// `fd_close(fd)`
pub(super) fn fd_close(state: &mut WasiState, _: &mut dyn HostContext, args: &[Value]) -> Outcome {
    let fd = arg_u32(args, 0);
    let result = state.check_fd(fd).map(|()| {
        if let Some(open) = state.open.get_mut(fd as usize) {
            *open = false;
        }
    });
    result.into()
}

/// `fd_fdstat_get(fd, stat)`
pub(super) fn fd_fdstat_get(
    state: &mut WasiState,
    context: &mut dyn HostContext,
    args: &[Value],
) -> Outcome {
    let fd = arg_u32(args, 0);
    let ptr = arg_u32(args, 1);
    let result = state.check_fd(fd).and_then(|()| {
        let rights = if fd == STDIN { RIGHT_FD_READ } else { RIGHT_FD_WRITE };
        let mut memory = guest(context)?;
        memory.slice_mut(ptr, FDSTAT_SIZE)?.fill(0);
        memory.write_u8(ptr, FILETYPE_CHARACTER_DEVICE)?;
        memory.write_u16(ptr + 2, 0)?;
        memory.write_u64(ptr + 8, rights)?;
        memory.write_u64(ptr + 16, 0)
    });
    result.into()
}

/// `fd_prestat_get(fd, prestat)`; nothing is preopened
pub(super) fn fd_prestat_get(_: &mut WasiState, _: &mut dyn HostContext, _: &[Value]) -> Outcome {
    Outcome::Errno(Errno::Badf)
}

/// `fd_prestat_dir_name(fd, path, path_len)`; nothing is preopened
pub(super) fn fd_prestat_dir_name(_: &mut WasiState, _: &mut dyn HostContext, _: &[Value]) -> Outcome {
    Outcome::Errno(Errno::Badf)
}

/// `fd_seek(fd, offset, whence, newoffset)`
pub(super) fn fd_seek(state: &mut WasiState, _: &mut dyn HostContext, args: &[Value]) -> Outcome {
    let result: WasiResult<()> = state.check_fd(arg_u32(args, 0)).and_then(|()| {
        if arg_u32(args, 2) > 2 {
            return Err(Errno::Inval);
        }
        Err(Errno::Spipe)
    });
    result.into()
}

/// `fd_tell(fd, offset)`
pub(super) fn fd_tell(state: &mut WasiState, _: &mut dyn HostContext, args: &[Value]) -> Outcome {
    state.check_fd(arg_u32(args, 0)).and(Err::<(), _>(Errno::Spipe)).into()
}
