// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WASI error numbers returned to the guest.

use core::fmt;

/// The subset of WASI `errno` values the shim produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Errno {
    /// No error
    Success = 0,
    /// Bad file descriptor
    Badf    = 8,
    /// Bad address
    Fault   = 21,
    /// Invalid argument
    Inval   = 28,
    /// I/O error
    Io      = 29,
    /// Function not supported
    Nosys   = 52,
    /// Not supported
    Notsup  = 58,
    /// Invalid seek
    Spipe   = 70,
}

impl Errno {
    /// Numeric value
    pub fn raw(self) -> u16 {
        self as u16
    }

    /// Symbolic name, as in the WASI headers
    pub fn name(self) -> &'static str {
        match self {
            Errno::Success => "ESUCCESS",
            Errno::Badf => "EBADF",
            Errno::Fault => "EFAULT",
            Errno::Inval => "EINVAL",
            Errno::Io => "EIO",
            Errno::Nosys => "ENOSYS",
            Errno::Notsup => "ENOTSUP",
            Errno::Spipe => "ESPIPE",
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.raw())
    }
}

/// Outcome of a shim function before it is turned into a return value
pub type WasiResult<T> = core::result::Result<T, Errno>;
