// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Clocks.
//!
//! The process and thread CPU-time clocks are answered from the monotonic
//! clock, measured from context creation.

use std::time::{SystemTime, UNIX_EPOCH};

use wlink_host::HostContext;
use wlink_types::Value;

use super::{Outcome, arg_u32, guest};
use crate::{
    ctx::WasiState,
    errno::{Errno, WasiResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockId {
    Realtime,
    Monotonic,
}

impl ClockId {
    fn from_raw(id: u32) -> WasiResult<Self> {
        match id {
            0 => Ok(ClockId::Realtime),
            1..=3 => Ok(ClockId::Monotonic),
            _ => Err(Errno::Inval),
        }
    }

    fn now(self, state: &WasiState) -> WasiResult<u64> {
        let elapsed = match self {
            ClockId::Realtime => {
                SystemTime::now().duration_since(UNIX_EPOCH).map_err(|_| Errno::Io)?
            }
            ClockId::Monotonic => state.started.elapsed(),
        };
        u64::try_from(elapsed.as_nanos()).map_err(|_| Errno::Io)
    }
}

/// Resolution reported for every clock, in nanoseconds
const RESOLUTION_NS: u64 = 1_000;

/// `clock_res_get(id, resolution)`
pub(super) fn clock_res_get(_: &mut WasiState, context: &mut dyn HostContext, args: &[Value]) -> Outcome {
    ClockId::from_raw(arg_u32(args, 0))
        .and_then(|_| guest(context)?.write_u64(arg_u32(args, 1), RESOLUTION_NS))
        .into()
}

/// `clock_time_get(id, precision, time)`
pub(super) fn clock_time_get(
    state: &mut WasiState,
    context: &mut dyn HostContext,
    args: &[Value],
) -> Outcome {
    ClockId::from_raw(arg_u32(args, 0))
        .and_then(|clock| clock.now(state))
        .and_then(|now| guest(context)?.write_u64(arg_u32(args, 2), now))
        .into()
}
