// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! `random_get`, backed by a xorshift64* generator.
//!
//! Not cryptographically secure. A fixed seed makes the output
//! reproducible.

use wlink_host::HostContext;
use wlink_types::Value;

use super::{Outcome, arg_u32, guest};
use crate::ctx::WasiState;

pub(crate) fn next_u64(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    *state = x;
    x.wrapping_mul(0x2545_F491_4F6C_DD1D)
}

/// `random_get(buf, len)`
pub(super) fn random_get(state: &mut WasiState, context: &mut dyn HostContext, args: &[Value]) -> Outcome {
    let result = guest(context).and_then(|mut memory| {
        let buffer = memory.slice_mut(arg_u32(args, 0), arg_u32(args, 1))?;
        for chunk in buffer.chunks_mut(8) {
            let bytes = next_u64(&mut state.rng).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
        Ok(())
    });
    result.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_depends_only_on_seed() {
        let (mut a, mut b) = (42u64, 42u64);
        let first: Vec<_> = (0..4).map(|_| next_u64(&mut a)).collect();
        let second: Vec<_> = (0..4).map(|_| next_u64(&mut b)).collect();
        assert_eq!(first, second);
        assert_ne!(first[0], first[1]);
    }
}
