// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Global handles.

use wlink_error::{Error, ErrorCategory, Result, codes};
use wlink_types::{GlobalType, Mutability, Value};

use crate::Store;

/// Handle to a global in a [`Store`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Global {
    pub(crate) store: u64,
    pub(crate) index: u32,
}

impl Global {
    pub(crate) fn new(store: u64, index: u32) -> Self {
        Self { store, index }
    }

    /// Type of the global
    pub fn ty(&self, store: &Store) -> Result<GlobalType> {
        store.check_owner(self.store)?;
        Ok(store.global(self.index)?.ty)
    }

    /// Current value
    pub fn get(&self, store: &Store) -> Result<Value> {
        store.check_owner(self.store)?;
        Ok(store.global(self.index)?.value)
    }

    /// Replace the value of a mutable global
    pub fn set(&self, store: &mut Store, value: Value) -> Result<()> {
        store.check_owner(self.store)?;
        let global = store.global_mut(self.index)?;
        if global.ty.mutability != Mutability::Var {
            return Err(Error::new(
                ErrorCategory::Runtime,
                codes::IMMUTABLE_GLOBAL,
                "cannot modify immutable global",
            ));
        }
        value.expect_type(global.ty.content)?;
        global.value = value;
        Ok(())
    }
}
