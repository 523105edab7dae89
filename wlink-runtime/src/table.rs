// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Table handles.

use wlink_error::{Error, Result};
use wlink_types::{TableType, Value};

use crate::Store;

/// Handle to a table in a [`Store`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Table {
    pub(crate) store: u64,
    pub(crate) index: u32,
}

impl Table {
    pub(crate) fn new(store: u64, index: u32) -> Self {
        Self { store, index }
    }

    /// Type of the table, with its current size as minimum
    pub fn ty(&self, store: &Store) -> Result<TableType> {
        store.check_owner(self.store)?;
        let table = store.table(self.index)?;
        let mut ty = table.ty;
        ty.limits.min = table.elements.len() as u32;
        Ok(ty)
    }

    /// Number of elements
    pub fn size(&self, store: &Store) -> Result<u32> {
        store.check_owner(self.store)?;
        Ok(store.table(self.index)?.elements.len() as u32)
    }

    /// Element at `index`
    pub fn get(&self, store: &Store, index: u32) -> Result<Value> {
        store.check_owner(self.store)?;
        let table = store.table(self.index)?;
        table.elements.get(index as usize).copied().ok_or_else(|| {
            Error::out_of_bounds(format!(
                "table index {} out of bounds for table of size {}",
                index,
                table.elements.len()
            ))
        })
    }
}
