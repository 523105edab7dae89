// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Linear memory handles.

use wlink_error::{Result, kinds::MemoryAccessOutOfBounds};
use wlink_types::{MemoryType, PAGE_SIZE};

use crate::Store;

/// Handle to a linear memory in a [`Store`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory {
    pub(crate) store: u64,
    pub(crate) index: u32,
}

/// Range `offset..offset + len` checked against a memory of `size` bytes
pub(crate) fn checked_range(offset: u64, len: usize, size: usize) -> Result<std::ops::Range<usize>> {
    let out_of_bounds =
        || MemoryAccessOutOfBounds { address: offset, length: len as u64, size: size as u64 };
    let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
    let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
    if end > size {
        return Err(out_of_bounds().into());
    }
    Ok(start..end)
}

impl Memory {
    pub(crate) fn new(store: u64, index: u32) -> Self {
        Self { store, index }
    }

    /// Type of the memory, with its current size as minimum
    pub fn ty(&self, store: &Store) -> Result<MemoryType> {
        store.check_owner(self.store)?;
        let memory = store.memory(self.index)?;
        let mut ty = memory.ty;
        ty.limits.min = (memory.data.len() / PAGE_SIZE) as u32;
        Ok(ty)
    }

    /// Size in pages
    pub fn size_pages(&self, store: &Store) -> Result<u32> {
        Ok((self.data_size(store)? / PAGE_SIZE) as u32)
    }

    /// Size in bytes
    pub fn data_size(&self, store: &Store) -> Result<usize> {
        store.check_owner(self.store)?;
        Ok(store.memory(self.index)?.data.len())
    }

    /// Copy `buffer.len()` bytes starting at `offset` into `buffer`
    pub fn read(&self, store: &Store, offset: u64, buffer: &mut [u8]) -> Result<()> {
        store.check_owner(self.store)?;
        let data = &store.memory(self.index)?.data;
        let range = checked_range(offset, buffer.len(), data.len())?;
        buffer.copy_from_slice(&data[range]);
        Ok(())
    }

    /// Copy `bytes` into memory starting at `offset`
    pub fn write(&self, store: &mut Store, offset: u64, bytes: &[u8]) -> Result<()> {
        store.check_owner(self.store)?;
        let data = &mut store.memory_mut(self.index)?.data;
        let range = checked_range(offset, bytes.len(), data.len())?;
        data[range].copy_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_range_rejects_overflow() {
        assert_eq!(checked_range(2, 2, 4).unwrap(), 2..4);
        assert!(checked_range(3, 2, 4).is_err());
        assert!(checked_range(u64::MAX, 1, 4).is_err());
        assert!(checked_range(4, 0, 4).is_ok());
    }
}
