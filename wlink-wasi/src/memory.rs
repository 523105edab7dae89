// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Bounds-checked access to the caller's linear memory.
//!
//! Guest pointers are 32-bit offsets. Every access that does not fit in
//! the memory answers [`Errno::Fault`].

use crate::errno::{Errno, WasiResult};

/// One entry of an `iovec` / `ciovec` array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoVec {
    /// Guest address of the buffer
    pub buf: u32,
    /// Length of the buffer
    pub len: u32,
}

/// Little-endian view of guest memory
pub struct GuestMemory<'a> {
    data: &'a mut [u8],
}

impl<'a> GuestMemory<'a> {
    /// Wrap `data`
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data }
    }

    fn range(&self, ptr: u32, len: usize) -> WasiResult<core::ops::Range<usize>> {
        let start = ptr as usize;
        let end = start.checked_add(len).ok_or(Errno::Fault)?;
        if end > self.data.len() {
            return Err(Errno::Fault);
        }
        Ok(start..end)
    }

    /// `len` bytes at `ptr`
    pub fn slice(&self, ptr: u32, len: u32) -> WasiResult<&[u8]> {
        let range = self.range(ptr, len as usize)?;
        Ok(&self.data[range])
    }

    /// `len` writable bytes at `ptr`
    pub fn slice_mut(&mut self, ptr: u32, len: u32) -> WasiResult<&mut [u8]> {
        let range = self.range(ptr, len as usize)?;
        Ok(&mut self.data[range])
    }

    /// Copy `bytes` to `ptr`
    pub fn write_bytes(&mut self, ptr: u32, bytes: &[u8]) -> WasiResult<()> {
        let range = self.range(ptr, bytes.len())?;
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Read a `u32` at `ptr`
    pub fn read_u32(&self, ptr: u32) -> WasiResult<u32> {
        let range = self.range(ptr, 4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[range]);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Write a `u8` at `ptr`
    pub fn write_u8(&mut self, ptr: u32, value: u8) -> WasiResult<()> {
        self.write_bytes(ptr, &[value])
    }

    /// Write a `u16` at `ptr`
    pub fn write_u16(&mut self, ptr: u32, value: u16) -> WasiResult<()> {
        self.write_bytes(ptr, &value.to_le_bytes())
    }

    /// Write a `u32` at `ptr`
    pub fn write_u32(&mut self, ptr: u32, value: u32) -> WasiResult<()> {
        self.write_bytes(ptr, &value.to_le_bytes())
    }

    /// Write a `u64` at `ptr`
    pub fn write_u64(&mut self, ptr: u32, value: u64) -> WasiResult<()> {
        self.write_bytes(ptr, &value.to_le_bytes())
    }

    /// Read `count` iovecs starting at `ptr`
    pub fn read_iovecs(&self, ptr: u32, count: u32) -> WasiResult<Vec<IoVec>> {
        // Each entry is two u32 fields.
        self.range(ptr, (count as usize).checked_mul(8).ok_or(Errno::Fault)?)?;
        (0..count)
            .map(|i| {
                let entry = ptr + i * 8;
                Ok(IoVec { buf: self.read_u32(entry)?, len: self.read_u32(entry + 4)? })
            })
            .collect()
    }

    /// Lay out `items` as NUL-terminated strings at `buf`, storing a
    /// pointer to each at consecutive slots of `ptrs`
    pub fn write_string_table<'s>(
        &mut self,
        ptrs: u32,
        buf: u32,
        items: impl IntoIterator<Item = &'s [u8]>,
    ) -> WasiResult<()> {
        let mut slot = ptrs;
        let mut cursor = buf;
        for item in items {
            self.write_u32(slot, cursor)?;
            self.write_bytes(cursor, item)?;
            let len = u32::try_from(item.len()).map_err(|_| Errno::Fault)?;
            let end = cursor.checked_add(len).ok_or(Errno::Fault)?;
            self.write_u8(end, 0)?;
            cursor = end.checked_add(1).ok_or(Errno::Fault)?;
            slot = slot.checked_add(4).ok_or(Errno::Fault)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn accesses_are_bounds_checked() {
        let mut data = vec![0u8; 16];
        let mut memory = GuestMemory::new(&mut data);
        memory.write_u32(12, 0xDEAD_BEEF).unwrap();
        assert_eq!(memory.read_u32(12).unwrap(), 0xDEAD_BEEF);
        assert_eq!(memory.write_u32(13, 1), Err(Errno::Fault));
        assert_eq!(memory.slice(u32::MAX, 2), Err(Errno::Fault));
        assert_eq!(memory.read_iovecs(8, 2).unwrap_err(), Errno::Fault);
    }

    #[test]
    fn string_table_layout() {
        let mut data = vec![0xFFu8; 32];
        let mut memory = GuestMemory::new(&mut data);
        memory.write_string_table(0, 8, [b"ab".as_slice(), b"c".as_slice()]).unwrap();
        assert_eq!(memory.read_u32(0).unwrap(), 8);
        assert_eq!(memory.read_u32(4).unwrap(), 11);
        assert_eq!(memory.slice(8, 5).unwrap(), b"ab\0c\0");
    }

    proptest! {
        #[test]
        fn u32_access_in_bounds_iff_fits(offset in 0u32..40) {
            let mut data = vec![0u8; 32];
            let mut memory = GuestMemory::new(&mut data);
            let fits = offset as usize + 4 <= 32;
            prop_assert_eq!(memory.write_u32(offset, offset).is_ok(), fits);
            prop_assert_eq!(memory.read_u32(offset).ok(), fits.then_some(offset));
        }
    }
}
