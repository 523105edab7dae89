// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The store owns every runtime object created by instantiation.
//!
//! Handles ([`Func`](crate::Func), [`Memory`](crate::Memory), ...) are small
//! indices tagged with the id of the store they belong to. A handle is only
//! meaningful together with its store; using it with another store is an
//! error.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;
use wlink_error::{Error, Result};
use wlink_host::HostFunction;
use wlink_types::{FuncType, GlobalType, MemoryType, TableType, Value};

use crate::{Engine, instance::InstanceData};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// A function living in a store
#[derive(Debug, Clone)]
pub(crate) enum FuncInstance {
    /// Implemented by the host
    Host(HostFunction),
    /// Defined by a module; its body is never executed
    Wasm {
        ty:       FuncType,
        instance: u32,
        index:    u32,
    },
}

impl FuncInstance {
    pub(crate) fn ty(&self) -> &FuncType {
        match self {
            FuncInstance::Host(func) => func.ty(),
            FuncInstance::Wasm { ty, .. } => ty,
        }
    }
}

/// A global living in a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GlobalInstance {
    pub(crate) ty:    GlobalType,
    pub(crate) value: Value,
}

/// A table living in a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableInstance {
    pub(crate) ty:       TableType,
    pub(crate) elements: Vec<Value>,
}

/// A linear memory living in a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MemoryInstance {
    pub(crate) ty:   MemoryType,
    pub(crate) data: Vec<u8>,
}

/// Arena lengths of a store at some point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    funcs:     usize,
    globals:   usize,
    tables:    usize,
    memories:  usize,
    instances: usize,
}

/// Owner of all functions, globals, tables, memories and instances
#[derive(Debug)]
pub struct Store {
    id:                   u64,
    engine:               Engine,
    pub(crate) funcs:     Vec<FuncInstance>,
    pub(crate) globals:   Vec<GlobalInstance>,
    pub(crate) tables:    Vec<TableInstance>,
    pub(crate) memories:  Vec<MemoryInstance>,
    pub(crate) instances: Vec<InstanceData>,
}

impl Store {
    /// Create an empty store for `engine`
    pub fn new(engine: &Engine) -> Self {
        let id = NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed);
        debug!(store = id, "store created");
        Self {
            id,
            engine: engine.clone(),
            funcs: Vec::new(),
            globals: Vec::new(),
            tables: Vec::new(),
            memories: Vec::new(),
            instances: Vec::new(),
        }
    }

    /// Run `f` with a fresh store that is released when `f` returns
    pub fn scope<R>(engine: &Engine, f: impl FnOnce(&mut Store) -> R) -> R {
        let mut store = Store::new(engine);
        f(&mut store)
    }

    /// Unique id of this store
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The engine the store was created with
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Number of instances created in this store
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Fail unless a handle tagged with `store` belongs here
    pub(crate) fn check_owner(&self, store: u64) -> Result<()> {
        if store == self.id {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!(
                "handle belongs to store {}, not store {}",
                store, self.id
            )))
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            funcs:     self.funcs.len(),
            globals:   self.globals.len(),
            tables:    self.tables.len(),
            memories:  self.memories.len(),
            instances: self.instances.len(),
        }
    }

    /// Drop everything allocated after `checkpoint`
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.funcs.truncate(checkpoint.funcs);
        self.globals.truncate(checkpoint.globals);
        self.tables.truncate(checkpoint.tables);
        self.memories.truncate(checkpoint.memories);
        self.instances.truncate(checkpoint.instances);
    }

    pub(crate) fn next_index(len: usize) -> Result<u32> {
        u32::try_from(len).map_err(|_| Error::not_supported("store index space exhausted"))
    }

    pub(crate) fn push_func(&mut self, func: FuncInstance) -> Result<u32> {
        let index = Self::next_index(self.funcs.len())?;
        self.funcs.push(func);
        Ok(index)
    }

    pub(crate) fn push_global(&mut self, global: GlobalInstance) -> Result<u32> {
        let index = Self::next_index(self.globals.len())?;
        self.globals.push(global);
        Ok(index)
    }

    pub(crate) fn push_table(&mut self, table: TableInstance) -> Result<u32> {
        let index = Self::next_index(self.tables.len())?;
        self.tables.push(table);
        Ok(index)
    }

    pub(crate) fn push_memory(&mut self, memory: MemoryInstance) -> Result<u32> {
        let index = Self::next_index(self.memories.len())?;
        self.memories.push(memory);
        Ok(index)
    }

    pub(crate) fn func(&self, index: u32) -> Result<&FuncInstance> {
        self.funcs.get(index as usize).ok_or_else(|| dangling("function", index))
    }

    pub(crate) fn global(&self, index: u32) -> Result<&GlobalInstance> {
        self.globals.get(index as usize).ok_or_else(|| dangling("global", index))
    }

    pub(crate) fn global_mut(&mut self, index: u32) -> Result<&mut GlobalInstance> {
        self.globals.get_mut(index as usize).ok_or_else(|| dangling("global", index))
    }

    pub(crate) fn table(&self, index: u32) -> Result<&TableInstance> {
        self.tables.get(index as usize).ok_or_else(|| dangling("table", index))
    }

    pub(crate) fn table_mut(&mut self, index: u32) -> Result<&mut TableInstance> {
        self.tables.get_mut(index as usize).ok_or_else(|| dangling("table", index))
    }

    pub(crate) fn memory(&self, index: u32) -> Result<&MemoryInstance> {
        self.memories.get(index as usize).ok_or_else(|| dangling("memory", index))
    }

    pub(crate) fn memory_mut(&mut self, index: u32) -> Result<&mut MemoryInstance> {
        self.memories.get_mut(index as usize).ok_or_else(|| dangling("memory", index))
    }

    pub(crate) fn instance(&self, index: u32) -> Result<&InstanceData> {
        self.instances.get(index as usize).ok_or_else(|| dangling("instance", index))
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        debug!(store = self.id, instances = self.instances.len(), "store released");
    }
}

fn dangling(what: &str, index: u32) -> Error {
    Error::invalid_argument(format!("no {} {} in store", what, index))
}
