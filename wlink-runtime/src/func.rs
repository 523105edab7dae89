// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Function handles.

use wlink_error::{Error, Result};
use wlink_host::{DetachedContext, HostContext};
use wlink_types::{FuncAddr, FuncType, Value};

use crate::{
    Instance, Store,
    store::FuncInstance,
};

/// Handle to a function in a [`Store`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Func {
    pub(crate) store: u64,
    pub(crate) index: u32,
}

impl Func {
    pub(crate) fn new(store: u64, index: u32) -> Self {
        Self { store, index }
    }

    /// The function's address, as carried by `funcref` values
    pub fn addr(&self) -> FuncAddr {
        FuncAddr::new(self.store, self.index)
    }

    /// Signature of the function
    pub fn ty(&self, store: &Store) -> Result<FuncType> {
        store.check_owner(self.store)?;
        Ok(store.func(self.index)?.ty().clone())
    }

    /// Call the function from the embedder, with no caller instance
    pub fn call(&self, store: &mut Store, args: &[Value]) -> Result<Vec<Value>> {
        store.check_owner(self.store)?;
        let func = store.func(self.index)?.clone();
        invoke(&func, &mut DetachedContext, args)
    }

    /// Call the function on behalf of `caller`, whose exported `memory` the
    /// function may then access
    pub fn call_as(
        &self,
        store: &mut Store,
        caller: &Instance,
        args: &[Value],
    ) -> Result<Vec<Value>> {
        store.check_owner(self.store)?;
        store.check_owner(caller.store)?;
        let func = store.func(self.index)?.clone();
        let memory = caller.get_memory(store).map(|memory| memory.index);
        let mut context = Caller::new(store, memory);
        invoke(&func, &mut context, args)
    }
}

pub(crate) fn invoke(
    func: &FuncInstance,
    context: &mut dyn HostContext,
    args: &[Value],
) -> Result<Vec<Value>> {
    match func {
        FuncInstance::Host(host) => host.call(context, args),
        FuncInstance::Wasm { ty, instance, index } => {
            if args.len() != ty.params.len() {
                return Err(Error::type_mismatch(format!(
                    "expected {} arguments, found {}",
                    ty.params.len(),
                    args.len()
                )));
            }
            for (arg, param) in args.iter().zip(&ty.params) {
                arg.expect_type(*param)?;
            }
            Err(Error::not_supported(format!(
                "function {} of instance {} is WebAssembly code, which cannot be executed",
                index, instance
            )))
        }
    }
}

/// Host context backed by the caller instance's memory
pub(crate) struct Caller<'a> {
    memory: Option<&'a mut Vec<u8>>,
}

impl<'a> Caller<'a> {
    pub(crate) fn new(store: &'a mut Store, memory: Option<u32>) -> Self {
        let memory = match memory {
            Some(index) => store.memory_mut(index).ok().map(|memory| &mut memory.data),
            None => None,
        };
        Self { memory }
    }
}

impl HostContext for Caller<'_> {
    fn memory(&mut self) -> Option<&mut [u8]> {
        match &mut self.memory {
            Some(data) => Some(data.as_mut_slice()),
            None => None,
        }
    }
}
