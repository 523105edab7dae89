// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Host function implementation.
//!
//! Host functions are closures that receive the calling context and the
//! argument values, and return the result values.

use wlink_error::Result;
use wlink_types::Value;

/// What a host function sees of its caller.
pub trait HostContext {
    /// Linear memory exported by the calling instance as `memory`, if there
    /// is a calling instance and it exports one.
    fn memory(&mut self) -> Option<&mut [u8]>;
}

/// Context for calls made directly by the embedder, with no caller instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedContext;

impl HostContext for DetachedContext {
    fn memory(&mut self) -> Option<&mut [u8]> {
        None
    }
}

/// A plain byte buffer serves as caller memory.
impl HostContext for Vec<u8> {
    fn memory(&mut self) -> Option<&mut [u8]> {
        Some(self.as_mut_slice())
    }
}

/// A trait for functions that can be cloned and operate on a host context
/// and a slice of values.
pub trait FnWithContext: Send + Sync {
    /// Calls the function with the given context and arguments.
    fn call(&self, context: &mut dyn HostContext, args: &[Value]) -> Result<Vec<Value>>;

    /// Clones the function into a `Box`.
    fn clone_box(&self) -> Box<dyn FnWithContext>;
}

impl<F> FnWithContext for F
where
    F: Fn(&mut dyn HostContext, &[Value]) -> Result<Vec<Value>> + Send + Sync + Clone + 'static,
{
    fn call(&self, context: &mut dyn HostContext, args: &[Value]) -> Result<Vec<Value>> {
        self(context, args)
    }

    fn clone_box(&self) -> Box<dyn FnWithContext> {
        Box::new(self.clone())
    }
}

/// A wrapper struct that makes a closure implementing `Fn` cloneable
/// by boxing it and handling the cloning via the `FnWithContext` trait.
pub struct CloneableFn(Box<dyn FnWithContext>);

impl CloneableFn {
    /// Creates a new `CloneableFn` from a closure.
    ///
    /// The closure must be `Send`, `Sync`, `Clone`, and `'static`.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut dyn HostContext, &[Value]) -> Result<Vec<Value>>
            + Send
            + Sync
            + Clone
            + 'static,
    {
        Self(Box::new(f))
    }

    /// Calls the wrapped function.
    pub fn call(&self, context: &mut dyn HostContext, args: &[Value]) -> Result<Vec<Value>> {
        self.0.call(context, args)
    }
}

impl Clone for CloneableFn {
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl core::fmt::Debug for CloneableFn {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CloneableFn")
    }
}

/// Host function handler type for implementing WebAssembly imports
pub type HostFunctionHandler = CloneableFn;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloneable_fn() {
        let f = CloneableFn::new(|_, _| Ok(vec![Value::I32(42)]));
        let f2 = f.clone();

        let result = f.call(&mut DetachedContext, &[]);
        let result2 = f2.call(&mut DetachedContext, &[]);

        assert_eq!(result.unwrap(), vec![Value::I32(42)]);
        assert_eq!(result2.unwrap(), vec![Value::I32(42)]);
    }

    #[test]
    fn test_handler_reaches_caller_memory() {
        let handler = HostFunctionHandler::new(|ctx, args| {
            let offset = args[0].as_i32().unwrap_or(0) as usize;
            let memory = ctx.memory().ok_or_else(|| wlink_error::Error::trap("no memory"))?;
            memory[offset] = 7;
            Ok(vec![])
        });

        let mut memory = vec![0u8; 4];
        handler.call(&mut memory, &[Value::I32(2)]).unwrap();
        assert_eq!(memory, [0, 0, 7, 0]);
        assert!(handler.call(&mut DetachedContext, &[Value::I32(0)]).unwrap_err().is_trap());
    }
}
