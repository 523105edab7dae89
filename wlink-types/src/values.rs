// wlink - wlink-types
// Module: Runtime Values
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Runtime values passed to and returned from functions and held in globals
//! and tables.

use core::fmt;

use wlink_error::{Error, Result};

use crate::{FloatBits32, FloatBits64, ValueType};

/// Address of a function inside a store
///
/// Carries the id of the owning store so a reference cannot be silently
/// used with another store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncAddr {
    store: u64,
    index: u32,
}

impl FuncAddr {
    /// Create a function address
    pub const fn new(store: u64, index: u32) -> Self {
        Self { store, index }
    }

    /// Id of the store the function lives in
    pub const fn store_id(self) -> u64 {
        self.store
    }

    /// Index of the function within its store
    pub const fn index(self) -> u32 {
        self.index
    }
}

/// A WebAssembly value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// 32-bit float, as bits
    F32(FloatBits32),
    /// 64-bit float, as bits
    F64(FloatBits64),
    /// 128-bit vector
    V128(u128),
    /// Function reference, `None` is null
    FuncRef(Option<FuncAddr>),
    /// External reference, `None` is null
    ExternRef(Option<u32>),
}

impl Value {
    /// The zero value of a type (null for references)
    #[must_use]
    pub fn default_for(ty: ValueType) -> Self {
        match ty {
            ValueType::I32 => Value::I32(0),
            ValueType::I64 => Value::I64(0),
            ValueType::F32 => Value::F32(FloatBits32(0)),
            ValueType::F64 => Value::F64(FloatBits64(0)),
            ValueType::V128 => Value::V128(0),
            ValueType::FuncRef => Value::FuncRef(None),
            ValueType::ExternRef => Value::ExternRef(None),
        }
    }

    /// Type of this value
    #[must_use]
    pub fn ty(&self) -> ValueType {
        match self {
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::F32(_) => ValueType::F32,
            Value::F64(_) => ValueType::F64,
            Value::V128(_) => ValueType::V128,
            Value::FuncRef(_) => ValueType::FuncRef,
            Value::ExternRef(_) => ValueType::ExternRef,
        }
    }

    /// Check that this value has type `ty`
    pub fn expect_type(&self, ty: ValueType) -> Result<()> {
        if self.ty() == ty {
            Ok(())
        } else {
            Err(Error::type_mismatch(format!("expected {}, found {}", ty, self.ty())))
        }
    }

    /// The value as i32, if it is one
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as i64, if it is one
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as f32, if it is one
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(v.value()),
            _ => None,
        }
    }

    /// The value as f64, if it is one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(v.value()),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(FloatBits32::from_float(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(FloatBits64::from_float(v))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I32(v) => write!(f, "i32:{}", v),
            Value::I64(v) => write!(f, "i64:{}", v),
            Value::F32(v) => write!(f, "f32:{}", v),
            Value::F64(v) => write!(f, "f64:{}", v),
            Value::V128(v) => write!(f, "v128:{:#034x}", v),
            Value::FuncRef(Some(addr)) => write!(f, "funcref:{}", addr.index()),
            Value::ExternRef(Some(handle)) => write!(f, "externref:{}", handle),
            Value::FuncRef(None) | Value::ExternRef(None) => f.write_str("null"),
        }
    }
}
