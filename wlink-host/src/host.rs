// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Host-defined functions, globals and the module that groups them.

use tracing::trace;
use wlink_error::{Error, Result};
use wlink_types::{ExportType, ExternType, FuncType, GlobalType, Value, ValueType};

use crate::function::{HostContext, HostFunctionHandler};

/// A function implemented by the host
#[derive(Debug, Clone)]
pub struct HostFunction {
    name:    String,
    ty:      FuncType,
    handler: HostFunctionHandler,
}

impl HostFunction {
    /// Create a host function
    pub fn new(name: impl Into<String>, ty: FuncType, handler: HostFunctionHandler) -> Self {
        Self { name: name.into(), ty, handler }
    }

    /// Export name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signature
    pub fn ty(&self) -> &FuncType {
        &self.ty
    }

    /// Call the handler after checking the arguments against the
    /// signature, then check the results.
    pub fn call(&self, context: &mut dyn HostContext, args: &[Value]) -> Result<Vec<Value>> {
        check_values(&self.ty.params, args, "argument")?;
        trace!(function = %self.name, args = args.len(), "host call");
        let results = self.handler.call(context, args)?;
        check_values(&self.ty.results, &results, "result")?;
        Ok(results)
    }
}

fn check_values(expected: &[ValueType], values: &[Value], what: &str) -> Result<()> {
    if expected.len() != values.len() {
        return Err(Error::type_mismatch(format!(
            "expected {} {}s, found {}",
            expected.len(),
            what,
            values.len()
        )));
    }
    for (position, (ty, value)) in expected.iter().zip(values).enumerate() {
        if value.ty() != *ty {
            return Err(Error::type_mismatch(format!(
                "{} {} has type {}, expected {}",
                what,
                position,
                value.ty(),
                ty
            )));
        }
    }
    Ok(())
}

/// A global provided by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostGlobal {
    name:  String,
    ty:    GlobalType,
    value: Value,
}

impl HostGlobal {
    /// Create a host global, checking the value against the type
    pub fn new(name: impl Into<String>, ty: GlobalType, value: Value) -> Result<Self> {
        value.expect_type(ty.content)?;
        Ok(Self { name: name.into(), ty, value })
    }

    /// Export name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type
    pub fn ty(&self) -> GlobalType {
        self.ty
    }

    /// Initial value
    pub fn value(&self) -> Value {
        self.value
    }
}

/// One export of a host module
#[derive(Debug, Clone)]
pub enum HostExport {
    /// Function
    Func(HostFunction),
    /// Global
    Global(HostGlobal),
}

impl HostExport {
    /// Export name
    pub fn name(&self) -> &str {
        match self {
            HostExport::Func(func) => func.name(),
            HostExport::Global(global) => global.name(),
        }
    }

    /// Export descriptor
    pub fn export_type(&self) -> ExportType {
        let ty = match self {
            HostExport::Func(func) => ExternType::Func(func.ty().clone()),
            HostExport::Global(global) => ExternType::Global(global.ty()),
        };
        ExportType::new(self.name(), ty)
    }
}

/// A named collection of host exports, in definition order
#[derive(Debug, Clone)]
pub struct HostModule {
    name:    String,
    exports: Vec<HostExport>,
}

impl HostModule {
    pub(crate) fn from_exports(name: String, exports: Vec<HostExport>) -> Self {
        Self { name, exports }
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exports in definition order
    pub fn exports(&self) -> &[HostExport] {
        &self.exports
    }

    /// Export descriptors in definition order
    pub fn export_types(&self) -> Vec<ExportType> {
        self.exports.iter().map(HostExport::export_type).collect()
    }

    /// Function called `name`
    pub fn function(&self, name: &str) -> Option<&HostFunction> {
        self.exports.iter().find_map(|export| match export {
            HostExport::Func(func) if func.name() == name => Some(func),
            _ => None,
        })
    }

    /// Number of exports
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// Whether the module exports nothing
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}
