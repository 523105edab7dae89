// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Builder for host modules.

use std::collections::HashSet;

use wlink_error::{Error, ErrorCategory, Result, codes};
use wlink_types::{FuncType, GlobalType, Value};

use crate::{
    function::HostFunctionHandler,
    host::{HostExport, HostFunction, HostGlobal, HostModule},
};

/// Builder for a [`HostModule`]
#[derive(Debug, Clone, Default)]
pub struct HostBuilder {
    name:    String,
    exports: Vec<HostExport>,
    /// First error hit while adding exports, reported by `build`
    error:   Option<Error>,
}

impl HostBuilder {
    /// Create a builder for a module called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Add a host function
    #[must_use]
    pub fn with_function(
        mut self,
        name: impl Into<String>,
        ty: FuncType,
        handler: HostFunctionHandler,
    ) -> Self {
        self.exports.push(HostExport::Func(HostFunction::new(name, ty, handler)));
        self
    }

    /// Add a host global
    #[must_use]
    pub fn with_global(mut self, name: impl Into<String>, ty: GlobalType, value: Value) -> Self {
        match HostGlobal::new(name, ty, value) {
            Ok(global) => self.exports.push(HostExport::Global(global)),
            Err(error) => {
                self.error.get_or_insert(error);
            }
        }
        self
    }

    /// Build the host module
    ///
    /// Fails if a global's value does not match its type or if two exports
    /// share a name.
    pub fn build(self) -> Result<HostModule> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let mut seen = HashSet::new();
        for export in &self.exports {
            if !seen.insert(export.name()) {
                return Err(Error::with_subject(
                    ErrorCategory::Validation,
                    codes::DUPLICATE_EXPORT,
                    "duplicate host export",
                    export.name(),
                ));
            }
        }
        Ok(HostModule::from_exports(self.name, self.exports))
    }
}
