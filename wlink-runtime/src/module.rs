// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Compiled modules.

use std::{path::Path, sync::Arc};

use tracing::{debug, info_span};
use wlink_error::{Error, FromError, Result};
use wlink_host::HostModule;
use wlink_types::{ExportType, ImportType};

use crate::Engine;

/// What a module is made of
#[derive(Debug)]
pub(crate) enum ModuleKind {
    /// Decoded from a binary
    Wasm(wlink_decoder::Module),
    /// Defined by the host
    Host(HostModule),
}

#[derive(Debug)]
struct ModuleInner {
    engine:  Engine,
    name:    Option<String>,
    imports: Vec<ImportType>,
    exports: Vec<ExportType>,
    kind:    ModuleKind,
}

/// A validated module, ready to be instantiated any number of times.
///
/// Cheap to clone; the metadata is shared and immutable.
#[derive(Debug, Clone)]
pub struct Module {
    inner: Arc<ModuleInner>,
}

impl Module {
    /// Decode and validate `bytes`
    ///
    /// Any decoding or validation problem is reported as a compilation
    /// failure wrapping the underlying error.
    pub fn new(engine: &Engine, bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();
        let _span = info_span!("compile", size = bytes.len()).entered();
        let decoded = wlink_decoder::decode(bytes).map_err(Error::compilation_failed)?;
        let imports = decoded.import_types().map_err(Error::compilation_failed)?;
        let exports = decoded.export_types().map_err(Error::compilation_failed)?;
        debug!(imports = imports.len(), exports = exports.len(), "module compiled");
        Ok(Self {
            inner: Arc::new(ModuleInner {
                engine: engine.clone(),
                name: decoded.name.clone(),
                imports,
                exports,
                kind: ModuleKind::Wasm(decoded),
            }),
        })
    }

    /// Read a module from `path` and compile it
    ///
    /// Failure to read the file is a load failure, failure to compile its
    /// contents a compilation failure.
    pub fn from_file(engine: &Engine, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|error| {
            Error::module_load_failed(path.display().to_string(), Error::from_error(error))
        })?;
        Self::new(engine, bytes)
    }

    /// Wrap a host module. It has no imports and exports its functions and
    /// globals in definition order.
    pub fn from_host(engine: &Engine, host: HostModule) -> Self {
        let exports = host.export_types();
        Self {
            inner: Arc::new(ModuleInner {
                engine: engine.clone(),
                name: Some(host.name().to_owned()),
                imports: Vec::new(),
                exports,
                kind: ModuleKind::Host(host),
            }),
        }
    }

    /// Module name, if it has one
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Imports in declaration order
    pub fn imports(&self) -> &[ImportType] {
        &self.inner.imports
    }

    /// Exports in declaration order
    pub fn exports(&self) -> &[ExportType] {
        &self.inner.exports
    }

    /// Engine the module was compiled with
    pub fn engine(&self) -> &Engine {
        &self.inner.engine
    }

    pub(crate) fn kind(&self) -> &ModuleKind {
        &self.inner.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_a_compilation_failure() {
        let error = Module::new(&Engine::default(), b"not wasm").unwrap_err();
        assert!(error.is_compilation_failure());
        assert!(error.cause().is_some());
    }

    #[test]
    fn missing_file_is_a_load_failure() {
        let error = Module::from_file(&Engine::default(), "/nonexistent/guest.wasm").unwrap_err();
        assert!(error.is_load_failure());
        assert_eq!(error.subject(), Some("/nonexistent/guest.wasm"));
    }

    #[test]
    fn module_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Module>();
    }
}
