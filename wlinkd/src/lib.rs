// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! # wlinkd
//!
//! Links a WebAssembly guest against the WASI shim and instantiates it.
//!
//! The run goes through a fixed sequence of phases, each logged at `info`:
//! the engine and store are initialised, the guest binary is loaded and
//! compiled, the WASI shim module is built and instantiated, its exports
//! are collected as a provider, the guest's imports are matched against
//! them, and the guest is instantiated. The store is released on the way
//! out, whether or not the run succeeded.

#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};
use wlink_error::{Error, FromError};
use wlink_runtime::{
    DEFAULT_MAX_MEMORY_PAGES, Engine, EngineConfig, Instance, MatchPolicy, Module, Provider,
    Store, resolve_imports,
};
use wlink_types::{ExportType, ImportType};
use wlink_wasi::{WasiConfig, WasiCtx};

/// What to run and how
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path of the guest binary
    pub module_path:      PathBuf,
    /// WASI context for the guest
    pub wasi:             WasiConfig,
    /// How guest imports are matched against shim exports
    pub match_policy:     MatchPolicy,
    /// Largest initial memory the guest may declare, in pages
    pub max_memory_pages: u32,
}

impl RunConfig {
    /// Defaults for running the guest at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            module_path:      path.into(),
            wasi:             WasiConfig::default(),
            match_policy:     MatchPolicy::NameOnly,
            max_memory_pages: DEFAULT_MAX_MEMORY_PAGES,
        }
    }

    fn engine(&self) -> Engine {
        Engine::new(
            EngineConfig::new()
                .with_match_policy(self.match_policy)
                .with_max_memory_pages(self.max_memory_pages),
        )
    }
}

/// A guest import and the shim export bound to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The import
    pub import:    ImportType,
    /// Namespace of the provider
    pub namespace: String,
    /// Position of the export within the provider
    pub export:    usize,
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Guest module name, if it has one
    pub module_name: Option<String>,
    /// Import bindings, in guest declaration order
    pub bindings:    Vec<Binding>,
    /// Exports of the guest instance, in declaration order
    pub exports:     Vec<ExportType>,
}

fn load(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|error| Error::module_load_failed(path.display().to_string(), Error::from_error(error)))
        .with_context(|| format!("Failed to read WebAssembly file {}", path.display()))
}

fn compile(engine: &Engine, path: &Path) -> Result<Module> {
    info!(path = %path.display(), "Loading binary");
    let bytes = load(path)?;
    debug!(size = bytes.len(), "binary loaded");

    info!("Compiling module");
    Module::new(engine, &bytes).context("Failed to compile WebAssembly module")
}

/// Run the full sequence for `config`
pub fn run(config: &RunConfig) -> Result<RunReport> {
    info!("Initializing");
    let engine = config.engine();
    let report = Store::scope(&engine, |store| link(config, &engine, store));
    info!("Shutting down");
    let report = report?;
    info!("Done");
    Ok(report)
}

fn link(config: &RunConfig, engine: &Engine, store: &mut Store) -> Result<RunReport> {
    let module = compile(engine, &config.module_path)?;

    info!(version = %config.wasi.version, "WASI module");
    let ctx = WasiCtx::new(config.wasi.clone());
    let shim = Module::from_host(engine, ctx.host_module().context("Failed to build WASI module")?);

    info!("Instantiating WASI module");
    let shim = Instance::new(store, &shim, &[]).context("Failed to instantiate WASI module")?;

    info!("Extracting WASI exports");
    let provider = Provider::from_instance(ctx.namespace(), &shim, store)
        .context("Failed to extract WASI exports")?;
    debug!(exports = provider.exports().len(), "WASI exports extracted");

    info!(imports = module.imports().len(), "Matching WASI imports");
    let providers = [provider];
    let table = resolve_imports(&module, &providers, config.match_policy).map_err(|error| {
        match error.unresolved_import_name().map(str::to_owned) {
            Some(name) => anyhow::Error::new(error).context(format!("Import \"{}\" not found", name)),
            None => anyhow!(error),
        }
    })?;

    info!("Instantiating module");
    let instance = Instance::new(store, &module, &table.externs())
        .context("Failed to instantiate WebAssembly module")?;

    let bindings = table
        .iter()
        .map(|slot| Binding {
            import:    slot.import.clone(),
            namespace: providers[slot.provider].namespace().to_owned(),
            export:    slot.export,
        })
        .collect();
    let exports = instance
        .exports(store)?
        .iter()
        .map(|export| Ok(ExportType::new(export.name.clone(), export.value.ty(store)?)))
        .collect::<std::result::Result<Vec<_>, Error>>()?;

    Ok(RunReport { module_name: module.name().map(str::to_owned), bindings, exports })
}

/// Compile the guest and render its imports and exports, one per line
pub fn list(config: &RunConfig) -> Result<Vec<String>> {
    let engine = config.engine();
    let module = compile(&engine, &config.module_path)?;
    let imports = module.imports().iter().map(|import| format!("import {}", import));
    let exports = module.exports().iter().map(|export| format!("export {}", export));
    Ok(imports.chain(exports).collect())
}
