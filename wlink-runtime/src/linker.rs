// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Import resolution and instantiation.
//!
//! A module's imports are bound to the exports of already instantiated
//! providers. For each import, in declaration order, the providers are
//! scanned in list order and, within a provider, in export order; the
//! first export whose name is byte-for-byte equal to the import name wins.
//! There is no type scoring at match time: a first match with an
//! incompatible type is still selected and is then rejected by
//! instantiation.
//!
//! By default the import's namespace is ignored ([`MatchPolicy::NameOnly`]).
//! [`MatchPolicy::Qualified`] additionally requires the provider's
//! namespace to equal the import's module name.
//!
//! Resolution stops at the first import without a match and reports its
//! name.

use tracing::{debug, info_span, warn};
use wlink_error::{Error, ErrorCategory, Result, codes};
use wlink_types::{ExportType, ImportType};

use crate::{Engine, Extern, Instance, Module, Store};

/// How import names are compared against provider exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchPolicy {
    /// Match on the import name alone, ignoring its namespace
    #[default]
    NameOnly,
    /// Match on the name, and require the provider namespace to equal the
    /// import's module name
    Qualified,
}

/// One export offered by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedExport {
    /// Export descriptor
    pub ty:    ExportType,
    /// Value bound to an import that matches it
    pub value: Extern,
}

/// A namespace-labelled, ordered list of exports offered for resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    namespace: String,
    exports:   Vec<ProvidedExport>,
}

impl Provider {
    /// Create a provider from export records
    pub fn new(namespace: impl Into<String>, exports: Vec<ProvidedExport>) -> Self {
        Self { namespace: namespace.into(), exports }
    }

    /// Create a provider from parallel descriptor and value lists
    ///
    /// The lists must have the same length and each value must be of the
    /// same kind as its descriptor.
    pub fn from_parts(
        namespace: impl Into<String>,
        descriptors: Vec<ExportType>,
        values: Vec<Extern>,
    ) -> Result<Self> {
        if descriptors.len() != values.len() {
            return Err(misaligned(format!(
                "{} export descriptors but {} values",
                descriptors.len(),
                values.len()
            )));
        }
        let exports = descriptors
            .into_iter()
            .zip(values)
            .enumerate()
            .map(|(position, (ty, value))| {
                if ty.ty.kind() != value.kind() {
                    return Err(misaligned(format!(
                        "export {} \"{}\" is declared as {} but the value is a {}",
                        position,
                        ty.name,
                        ty.ty.kind(),
                        value.kind()
                    )));
                }
                Ok(ProvidedExport { ty, value })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(namespace, exports))
    }

    /// The exports of `instance`, in declaration order
    pub fn from_instance(
        namespace: impl Into<String>,
        instance: &Instance,
        store: &Store,
    ) -> Result<Self> {
        let exports = instance
            .exports(store)?
            .iter()
            .map(|export| {
                Ok(ProvidedExport {
                    ty:    ExportType::new(export.name.clone(), export.value.ty(store)?),
                    value: export.value,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(namespace, exports))
    }

    /// Namespace label
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Exports in order
    pub fn exports(&self) -> &[ProvidedExport] {
        &self.exports
    }
}

fn misaligned(message: String) -> Error {
    Error::new(ErrorCategory::Link, codes::PROVIDER_MISALIGNED, message)
}

/// One slot of an [`ImportBindingTable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    /// The import this slot satisfies
    pub import:   ImportType,
    /// The bound value
    pub value:    Extern,
    /// Position of the provider the value came from
    pub provider: usize,
    /// Position of the export within that provider
    pub export:   usize,
}

/// Values for a module's imports, positionally aligned with
/// [`Module::imports`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportBindingTable {
    entries: Vec<ResolvedImport>,
}

impl ImportBindingTable {
    /// Number of slots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Slots in import order
    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedImport> {
        self.entries.iter()
    }

    /// Slot `index`
    pub fn get(&self, index: usize) -> Option<&ResolvedImport> {
        self.entries.get(index)
    }

    /// The bound values, in import order, as instantiation takes them
    pub fn externs(&self) -> Vec<Extern> {
        self.entries.iter().map(|entry| entry.value).collect()
    }
}

impl<'a> IntoIterator for &'a ImportBindingTable {
    type Item = &'a ResolvedImport;
    type IntoIter = std::slice::Iter<'a, ResolvedImport>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn find_export<'p>(
    import: &ImportType,
    providers: &'p [Provider],
    policy: MatchPolicy,
) -> Option<(usize, usize, &'p ProvidedExport)> {
    providers
        .iter()
        .enumerate()
        .filter(|(_, provider)| match policy {
            MatchPolicy::NameOnly => true,
            MatchPolicy::Qualified => provider.namespace == import.module,
        })
        .find_map(|(p, provider)| {
            provider
                .exports
                .iter()
                .enumerate()
                .find(|(_, export)| export.ty.name.as_bytes() == import.name.as_bytes())
                .map(|(e, export)| (p, e, export))
        })
}

/// Bind every import of `module` to the first matching provider export
///
/// Fails with an unresolved-import error naming the first import, in
/// declaration order, that no provider exports.
pub fn resolve_imports(
    module: &Module,
    providers: &[Provider],
    policy: MatchPolicy,
) -> Result<ImportBindingTable> {
    let _span = info_span!(
        "link",
        module = module.name().unwrap_or("<anonymous>"),
        imports = module.imports().len()
    )
    .entered();

    let mut entries = Vec::with_capacity(module.imports().len());
    for import in module.imports() {
        let Some((provider, export, found)) = find_export(import, providers, policy) else {
            warn!(module = %import.module, import = %import.name, "import not found");
            return Err(Error::unresolved_import(import.name.clone()));
        };
        debug!(
            import = %import.name,
            provider = %providers[provider].namespace,
            export,
            ty = %found.ty.ty,
            "import resolved"
        );
        entries.push(ResolvedImport { import: import.clone(), value: found.value, provider, export });
    }
    Ok(ImportBindingTable { entries })
}

/// Resolve the imports of `module` with the store engine's match policy,
/// then instantiate it
pub fn resolve_and_instantiate(
    store: &mut Store,
    module: &Module,
    providers: &[Provider],
) -> Result<Instance> {
    let policy = store.engine().config().match_policy;
    let table = resolve_imports(module, providers, policy)?;
    Instance::new(store, module, &table.externs())
}

/// Holds providers and a policy for linking any number of modules
#[derive(Debug, Clone, Default)]
pub struct Linker {
    providers: Vec<Provider>,
    policy:    MatchPolicy,
}

impl Linker {
    /// Create a linker using `engine`'s match policy
    pub fn new(engine: &Engine) -> Self {
        Self { providers: Vec::new(), policy: engine.config().match_policy }
    }

    /// Override the match policy
    #[must_use]
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current match policy
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Append a provider; earlier providers take precedence
    pub fn define(&mut self, provider: Provider) -> &mut Self {
        self.providers.push(provider);
        self
    }

    /// Append the exports of `instance` as a provider
    pub fn define_instance(
        &mut self,
        namespace: impl Into<String>,
        instance: &Instance,
        store: &Store,
    ) -> Result<&mut Self> {
        let provider = Provider::from_instance(namespace, instance, store)?;
        Ok(self.define(provider))
    }

    /// Providers in precedence order
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Resolve the imports of `module`
    pub fn resolve(&self, module: &Module) -> Result<ImportBindingTable> {
        resolve_imports(module, &self.providers, self.policy)
    }

    /// Resolve the imports of `module` and instantiate it
    pub fn instantiate(&self, store: &mut Store, module: &Module) -> Result<Instance> {
        let table = self.resolve(module)?;
        Instance::new(store, module, &table.externs())
    }
}
