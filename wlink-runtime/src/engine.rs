// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Engine and engine configuration.

use std::sync::Arc;

use crate::linker::MatchPolicy;

/// Default upper bound for linear memory, in pages (1 GiB)
pub const DEFAULT_MAX_MEMORY_PAGES: u32 = 16384;
/// Default upper bound for table sizes, in elements
pub const DEFAULT_MAX_TABLE_ELEMENTS: u32 = 1_000_000;

/// Configuration shared by everything created from one [`Engine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How imports are matched against provider exports
    pub match_policy:       MatchPolicy,
    /// Largest initial memory size an instantiation may allocate
    pub max_memory_pages:   u32,
    /// Largest initial table size an instantiation may allocate
    pub max_table_elements: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_policy:       MatchPolicy::NameOnly,
            max_memory_pages:   DEFAULT_MAX_MEMORY_PAGES,
            max_table_elements: DEFAULT_MAX_TABLE_ELEMENTS,
        }
    }
}

impl EngineConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the import match policy
    #[must_use]
    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    /// Set the memory page limit
    #[must_use]
    pub fn with_max_memory_pages(mut self, pages: u32) -> Self {
        self.max_memory_pages = pages;
        self
    }

    /// Set the table element limit
    #[must_use]
    pub fn with_max_table_elements(mut self, elements: u32) -> Self {
        self.max_table_elements = elements;
        self
    }
}

/// Compilation and configuration context. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: Arc<EngineConfig>,
}

impl Engine {
    /// Create an engine with `config`
    pub fn new(config: EngineConfig) -> Self {
        Self { config: Arc::new(config) }
    }

    /// The engine's configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether two handles refer to the same engine
    pub fn same(a: &Engine, b: &Engine) -> bool {
        Arc::ptr_eq(&a.config, &b.config)
    }
}
