// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Configuration of a WASI context.

use std::{
    fmt,
    str::FromStr,
    sync::{Arc, Mutex},
};

use wlink_error::{Error, Result};

/// Which snapshot of the WASI function table to provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WasiVersion {
    /// Snapshot 0, namespace `wasi_unstable`
    #[default]
    Unstable,
    /// Snapshot 1, namespace `wasi_snapshot_preview1`
    Preview1,
}

impl WasiVersion {
    /// Import namespace guests use for this version
    pub fn namespace(self) -> &'static str {
        match self {
            WasiVersion::Unstable => "wasi_unstable",
            WasiVersion::Preview1 => "wasi_snapshot_preview1",
        }
    }

    /// Version whose namespace is `namespace`, if any
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            "wasi_unstable" => Some(WasiVersion::Unstable),
            "wasi_snapshot_preview1" => Some(WasiVersion::Preview1),
            _ => None,
        }
    }
}

impl fmt::Display for WasiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

impl FromStr for WasiVersion {
    type Err = Error;

    /// Accepts the short names `unstable` and `preview1` as well as the
    /// namespaces themselves
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unstable" => Ok(WasiVersion::Unstable),
            "preview1" => Ok(WasiVersion::Preview1),
            other => Self::from_namespace(other).ok_or_else(|| {
                Error::invalid_argument(format!(
                    "unknown WASI version '{}', expected 'unstable' or 'preview1'",
                    other
                ))
            }),
        }
    }
}

/// In-memory output shared between the context and the embedder
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far
    pub fn contents(&self) -> Vec<u8> {
        match self.0.lock() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Contents decoded as UTF-8, lossily
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    pub(crate) fn append(&self, bytes: &[u8]) {
        match self.0.lock() {
            Ok(mut data) => data.extend_from_slice(bytes),
            Err(poisoned) => poisoned.into_inner().extend_from_slice(bytes),
        }
    }
}

/// Where a guest output stream goes
#[derive(Debug, Clone, Default)]
pub enum OutputSink {
    /// The host process's own stream
    #[default]
    Inherit,
    /// An in-memory buffer
    Buffer(SharedBuffer),
    /// Discard everything
    Null,
}

/// Everything a WASI context is created from
#[derive(Debug, Clone, Default)]
pub struct WasiConfig {
    /// Which function table to provide
    pub version: WasiVersion,
    /// Command line arguments, program name first
    pub args:    Vec<String>,
    /// Environment variables
    pub env:     Vec<(String, String)>,
    /// Bytes served by reads from descriptor 0
    pub stdin:   Vec<u8>,
    /// Destination of descriptor 1
    pub stdout:  OutputSink,
    /// Destination of descriptor 2
    pub stderr:  OutputSink,
    /// Seed for `random_get`; derived from the clock when unset
    pub seed:    Option<u64>,
}

impl WasiConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the version
    #[must_use]
    pub fn with_version(mut self, version: WasiVersion) -> Self {
        self.version = version;
        self
    }

    /// Append one argument
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an environment variable
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set the bytes served on standard input
    #[must_use]
    pub fn with_stdin(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.stdin = bytes.into();
        self
    }

    /// Set the standard output sink
    #[must_use]
    pub fn with_stdout(mut self, sink: OutputSink) -> Self {
        self.stdout = sink;
        self
    }

    /// Set the standard error sink
    #[must_use]
    pub fn with_stderr(mut self, sink: OutputSink) -> Self {
        self.stderr = sink;
        self
    }

    /// Fix the random seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Split `KEY=VALUE`
pub fn parse_env_pair(pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(Error::invalid_argument(format!(
            "environment variable '{}' is not of the form KEY=VALUE",
            pair
        ))),
    }
}
