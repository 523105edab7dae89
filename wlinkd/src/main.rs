// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! # wlinkd
//!
//! Links a WebAssembly guest against the WASI shim and instantiates it.
//!
//! ## Usage
//!
//! ```bash
//! wlinkd <guest.wasm> [--wasi-version unstable|preview1] [--qualified]
//!        [--arg <value>]... [--env KEY=VALUE]... [--max-memory-pages <n>] [--list]
//! ```
//!
//! Logging is controlled by `RUST_LOG` (default `info`) and
//! `RUST_LOG_FORMAT` (`pretty`, `compact` or `json`).

#![warn(missing_docs)]

use std::{env, path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use wlink_runtime::{DEFAULT_MAX_MEMORY_PAGES, MatchPolicy};
use wlink_wasi::{WasiConfig, WasiVersion, parse_env_pair};
use wlinkd::{RunConfig, list, run};

/// wlink driver CLI arguments
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the WebAssembly module to link
    wasm_file: PathBuf,

    /// WASI snapshot the shim provides
    #[arg(long, env = "WLINK_WASI_VERSION", default_value = "unstable")]
    wasi_version: WasiVersion,

    /// Only match imports whose namespace equals the shim's namespace
    #[arg(long, env = "WLINK_QUALIFIED")]
    qualified: bool,

    /// Argument passed to the guest; repeatable
    #[arg(long = "arg", value_name = "VALUE")]
    args: Vec<String>,

    /// Environment variable passed to the guest; repeatable
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env)]
    env: Vec<(String, String)>,

    /// Largest initial memory the guest may declare, in 64 KiB pages
    #[arg(long, env = "WLINK_MAX_MEMORY_PAGES", default_value_t = DEFAULT_MAX_MEMORY_PAGES)]
    max_memory_pages: u32,

    /// Print the guest's imports and exports and exit
    #[arg(long)]
    list: bool,
}

fn parse_env(pair: &str) -> Result<(String, String), String> {
    parse_env_pair(pair).map_err(|error| error.message().to_owned())
}

impl Args {
    fn run_config(&self) -> RunConfig {
        let program = self.wasm_file.display().to_string();
        let wasi = WasiConfig::new()
            .with_version(self.wasi_version)
            .with_arg(program)
            .with_args(self.args.iter().cloned());
        let wasi = self.env.iter().fold(wasi, |wasi, (key, value)| wasi.with_env(key, value));
        RunConfig {
            wasi,
            match_policy: if self.qualified { MatchPolicy::Qualified } else { MatchPolicy::NameOnly },
            max_memory_pages: self.max_memory_pages,
            ..RunConfig::new(&self.wasm_file)
        }
    }
}

/// Initialize the tracing system for logging
fn initialize_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format.as_str() {
        "json" => subscriber.json().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.pretty().init(),
    }
}

fn main() -> ExitCode {
    initialize_tracing();
    let args = Args::parse();
    let config = args.run_config();

    if args.list {
        return match list(&config) {
            Ok(lines) => {
                for line in lines {
                    println!("{}", line);
                }
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("{:#}", err);
                ExitCode::FAILURE
            }
        };
    }

    match run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
