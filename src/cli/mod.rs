// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem for polyset

pub mod reporter;
pub mod runner;

pub use reporter::Reporter;
pub use runner::{RunResult, Runner};

use crate::config::SceneConfig;
use tracing_subscriber::EnvFilter;

/// Install the stderr tracing subscriber.
///
/// `RUST_LOG` wins, then `--verbose` (debug for polyset), then the
/// configured filter. A second call is a no-op.
pub fn init_logging(config: &SceneConfig, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("polyset=debug")
        } else {
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"))
        }
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
