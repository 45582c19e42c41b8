// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error taxonomy shared by the kernel, the I/O layer and the scene

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by every fallible polyset operation.
#[derive(Debug, Error)]
pub enum Error {
    /// A mesh file could not be parsed.
    #[error("failed to parse {format} input{}: {message}", .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Parse {
        format: String,
        line: Option<usize>,
        message: String,
    },

    /// A boundary mesh is not a closed, oriented, planar-faced 2-manifold.
    #[error("invalid boundary: {0}")]
    InvalidBoundary(String),

    /// A set cannot be written as a clean solid boundary.
    #[error("result is not a regular solid: {0}")]
    NonRegularResult(String),

    /// The same directed half-edge was emitted by two loops.
    #[error("inconsistent orientation: half-edge {from} -> {to} occurs more than once")]
    InconsistentOrientation { from: usize, to: usize },

    /// Unknown Boolean combination operator.
    #[error("unsupported boolean operator '{0}' (expected '+', '-' or '*')")]
    UnsupportedOperator(String),

    #[error("no target loaded")]
    NoTargetLoaded,

    #[error("facet {facet} out of range (target has {count} facets)")]
    UnknownFacet { facet: usize, count: usize },

    #[error("scene is empty")]
    EmptyScene,

    /// File extension or format name not recognised.
    #[error("unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    /// A textual scene command is malformed.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(format: impl Into<String>, line: Option<usize>, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            line,
            message: message.into(),
        }
    }
}

/// Convenience alias for results using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
