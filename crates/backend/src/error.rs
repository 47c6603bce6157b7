//! Error taxonomy of the reconstruction core.
//!
//! Parsing and reconstruction failures are [`TraceError`]s, rejected user values are
//! [`InputError`]s and external process failures are [`ToolError`]s. VM failures (`FAILWITH`)
//! are not errors: they are carried as data in [`crate::trace::Trace::fail`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// The raw trace text is empty or whitespace only.
    #[error("invalid trace input: empty")]
    Empty,

    /// The raw trace text has no `trace` section.
    #[error("invalid trace input: missing `trace` section")]
    MissingTraceSection,

    /// A trace item points to a location that the structural map does not know.
    #[error("trace location {location} is out of the structural map (size {size})")]
    UnknownLocation { location: usize, size: usize },

    /// The debug annotation names and the runtime stack do not line up.
    #[error(
        "stack mismatch at location {location}: {} name(s) [{}] for {} value(s) [{}]",
        names.len(),
        names.join(", "),
        values.len(),
        values.join(", ")
    )]
    StackMismatch { location: usize, names: Vec<String>, values: Vec<String> },
}

/// A user supplied value was rejected.
///
/// `field` names what was being entered (`argument`, `caller`, ...) and `detail` says which
/// rule failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: {detail}")]
pub struct InputError {
    pub field: String,
    pub detail: String,
}

impl InputError {
    pub fn new(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { field: field.into(), detail: detail.into() }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to spawn {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program:?} exited with {status}: {stderr}")]
    Failed { program: PathBuf, status: String, stderr: String },
}
