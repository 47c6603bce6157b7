//! # arldb-backend
//!
//! ARLDB's core: lexing of the interpreter trace, reconstruction of source-level steps,
//! gas aggregation, typed user inputs and invocation of the external tools.

#[macro_use]
extern crate tracing;

pub mod analysis;
pub mod artifact;
mod core;
pub mod entry;
pub mod error;
pub mod operation;
pub mod tools;
pub mod trace;
pub mod utils;

pub use crate::core::{reconstruct, CompiledContract, DebugArtifact, DebugBackend, DebugBackendBuilder, DebugRequest};

#[cfg(test)]
pub(crate) fn testdata(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../testdata").join(name)
}
