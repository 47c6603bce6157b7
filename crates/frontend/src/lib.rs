//! # arldb-frontend
//!
//! The stepping session of ARLDB: a cursor over a reconstructed execution, breakpoints,
//! variable views and the events a debug adapter consumes.

#[macro_use]
extern crate tracing;

mod context;
mod core;
pub mod event;
pub mod input;
pub mod variables;

pub use crate::core::DebugFrontend;
pub use context::{Breakpoint, DebugContext, StackFrame};

#[cfg(test)]
pub(crate) fn testdata(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../testdata").join(name)
}
