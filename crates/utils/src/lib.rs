#[macro_use]
extern crate tracing;

pub mod cache;
pub mod config;
pub mod progress_bar;

#[doc(hidden)]
pub use indicatif;
