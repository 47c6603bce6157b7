pub mod completions;
pub mod debug;
pub mod gas;
pub mod gen;
pub mod op;
pub mod steps;
pub mod trace;
