mod cache;
mod env;
mod tools;

pub use cache::CacheOpts;
pub use env::EnvOpts;
pub use tools::ToolOpts;
