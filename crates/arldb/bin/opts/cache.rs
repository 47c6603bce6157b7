use std::{path::PathBuf, time::Duration};

use arldb_backend::DebugBackendBuilder;
use arldb_utils::cache::CachePath;
use clap::Parser;
use serde::Serialize;

/// Where compiled contracts are kept between sessions.
#[derive(Clone, Debug, Default, Serialize, Parser)]
pub struct CacheOpts {
    /// The cache directory. If not provided, the default is `~/.arldb/cache`.
    #[clap(long, env = "ARLDB_CACHE_ROOT", value_name = "DIR", conflicts_with = "no_cache")]
    pub cache_root: Option<PathBuf>,

    /// Recompile contracts cached more than this many hours ago. Entries never expire by default.
    #[clap(long, value_name = "HOURS", conflicts_with = "no_cache")]
    pub cache_ttl: Option<u64>,

    /// Always recompile the contract.
    #[clap(long)]
    pub no_cache: bool,
}

impl CacheOpts {
    /// The cache directory, or `None` when caching is off.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        if self.no_cache {
            return None;
        }
        CachePath::new(self.cache_root.clone()).arldb_cache_dir()
    }

    pub fn configure(&self, builder: DebugBackendBuilder) -> DebugBackendBuilder {
        let Some(root) = self.cache_dir() else {
            return builder.no_cache(true);
        };
        let builder = builder.cache_root(root);
        match self.cache_ttl {
            Some(hours) => builder.cache_ttl(Duration::from_secs(hours.saturating_mul(3600))),
            None => builder,
        }
    }
}

#[cfg(test)]
mod tests {
    use arldb_backend::DebugBackend;
    use arldb_utils::config::ToolConfig;

    use super::*;

    #[test]
    fn test_cache_dir() {
        let opts = CacheOpts { cache_root: Some("/tmp/arldb".into()), ..Default::default() };
        assert_eq!(opts.cache_dir(), Some(PathBuf::from("/tmp/arldb")));

        let opts = CacheOpts { cache_root: Some("/tmp/arldb".into()), no_cache: true, ..Default::default() };
        assert_eq!(opts.cache_dir(), None);
    }

    #[test]
    fn test_configure_backend() {
        let dir = tempfile::tempdir().unwrap();
        let opts = CacheOpts { cache_root: Some(dir.path().to_path_buf()), cache_ttl: Some(24), no_cache: false };
        opts.configure(DebugBackend::builder().config(ToolConfig::default())).build().unwrap();
        assert!(dir.path().join("archetype").is_dir());

        let dir = tempfile::tempdir().unwrap();
        let opts = CacheOpts { cache_root: Some(dir.path().to_path_buf()), no_cache: true, ..Default::default() };
        opts.configure(DebugBackend::builder().config(ToolConfig::default())).build().unwrap();
        assert!(!dir.path().join("archetype").exists());
    }
}
