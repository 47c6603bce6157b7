use std::{
    fs,
    marker::PhantomData,
    path::{Path, PathBuf},
    time::Duration,
};

use eyre::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Resolves the on-disk layout of the ARLDB cache.
#[derive(Clone, Debug, Default)]
pub struct CachePath {
    root: Option<PathBuf>,
}

impl CachePath {
    /// New cache path. `None` falls back to the default location under the home directory.
    pub fn new(root: Option<impl Into<PathBuf>>) -> Self {
        Self { root: root.map(Into::into) }
    }

    /// Returns the path to arldb's cache dir: `~/.arldb/cache` by default.
    pub fn arldb_cache_dir(&self) -> Option<PathBuf> {
        self.root.clone().or_else(|| dirs_next::home_dir().map(|p| p.join(".arldb").join("cache")))
    }

    /// Returns the path to the compiler artifact cache: `<cache_root>/archetype`.
    pub fn arldb_compiler_cache_dir(&self) -> Option<PathBuf> {
        Some(self.arldb_cache_dir()?.join("archetype"))
    }
}

/// Content digest used as cache label, so that an edited source never hits a stale entry.
pub fn source_digest(content: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(content.as_ref()))
}

fn sanitize(label: &str) -> String {
    label.chars().map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' }).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    expires_at: u64,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Option<Duration>) -> Self {
        let expires_at = ttl
            .map(|ttl| ttl.as_secs().saturating_add(now_secs()))
            .unwrap_or(u64::MAX);
        Self { data, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at < now_secs()
    }
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// A cache manager that stores data in the file system.
///  - `T` is the type of the data to be cached.
///  - `cache_dir` is where the cache files live. A `None` directory disables caching.
///  - `cache_ttl` is the time-to-live of an entry. `None` means entries never expire.
#[derive(Debug, Clone)]
pub struct Cache<T> {
    cache_dir: Option<PathBuf>,
    cache_ttl: Option<Duration>,
    phantom: PhantomData<T>,
}

impl<T> Cache<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(cache_dir: Option<impl Into<PathBuf>>, cache_ttl: Option<Duration>) -> Result<Self> {
        let cache_dir = match cache_dir {
            Some(dir) => {
                let dir = dir.into();
                fs::create_dir_all(&dir)?;
                Some(dir)
            }
            None => None,
        };

        Ok(Self { cache_dir, cache_ttl, phantom: PhantomData })
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self { cache_dir: None, cache_ttl: None, phantom: PhantomData }
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl
    }

    fn entry_path(&self, label: &str) -> Option<PathBuf> {
        Some(self.cache_dir()?.join(format!("{}.json", sanitize(label))))
    }

    pub fn load_cache(&self, label: impl AsRef<str>) -> Option<T> {
        let cache_file = self.entry_path(label.as_ref())?;
        if !cache_file.exists() {
            return None;
        }
        trace!("loading cache: {:?}", cache_file);

        let content = fs::read_to_string(&cache_file).ok()?;
        let Ok(entry) = serde_json::from_str::<CacheEntry<T>>(&content) else {
            warn!("the cache file has been corrupted: {:?}", cache_file);
            let _ = fs::remove_file(&cache_file);
            return None;
        };

        if entry.is_expired() {
            trace!("the cache file has expired: {:?}", cache_file);
            let _ = fs::remove_file(&cache_file);
            return None;
        }

        trace!("hit the cache: {:?}", cache_file);
        Some(entry.data)
    }

    pub fn save_cache(&self, label: impl AsRef<str>, data: &T) -> Result<()> {
        let Some(cache_file) = self.entry_path(label.as_ref()) else { return Ok(()) };
        trace!("saving cache: {:?}", cache_file);

        let content = serde_json::to_string(&CacheEntry::new(data, self.cache_ttl))?;
        fs::write(&cache_file, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::<Vec<String>>::new(Some(dir.path()), None).unwrap();

        assert!(cache.load_cache("missing").is_none());

        let data = vec!["a".to_string(), "b".to_string()];
        cache.save_cache("entry", &data).unwrap();
        assert_eq!(cache.load_cache("entry"), Some(data));
    }

    #[test]
    fn test_corrupted_cache_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::<u32>::new(Some(dir.path()), None).unwrap();
        let file = dir.path().join("broken.json");
        fs::write(&file, "not json").unwrap();

        assert!(cache.load_cache("broken").is_none());
        assert!(!file.exists());
    }

    #[test]
    fn test_expired_cache_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::<u32>::new(Some(dir.path()), None).unwrap();
        let file = dir.path().join("old.json");
        fs::write(&file, r#"{"data":7,"expires_at":0}"#).unwrap();

        assert!(cache.load_cache("old").is_none());
        assert!(!file.exists());
    }

    #[test]
    fn test_disabled_cache() {
        let cache = Cache::<u32>::disabled();
        cache.save_cache("x", &1).unwrap();
        assert!(cache.load_cache("x").is_none());
    }

    #[test]
    fn test_source_digest() {
        assert_eq!(
            source_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(source_digest("a"), source_digest("b"));
    }

    #[test]
    fn test_cache_path_layout() {
        let path = CachePath::new(Some("/tmp/arldb"));
        assert_eq!(path.arldb_compiler_cache_dir(), Some(PathBuf::from("/tmp/arldb/archetype")));
        assert_eq!(path.arldb_cache_dir(), Some(PathBuf::from("/tmp/arldb")));
    }
}
