//! Directory-backed cache store.
//!
//! Entries are plain files at `<root>/<key>`. Imports write a uniquely named
//! `<entry>.<random>.part`, fsync, then rename over the final name, so readers
//! never observe a partially copied archive.

use anyhow::Result;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::lock::KeyLocks;
use super::{CacheEntry, CacheKey, CacheStore};

/// Environment variable that overrides the cache directory. Shared with
/// WP-CLI so entries written here are picked up by its installers.
pub const CACHE_DIR_ENV: &str = "WP_CLI_CACHE_DIR";

/// Temporary file suffix used before atomic rename.
const TEMP_SUFFIX: &str = ".part";

/// Picks the cache root: `WP_CLI_CACHE_DIR`, then the configured directory,
/// then `$XDG_CACHE_HOME/wp-precache`.
pub fn resolve_cache_dir(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CACHE_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = configured {
        return Ok(dir.to_path_buf());
    }
    let xdg_dirs = xdg::BaseDirectories::with_prefix("wp-precache")?;
    Ok(xdg_dirs.get_cache_home())
}

/// Cache store rooted at a local directory.
///
/// Clones share one set of per-key writer locks, so concurrent batch items
/// writing the same key through any clone take turns.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
    locks: Arc<KeyLocks>,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Arc::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk path for `key`. Rejects keys that would escape the root.
    pub fn entry_path(&self, key: &CacheKey) -> io::Result<PathBuf> {
        let rel = Path::new(key.as_str());
        let valid = !key.as_str().is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid cache key: {key}"),
            ));
        }
        Ok(self.root.join(rel))
    }

    /// Copies `src` next to `final_path` under a unique `.part` name, fsyncs,
    /// then renames it over `final_path`. The part file is removed on failure.
    fn write_entry(&self, src: &Path, final_path: &Path) -> io::Result<()> {
        let parent = final_path.parent().unwrap_or(self.root.as_path());
        fs::create_dir_all(parent)?;
        let name = final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut part = tempfile::Builder::new()
            .prefix(&format!("{name}."))
            .suffix(TEMP_SUFFIX)
            .tempfile_in(parent)?;
        let mut reader = File::open(src)?;
        io::copy(&mut reader, part.as_file_mut())?;
        part.as_file().sync_all()?;
        part.persist(final_path)?;
        Ok(())
    }

    fn remove_entry(&self, key: &CacheKey) -> io::Result<()> {
        match fs::remove_file(self.entry_path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl CacheStore for FileCache {
    fn has(&self, key: &CacheKey) -> Option<PathBuf> {
        let path = self.entry_path(key).ok()?;
        path.is_file().then_some(path)
    }

    fn import(&self, key: &CacheKey, local_path: &Path) -> io::Result<PathBuf> {
        let final_path = self.entry_path(key)?;
        let _guard = self.locks.acquire(key);
        self.write_entry(local_path, &final_path)?;
        tracing::debug!(key = %key, path = %final_path.display(), "imported cache entry");
        Ok(final_path)
    }

    fn remove(&self, key: &CacheKey) -> io::Result<()> {
        let _guard = self.locks.acquire(key);
        self.remove_entry(key)
    }

    fn replace(&self, key: &CacheKey, local_path: &Path) -> io::Result<PathBuf> {
        let final_path = self.entry_path(key)?;
        let _guard = self.locks.acquire(key);
        if final_path.is_file() {
            tracing::debug!(key = %key, path = %final_path.display(), "evicting stale cache entry");
            self.remove_entry(key)?;
        }
        self.write_entry(local_path, &final_path)?;
        tracing::debug!(key = %key, path = %final_path.display(), "imported cache entry");
        Ok(final_path)
    }

    fn entries(&self) -> io::Result<Vec<CacheEntry>> {
        let mut out = Vec::new();
        if !self.root.is_dir() {
            return Ok(out);
        }
        let mut stack = vec![self.root.clone()];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                let meta = entry.metadata()?;
                if meta.is_dir() {
                    stack.push(path);
                    continue;
                }
                if path.to_string_lossy().ends_with(TEMP_SUFFIX) {
                    continue;
                }
                let Ok(rel) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push(CacheEntry {
                    key,
                    path,
                    size: meta.len(),
                });
            }
        }
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }
}
