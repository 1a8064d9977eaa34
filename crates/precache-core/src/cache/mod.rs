//! Keyed artifact cache.
//!
//! Keys are stable relative paths (`plugin/akismet-5.0.zip`,
//! `core/wordpress-6.4-en_US.tar.gz`) so that a later install asking for the
//! same package, version and locale finds the same entry.

mod commit;
mod file;
mod lock;

pub use commit::commit;
pub use file::{resolve_cache_dir, FileCache, CACHE_DIR_ENV};

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::package::{FileType, PackageDescriptor, PackageKind};

/// Deterministic cache key for an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// `{kind}/{slug}-{version}.{ext}`
    pub fn for_item(kind: PackageKind, slug: &str, version: &str, file_type: FileType) -> Self {
        CacheKey(format!("{}/{}-{}.{}", kind, slug, version, file_type.extension()))
    }

    /// `core/wordpress-{version}-{locale}.{ext}`
    pub fn for_core(version: &str, locale: &str, file_type: FileType) -> Self {
        CacheKey(format!(
            "core/wordpress-{}-{}.{}",
            version,
            locale,
            file_type.extension()
        ))
    }

    /// Key for a descriptor. Core descriptors carry their locale in `slug`.
    pub fn for_descriptor(descriptor: &PackageDescriptor) -> Self {
        let file_type = descriptor.file_type();
        match descriptor.kind {
            PackageKind::Core => Self::for_core(&descriptor.version, &descriptor.slug, file_type),
            kind => Self::for_item(kind, &descriptor.slug, &descriptor.version, file_type),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored entry as reported by `CacheStore::entries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Storage the committer writes verified artifacts into.
///
/// The committer goes through `replace`. Implementations shared between
/// concurrent batch items must not interleave two `replace` calls for the
/// same key; `FileCache` holds a per-key lock for the whole call.
pub trait CacheStore: Send + Sync {
    /// Path of the stored entry, if present.
    fn has(&self, key: &CacheKey) -> Option<PathBuf>;

    /// Copy `local_path` into the store under `key`, replacing any entry.
    fn import(&self, key: &CacheKey, local_path: &Path) -> io::Result<PathBuf>;

    /// Remove the entry under `key`. Missing entries are not an error.
    fn remove(&self, key: &CacheKey) -> io::Result<()>;

    /// Every stored entry, sorted by key.
    fn entries(&self) -> io::Result<Vec<CacheEntry>>;

    /// Evicts any stale entry under `key`, then imports `local_path`.
    fn replace(&self, key: &CacheKey, local_path: &Path) -> io::Result<PathBuf> {
        if let Some(stale) = self.has(key) {
            tracing::debug!(key = %key, path = %stale.display(), "evicting stale cache entry");
            self.remove(key)?;
        }
        self.import(key, local_path)
    }
}
