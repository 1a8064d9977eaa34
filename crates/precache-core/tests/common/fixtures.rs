//! In-memory registry, fetcher and cache store for deterministic pipeline tests.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use precache_core::cache::{CacheEntry, CacheKey, CacheStore, FileCache};
use precache_core::fetcher::{check_status, DownloadRequest, FetchResult, Fetcher};
use precache_core::package::{ItemKind, PackageDescriptor};
use precache_core::registry::{CoreOffer, Registry};
use precache_core::PrecacheError;

/// MD5 of `HELLO_BODY`.
pub const HELLO_BODY: &[u8] = b"hello\n";
pub const HELLO_MD5: &str = "b1946ac92492d2347c6235b4d2611184";

#[derive(Default)]
pub struct FixtureRegistry {
    pub offers: HashMap<String, Vec<CoreOffer>>,
    pub items: HashMap<(ItemKind, String), PackageDescriptor>,
    pub probes: HashMap<String, u32>,
    pub texts: HashMap<String, String>,
    pub probe_calls: AtomicUsize,
}

impl FixtureRegistry {
    pub fn with_item(mut self, kind: ItemKind, slug: &str, version: &str, url: &str) -> Self {
        self.items.insert(
            (kind, slug.to_string()),
            PackageDescriptor {
                name: slug.to_string(),
                slug: slug.to_string(),
                version: version.to_string(),
                download_url: url.to_string(),
                kind: kind.into(),
            },
        );
        self
    }

    pub fn with_offer(mut self, requested: &str, offered: &str, version: &str, url: &str) -> Self {
        self.offers.entry(requested.to_string()).or_default().push(CoreOffer {
            locale: offered.to_string(),
            version: version.to_string(),
            download: url.to_string(),
        });
        self
    }

    pub fn with_text(mut self, url: &str, body: &str) -> Self {
        self.texts.insert(url.to_string(), body.to_string());
        self
    }

    pub fn with_probe(mut self, url: &str, status: u32) -> Self {
        self.probes.insert(url.to_string(), status);
        self
    }
}

impl Registry for FixtureRegistry {
    fn core_offers(&self, locale: &str) -> Result<Vec<CoreOffer>, PrecacheError> {
        Ok(self.offers.get(locale).cloned().unwrap_or_default())
    }

    fn item_info(&self, kind: ItemKind, slug: &str) -> Result<PackageDescriptor, PrecacheError> {
        self.items
            .get(&(kind, slug.to_string()))
            .cloned()
            .ok_or_else(|| PrecacheError::InvalidSlug {
                kind: kind.into(),
                slug: slug.to_string(),
                status: 404,
            })
    }

    fn probe(&self, url: &str) -> Result<u32, PrecacheError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probes.get(url).copied().unwrap_or(404))
    }

    fn fetch_text(&self, url: &str) -> Result<String, PrecacheError> {
        self.texts
            .get(url)
            .cloned()
            .ok_or_else(|| PrecacheError::RegistryUnreachable {
                url: url.to_string(),
                status: 404,
                reason: "fixture missing".to_string(),
            })
    }
}

/// Serves canned bodies; unknown URLs are 404.
#[derive(Default)]
pub struct FixtureFetcher {
    pub bodies: HashMap<String, (u32, Vec<u8>)>,
    pub calls: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn with_body(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), (200, body.to_vec()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u32) -> Self {
        self.bodies.insert(url.to_string(), (status, Vec::new()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for FixtureFetcher {
    fn fetch(&self, request: &DownloadRequest) -> Result<FetchResult, PrecacheError> {
        self.calls.lock().unwrap().push(request.url.clone());
        let mut file = request.create_temp_file()?;
        let (status, body) = self
            .bodies
            .get(&request.url)
            .cloned()
            .unwrap_or((404, Vec::new()));
        file.write_all(&body).unwrap();
        check_status(&request.url, status)?;
        Ok(FetchResult::new(file, status))
    }
}

/// `FileCache` that counts imports.
pub struct RecordingStore {
    pub inner: FileCache,
    pub imports: AtomicUsize,
}

impl RecordingStore {
    pub fn new(root: &Path) -> Self {
        Self {
            inner: FileCache::new(root),
            imports: AtomicUsize::new(0),
        }
    }

    pub fn import_count(&self) -> usize {
        self.imports.load(Ordering::SeqCst)
    }
}

impl CacheStore for RecordingStore {
    fn has(&self, key: &CacheKey) -> Option<PathBuf> {
        self.inner.has(key)
    }

    fn import(&self, key: &CacheKey, local_path: &Path) -> std::io::Result<PathBuf> {
        self.imports.fetch_add(1, Ordering::SeqCst);
        self.inner.import(key, local_path)
    }

    fn remove(&self, key: &CacheKey) -> std::io::Result<()> {
        self.inner.remove(key)
    }

    fn entries(&self) -> std::io::Result<Vec<CacheEntry>> {
        self.inner.entries()
    }

    fn replace(&self, key: &CacheKey, local_path: &Path) -> std::io::Result<PathBuf> {
        self.imports.fetch_add(1, Ordering::SeqCst);
        self.inner.replace(key, local_path)
    }
}

/// Store whose imports always fail, as on a full or read-only disk.
#[derive(Default)]
pub struct FailingStore;

impl CacheStore for FailingStore {
    fn has(&self, _key: &CacheKey) -> Option<PathBuf> {
        None
    }

    fn import(&self, _key: &CacheKey, _local_path: &Path) -> std::io::Result<PathBuf> {
        Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only cache",
        ))
    }

    fn remove(&self, _key: &CacheKey) -> std::io::Result<()> {
        Ok(())
    }

    fn entries(&self) -> std::io::Result<Vec<CacheEntry>> {
        Ok(Vec::new())
    }
}

/// Number of files left in a directory.
pub fn file_count(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(rd) => rd.count(),
        Err(_) => 0,
    }
}
