//! Fetch-verify-cache orchestration.
//!
//! Each requested package goes through two steps:
//! lookup (registry → descriptor → version rewrite) and
//! transfer (fetch → verify (core only) → commit).
//! A `StepPolicy` decides per step whether a failure skips the item or
//! aborts the whole run.

mod parallel;
mod report;

pub use parallel::precache_items_parallel;
pub use report::{BatchReport, Outcome, SkippedItem};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{self, CacheKey, CacheStore};
use crate::checksum;
use crate::error::PrecacheError;
use crate::fetcher::{DownloadRequest, Fetcher, DEFAULT_DOWNLOAD_TIMEOUT};
use crate::package::{FileType, ItemKind, PackageDescriptor, PackageKind};
use crate::registry::Registry;
use crate::resolver::{RegistryEndpoints, REFERENCE_LOCALE};
use crate::rewrite;

/// What to do when a step fails for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError {
    /// Log a warning, skip the item, keep going. Only errors about the item
    /// itself are skipped; a failing registry or disk still aborts.
    Continue,
    /// Stop and return the error.
    Abort,
}

impl OnError {
    fn handle(self, slug: &str, error: PrecacheError) -> Result<Outcome, PrecacheError> {
        match self {
            OnError::Continue if error.is_per_item() => {
                tracing::warn!(slug, "skipping: {}", error);
                Ok(Outcome::Skipped(SkippedItem {
                    slug: slug.to_string(),
                    error,
                }))
            }
            OnError::Continue | OnError::Abort => Err(error),
        }
    }
}

/// Error policy for the two steps of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPolicy {
    pub lookup: OnError,
    pub transfer: OnError,
}

impl StepPolicy {
    /// Single core release: every failure is fatal.
    pub const FAIL_FAST: StepPolicy = StepPolicy {
        lookup: OnError::Abort,
        transfer: OnError::Abort,
    };

    /// Theme/plugin batches: unknown slugs or versions are skipped; registry
    /// outages and transfer failures are fatal.
    pub const BATCH: StepPolicy = StepPolicy {
        lookup: OnError::Continue,
        transfer: OnError::Abort,
    };
}

/// Which core release to cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreRequest {
    /// Explicit version; `None` asks the registry for the current offer.
    pub version: Option<String>,
    pub locale: String,
    pub file_type: FileType,
}

impl Default for CoreRequest {
    fn default() -> Self {
        Self {
            version: None,
            locale: REFERENCE_LOCALE.to_string(),
            file_type: FileType::TarGz,
        }
    }
}

/// The fetch-verify-cache pipeline over swappable collaborators.
#[derive(Clone)]
pub struct Pipeline {
    registry: Arc<dyn Registry>,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn CacheStore>,
    endpoints: RegistryEndpoints,
    scratch_dir: PathBuf,
    download_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        registry: Arc<dyn Registry>,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn CacheStore>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            store,
            endpoints: RegistryEndpoints::default(),
            scratch_dir: scratch_dir.into(),
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        }
    }

    /// Hosts used to build explicit-version core download URLs.
    pub fn with_endpoints(mut self, endpoints: RegistryEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Caches one core release.
    pub fn precache_core(
        &self,
        request: &CoreRequest,
        policy: StepPolicy,
    ) -> Result<BatchReport, PrecacheError> {
        let mut report = BatchReport::new(PackageKind::Core);
        let label = request.locale.as_str();
        let outcome = match self.resolve_core(request) {
            Ok(descriptor) => match self.transfer(&descriptor) {
                Ok(key) => Outcome::Written(key),
                Err(e) => policy.transfer.handle(label, e)?,
            },
            Err(e) => policy.lookup.handle(label, e)?,
        };
        report.record(outcome);
        Ok(report)
    }

    /// Caches each slug in order.
    pub fn precache_items(
        &self,
        kind: ItemKind,
        slugs: &[String],
        version: Option<&str>,
        policy: StepPolicy,
    ) -> Result<BatchReport, PrecacheError> {
        let mut report = BatchReport::new(kind.into());
        for slug in slugs {
            report.record(self.process_item(kind, slug, version, policy)?);
        }
        Ok(report)
    }

    /// Lookup and transfer for a single theme or plugin.
    pub fn process_item(
        &self,
        kind: ItemKind,
        slug: &str,
        version: Option<&str>,
        policy: StepPolicy,
    ) -> Result<Outcome, PrecacheError> {
        let descriptor = match self.resolve_item(kind, slug, version) {
            Ok(d) => d,
            Err(e) => return policy.lookup.handle(slug, e),
        };
        match self.transfer(&descriptor) {
            Ok(key) => Ok(Outcome::Written(key)),
            Err(e) => policy.transfer.handle(slug, e),
        }
    }

    /// Descriptor for a core release, from an explicit version or the
    /// registry's current offer.
    pub fn resolve_core(&self, request: &CoreRequest) -> Result<PackageDescriptor, PrecacheError> {
        let locale = request.locale.as_str();
        if let Some(version) = request.version.as_deref() {
            let url = self
                .endpoints
                .core_download_url(version, locale, request.file_type);
            return Ok(PackageDescriptor::core(version, locale, url));
        }

        let offer = self.registry.current_offer(locale)?;
        let url = match request.file_type {
            FileType::TarGz => offer.download.replace(".zip", ".tar.gz"),
            FileType::Zip => offer.download,
        };
        Ok(PackageDescriptor::core(&offer.version, locale, url))
    }

    /// Registry descriptor for a theme or plugin, pinned to `version`.
    pub fn resolve_item(
        &self,
        kind: ItemKind,
        slug: &str,
        version: Option<&str>,
    ) -> Result<PackageDescriptor, PrecacheError> {
        let descriptor = self.registry.item_info(kind, slug)?;
        match version {
            Some(v) => rewrite::rewrite_version(self.registry.as_ref(), &descriptor, v),
            None => Ok(descriptor),
        }
    }

    /// Fetch, verify (core only) and commit one descriptor.
    pub fn transfer(&self, descriptor: &PackageDescriptor) -> Result<CacheKey, PrecacheError> {
        tracing::info!("Caching {} ({})", descriptor.name, descriptor.version);
        let key = CacheKey::for_descriptor(descriptor);

        let request = DownloadRequest::new(&descriptor.download_url, &self.scratch_dir)
            .with_timeout(self.download_timeout);
        let artifact = self.fetcher.fetch(&request)?;

        if descriptor.kind == PackageKind::Core {
            checksum::verify_release_md5(
                self.registry.as_ref(),
                &descriptor.download_url,
                artifact.local_path(),
            )?;
        }

        let stored = cache::commit(self.store.as_ref(), &key, artifact)?;
        tracing::info!(key = %key, path = %stored.display(), "cached");
        Ok(key)
    }
}
