//! Move a verified artifact into the cache store.

use std::path::PathBuf;

use super::{CacheKey, CacheStore};
use crate::error::PrecacheError;
use crate::fetcher::FetchResult;

/// Evicts any stale entry under `key`, imports the artifact and deletes the
/// temp file. The temp file is deleted on failure as well.
pub fn commit(
    store: &dyn CacheStore,
    key: &CacheKey,
    artifact: FetchResult,
) -> Result<PathBuf, PrecacheError> {
    let stored = store
        .replace(key, artifact.local_path())
        .map_err(|source| PrecacheError::CacheImport {
            key: key.to_string(),
            source,
        })?;
    artifact.discard()?;
    Ok(stored)
}
