//! Artifact checksums and release hash verification.
//!
//! Core releases publish an `.md5` file next to every archive; the downloaded
//! file is hashed in bounded chunks and compared against it before it may
//! enter the cache.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::PrecacheError;
use crate::registry::Registry;

const BUF_SIZE: usize = 64 * 1024;

/// Hash a file with any RustCrypto digest and return lowercase hex.
pub fn digest_path<D: Digest>(path: &Path) -> std::io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = D::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// MD5 of a file as lowercase hex.
pub fn md5_path(path: &Path) -> Result<String, PrecacheError> {
    digest_path::<Md5>(path).map_err(|e| PrecacheError::io(path, e))
}

/// SHA-256 of a file as lowercase hex.
pub fn sha256_path(path: &Path) -> Result<String, PrecacheError> {
    digest_path::<Sha256>(path).map_err(|e| PrecacheError::io(path, e))
}

/// Normalizes the body of a published hash file: first token, lowercased.
/// Accepts both bare `<hash>` and `<hash>  <filename>` layouts.
pub fn parse_reference_hash(body: &str) -> Option<String> {
    body.split_whitespace()
        .next()
        .map(|s| s.to_ascii_lowercase())
        .filter(|s| !s.is_empty())
}

/// Checks a downloaded core archive against `{download_url}.md5`.
pub fn verify_release_md5(
    registry: &dyn Registry,
    download_url: &str,
    path: &Path,
) -> Result<(), PrecacheError> {
    let hash_url = format!("{download_url}.md5");
    let body = registry.fetch_text(&hash_url).map_err(|e| PrecacheError::HashUnreachable {
        url: hash_url.clone(),
        status: e.status().unwrap_or(0),
    })?;
    let expected = parse_reference_hash(&body).ok_or_else(|| PrecacheError::HashUnreachable {
        url: hash_url.clone(),
        status: 200,
    })?;

    let actual = md5_path(path)?;
    if actual != expected {
        return Err(PrecacheError::HashMismatch { expected, actual });
    }

    tracing::info!("md5 hash verified: {}", actual);
    match sha256_path(path) {
        Ok(sha) => tracing::debug!(sha256 = %sha, path = %path.display(), "artifact digest"),
        Err(e) => tracing::debug!("sha256 of verified artifact unavailable: {}", e),
    }
    Ok(())
}
