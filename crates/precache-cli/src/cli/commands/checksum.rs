//! Checksum command: compute MD5 and SHA-256 of a file.

use anyhow::Result;
use precache_core::checksum;
use std::path::Path;

/// Print both digests, `md5sum`/`sha256sum` style.
pub async fn run_checksum(path: &Path) -> Result<()> {
    let md5 = checksum::md5_path(path)?;
    let sha256 = checksum::sha256_path(path)?;
    println!("{}  {}", md5, path.display());
    println!("{}  {}", sha256, path.display());
    Ok(())
}
