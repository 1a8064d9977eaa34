//! Pin a registry descriptor to a requested version.
//!
//! The registry always describes the current release; older releases and the
//! trunk build live next to it under the same path with a different file name.

use crate::error::PrecacheError;
use crate::package::{PackageDescriptor, PackageKind, DEV_VERSION_LABEL};
use crate::registry::Registry;

/// Requested version that selects the trunk build.
pub const DEV_VERSION: &str = "dev";

/// Returns `descriptor` rewritten to download `version`.
///
/// Equal versions are a no-op. `dev` maps to `{slug}.zip`; any other version to
/// `{slug}.{version}.zip`, which for themes and plugins must answer a HEAD
/// probe with 2xx.
pub fn rewrite_version(
    registry: &dyn Registry,
    descriptor: &PackageDescriptor,
    version: &str,
) -> Result<PackageDescriptor, PrecacheError> {
    if descriptor.version == version {
        return Ok(descriptor.clone());
    }

    let base = base_path(&descriptor.download_url, &descriptor.slug);
    let slug = &descriptor.slug;

    if version == DEV_VERSION {
        return Ok(PackageDescriptor {
            download_url: format!("{base}{slug}.zip"),
            version: DEV_VERSION_LABEL.to_string(),
            ..descriptor.clone()
        });
    }

    let rewritten = PackageDescriptor {
        download_url: format!("{base}{slug}.{version}.zip"),
        version: version.to_string(),
        ..descriptor.clone()
    };

    if matches!(descriptor.kind, PackageKind::Theme | PackageKind::Plugin) {
        let status = registry.probe(&rewritten.download_url)?;
        if !(200..300).contains(&status) {
            return Err(PrecacheError::VersionNotFound {
                kind: descriptor.kind,
                version: version.to_string(),
                status,
            });
        }
        tracing::debug!(url = %rewritten.download_url, "requested version exists");
    }

    Ok(rewritten)
}

/// Everything in `url` before `slug` within the final path segment. If the
/// segment doesn't contain the slug, the directory part of the URL (through
/// the last `/`).
fn base_path<'a>(url: &'a str, slug: &str) -> &'a str {
    let dir_end = url.rfind('/').map_or(0, |idx| idx + 1);
    if !slug.is_empty() {
        if let Some(idx) = url[dir_end..].find(slug) {
            return &url[..dir_end + idx];
        }
    }
    &url[..dir_end]
}
