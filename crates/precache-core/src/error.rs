//! Error taxonomy for the fetch-verify-cache pipeline.
//!
//! Every variant that comes from a network call carries the HTTP status
//! (0 when no response was received) so the CLI can report it verbatim.

use std::path::PathBuf;

use crate::package::PackageKind;

#[derive(Debug, thiserror::Error)]
pub enum PrecacheError {
    /// The version-check endpoint answered with an offer for another locale
    /// (it silently falls back to a default locale it does recognize).
    #[error("The requested locale ({requested}) was not found.")]
    LocaleNotFound {
        requested: String,
        offered: Option<String>,
    },

    /// Item-info lookup rejected the slug. Per-item: batches skip the slug.
    #[error("Invalid {kind} slug '{slug}' (HTTP {status}).")]
    InvalidSlug {
        kind: PackageKind,
        slug: String,
        status: u32,
    },

    #[error(
        "Can't find the requested {kind}'s version {version} in the WordPress.org {kind} repository (HTTP {status})."
    )]
    VersionNotFound {
        kind: PackageKind,
        version: String,
        status: u32,
    },

    #[error("Download not found: {url} (HTTP {status}).")]
    DownloadNotFound { url: String, status: u32 },

    #[error("Download failed for {url} (HTTP {status}): {reason}")]
    DownloadFailed {
        url: String,
        status: u32,
        reason: String,
    },

    #[error("Couldn't access md5 hash for release ({url}, HTTP {status}).")]
    HashUnreachable { url: String, status: u32 },

    #[error("md5 hash for download ({actual}) is different than the release hash ({expected}).")]
    HashMismatch { expected: String, actual: String },

    #[error("Registry request to {url} failed (HTTP {status}): {reason}")]
    RegistryUnreachable {
        url: String,
        status: u32,
        reason: String,
    },

    #[error("Unexpected registry response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("Failed to import {key} into the cache")]
    CacheImport {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PrecacheError {
    /// HTTP status attached to the error, if it came from a network call.
    pub fn status(&self) -> Option<u32> {
        match self {
            PrecacheError::InvalidSlug { status, .. }
            | PrecacheError::VersionNotFound { status, .. }
            | PrecacheError::DownloadNotFound { status, .. }
            | PrecacheError::DownloadFailed { status, .. }
            | PrecacheError::HashUnreachable { status, .. }
            | PrecacheError::RegistryUnreachable { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Errors that concern one requested slug only: the registry doesn't know
    /// it, or doesn't have the requested version. Everything else means the
    /// registry, the network or the local disk is failing.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            PrecacheError::InvalidSlug { .. } | PrecacheError::VersionNotFound { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PrecacheError::Io {
            path: path.into(),
            source,
        }
    }
}
