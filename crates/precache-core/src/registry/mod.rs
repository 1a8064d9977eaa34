//! Registry client interface.
//!
//! The pipeline only depends on the `Registry` trait; `HttpRegistry` talks to
//! the real metadata API over libcurl, tests plug in fixtures.

mod http;
mod parse;

pub use http::HttpRegistry;
pub use parse::{parse_item_info, parse_offers, select_offer};

use serde::{Deserialize, Serialize};

use crate::error::PrecacheError;
use crate::package::{ItemKind, PackageDescriptor};

/// One entry of the version-check `offers` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreOffer {
    /// Locale the offer was built for. The endpoint falls back to a default
    /// locale when it doesn't know the requested one.
    pub locale: String,
    /// Current release version (`current` in the response).
    #[serde(rename = "current")]
    pub version: String,
    /// Download URL of the release zip.
    pub download: String,
}

pub trait Registry: Send + Sync {
    /// Raw offers for `locale`, in the order the registry returned them.
    fn core_offers(&self, locale: &str) -> Result<Vec<CoreOffer>, PrecacheError>;

    /// Current-version descriptor of a theme or plugin.
    /// Fails with `InvalidSlug` when the registry does not know the slug.
    fn item_info(&self, kind: ItemKind, slug: &str) -> Result<PackageDescriptor, PrecacheError>;

    /// HEAD `url` and return the final status. Transport failures are
    /// `RegistryUnreachable`; any status (including 404) is `Ok`.
    fn probe(&self, url: &str) -> Result<u32, PrecacheError>;

    /// GET a small text resource. Non-2xx is `RegistryUnreachable`.
    fn fetch_text(&self, url: &str) -> Result<String, PrecacheError>;

    /// First offer for `locale`, rejecting the registry's silent fallback.
    fn current_offer(&self, locale: &str) -> Result<CoreOffer, PrecacheError> {
        select_offer(self.core_offers(locale)?, locale)
    }
}
