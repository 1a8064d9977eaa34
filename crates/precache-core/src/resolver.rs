//! URL construction for registry endpoints and core release artifacts.
//!
//! Everything here is pure string building; no I/O.

use serde::{Deserialize, Serialize};

use crate::package::{FileType, ItemKind};

/// Locale whose core releases live on the bare download host.
pub const REFERENCE_LOCALE: &str = "en_US";

/// Hosts the registry is reachable at. Overridable from config so a mirror
/// (or a local test server) can stand in for wordpress.org.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEndpoints {
    /// Base URL of the metadata API, e.g. `https://api.wordpress.org`.
    pub api_base: String,
    /// Scheme used for core release downloads.
    pub download_scheme: String,
    /// Host serving core release archives, e.g. `wordpress.org`.
    pub download_host: String,
}

impl Default for RegistryEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://api.wordpress.org".to_string(),
            download_scheme: "https".to_string(),
            download_host: "wordpress.org".to_string(),
        }
    }
}

impl RegistryEndpoints {
    /// Download URL of a core release.
    ///
    /// The reference locale is served from the bare host; every other locale
    /// from a subdomain named after its two-letter language code.
    ///
    /// - `("6.4", "en_US", Zip)` → `https://wordpress.org/wordpress-6.4.zip`
    /// - `("6.4", "fr_FR", Zip)` → `https://fr.wordpress.org/wordpress-6.4-fr_FR.zip`
    pub fn core_download_url(&self, version: &str, locale: &str, file_type: FileType) -> String {
        let ext = file_type.extension();
        if locale == REFERENCE_LOCALE {
            format!(
                "{}://{}/wordpress-{}.{}",
                self.download_scheme, self.download_host, version, ext
            )
        } else {
            let lang: String = locale.chars().take(2).collect();
            format!(
                "{}://{}.{}/wordpress-{}-{}.{}",
                self.download_scheme, lang, self.download_host, version, locale, ext
            )
        }
    }

    /// Version-check endpoint listing the current core offers for `locale`.
    pub fn version_check_url(&self, locale: &str) -> Result<String, url::ParseError> {
        let base = format!("{}/core/version-check/1.7/", self.api_base.trim_end_matches('/'));
        let url = url::Url::parse_with_params(&base, &[("locale", locale)])?;
        Ok(url.into())
    }

    /// Item-information endpoint for a theme or plugin slug.
    pub fn item_info_url(&self, kind: ItemKind, slug: &str) -> Result<String, url::ParseError> {
        let (section, action) = match kind {
            ItemKind::Theme => ("themes", "theme_information"),
            ItemKind::Plugin => ("plugins", "plugin_information"),
        };
        let base = format!("{}/{}/info/1.2/", self.api_base.trim_end_matches('/'), section);
        let url = url::Url::parse_with_params(&base, &[("action", action), ("request[slug]", slug)])?;
        Ok(url.into())
    }
}
